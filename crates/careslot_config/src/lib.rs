// --- File: crates/careslot_config/src/lib.rs ---
use config::{Config, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::Path;
use thiserror::Error;
use tracing::info;

pub mod env_vars;
pub mod models;
#[cfg(test)]
mod models_test;

pub use env_vars::inject_env_vars;
pub use models::*;

/// Errors raised while loading or validating the configuration.
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read configuration sources: {0}")]
    Source(#[from] config::ConfigError),
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Loads the configuration from `CONFIG_DIR` (default `config`) for the
/// environment named by `RUN_ENV` (default `debug`).
pub fn load_config() -> Result<AppConfig, ConfigLoadError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let config_dir = env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    load_config_from(Path::new(&config_dir), &run_env)
}

/// Loads `default.*` and `{run_env}.*` from `dir`, applies `CARESLOT__*`
/// overrides, resolves secret markers and validates the result.
pub fn load_config_from(dir: &Path, run_env: &str) -> Result<AppConfig, ConfigLoadError> {
    let default_path = dir.join("default");
    let env_path = dir.join(run_env);
    info!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(&env_vars::get_config_prefix())
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        );

    let mut raw: serde_json::Value = builder.build()?.try_deserialize()?;
    inject_env_vars(&mut raw);

    let config: AppConfig = serde_json::from_value(raw)?;
    config.validate()?;
    Ok(config)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// The file is taken from `DOTENV_OVERRIDE`, else from the first command line
/// argument when it starts with `.env`, else `.env`. Returns the path used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
