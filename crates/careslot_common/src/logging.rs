//! Logging utilities for the Careslot application.
//!
//! One place that installs the global tracing subscriber: a console `fmt`
//! layer, an optional daily rolling file, and an `EnvFilter` that honours
//! `RUST_LOG` on top of the configured level for `careslot*` targets.

use careslot_config::LoggingConfig;
use std::str::FromStr;
use tracing::{info, warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
pub fn init_with_level(level: Level) {
    let result = tracing_subscriber::registry()
        .with(console_layer())
        .with(build_filter(level))
        .try_init();

    // A subscriber may already be installed (tests call this repeatedly).
    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Initialize logging from configuration.
///
/// When a log directory is configured, the returned guard must be kept alive
/// for the lifetime of the process so buffered lines are flushed.
pub fn init_with_config(config: &LoggingConfig) -> Option<WorkerGuard> {
    let level = Level::from_str(&config.level).unwrap_or(Level::INFO);

    let (file_layer, guard) = match &config.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "careslot.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_ansi(false).with_writer(writer)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(console_layer())
        .with(file_layer)
        .with(build_filter(level))
        .try_init();

    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
        if Level::from_str(&config.level).is_err() {
            warn!("Unknown log level '{}', using INFO", config.level);
        }
    }
    guard
}

fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
}

fn build_filter(level: Level) -> EnvFilter {
    let mut filter = EnvFilter::from_default_env();
    for directive in [format!("careslot={}", level), "tower_http=info".to_string()] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    filter
}
