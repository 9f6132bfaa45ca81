// File: crates/careslot_gcal/src/auth.rs
use careslot_common::{config_error, CareslotError, Context};
use careslot_config::GcalConfig;
use google_calendar3::{
    hyper_rustls::{self, HttpsConnectorBuilder},
    hyper_util::client::legacy::connect::HttpConnector,
    hyper_util::client::legacy::Client,
    yup_oauth2::{read_service_account_key, ServiceAccountAuthenticator},
    CalendarHub,
};
use std::path::Path;
use tracing::info;

// Type aliases for clarity
type Connector = hyper_rustls::HttpsConnector<HttpConnector>;

pub type HubType = CalendarHub<Connector>;

/// Builds an authenticated hub from a service-account key file.
pub async fn create_calendar_hub(config: &GcalConfig) -> Result<HubType, CareslotError> {
    let key_path = config
        .key_path
        .as_deref()
        .ok_or_else(|| config_error("Missing key_path in gcal configuration"))?;

    let sa_key = read_service_account_key(Path::new(key_path))
        .await
        .with_context(|| format!("Failed to read service account key {}", key_path))?;

    let auth = ServiceAccountAuthenticator::builder(sa_key)
        .build()
        .await
        .context("Failed to build service account authenticator")?;

    let https = HttpsConnectorBuilder::new()
        .with_native_roots()
        .context("Failed to load native TLS roots")?
        .https_or_http()
        .enable_http1()
        .build();

    // Create client without specifying body type
    let client = Client::builder(hyper_util::rt::TokioExecutor::new()).build(https);

    info!("Google Calendar hub created from {}", key_path);
    Ok(CalendarHub::new(client, auth))
}
