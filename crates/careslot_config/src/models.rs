// --- File: crates/careslot_config/src/models.rs ---

use crate::ConfigLoadError;
use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

// --- Logging Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level for careslot targets ("trace" .. "error").
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>, // Mandatory when use_gcal is set
    /// Upper bound for every single call against the calendar API.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    10
}

// --- Opening hours ---
/// A block of whole bookable hours, `start_hour` inclusive, `end_hour` exclusive.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct HourBlock {
    pub start_hour: u32,
    pub end_hour: u32,
}

// --- Booking Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// IANA name of the civil time zone the business operates in.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    /// Minimum number of working days of advance notice (0 allows same-day bookings).
    #[serde(default)]
    pub lead_workdays: u32,
    pub hourly_rate: f64,
    pub tax_rate: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_morning")]
    pub morning: HourBlock,
    #[serde(default = "default_afternoon")]
    pub afternoon: HourBlock,
    /// Additional calendars every booked range is copied into.
    #[serde(default)]
    pub mirror_calendars: Vec<String>,
    #[serde(default = "default_event_summary_prefix")]
    pub event_summary_prefix: String,
}

fn default_time_zone() -> String {
    "Europe/Madrid".to_string()
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_morning() -> HourBlock {
    HourBlock {
        start_hour: 9,
        end_hour: 14,
    }
}

fn default_afternoon() -> HourBlock {
    HourBlock {
        start_hour: 16,
        end_hour: 20,
    }
}

fn default_event_summary_prefix() -> String {
    "Reserva".to_string()
}

// --- Caregivers ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CaregiverConfig {
    pub name: String,
    pub calendar_id: String,
    pub email: String,
}

// --- Mail Config ---
// Holds SMTP settings. The password is normally a "secret_from_env" marker.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub from_name: Option<String>,
    #[serde(default = "default_mail_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_mail_timeout_secs() -> u64 {
    15
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_mail: bool,

    #[serde(default)]
    pub logging: LoggingConfig,
    pub booking: BookingConfig,
    #[serde(default)]
    pub caregivers: Vec<CaregiverConfig>,

    // --- Optional Feature Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub mail: Option<MailConfig>,
}

impl BookingConfig {
    /// Parses the configured IANA time zone.
    pub fn tz(&self) -> Result<chrono_tz::Tz, ConfigLoadError> {
        self.time_zone.parse::<chrono_tz::Tz>().map_err(|_| {
            ConfigLoadError::Invalid(format!("unknown time zone '{}'", self.time_zone))
        })
    }
}

impl HourBlock {
    fn check(&self, label: &str) -> Result<(), ConfigLoadError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(ConfigLoadError::Invalid(format!(
                "{} block must satisfy start_hour < end_hour <= 24 (got {}..{})",
                label, self.start_hour, self.end_hour
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Checks the invariants the rest of the service relies on.
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.caregivers.is_empty() {
            return Err(ConfigLoadError::Invalid(
                "at least one caregiver must be configured".to_string(),
            ));
        }
        for caregiver in &self.caregivers {
            if caregiver.name.trim().is_empty() || caregiver.calendar_id.trim().is_empty() {
                return Err(ConfigLoadError::Invalid(
                    "caregivers need a non-empty name and calendar_id".to_string(),
                ));
            }
        }
        self.booking.morning.check("morning")?;
        self.booking.afternoon.check("afternoon")?;
        if self.booking.morning.end_hour > self.booking.afternoon.start_hour {
            return Err(ConfigLoadError::Invalid(
                "morning block must end before the afternoon block starts".to_string(),
            ));
        }
        if !(self.booking.hourly_rate >= 0.0) || !(self.booking.tax_rate >= 0.0) {
            return Err(ConfigLoadError::Invalid(
                "hourly_rate and tax_rate must be non-negative".to_string(),
            ));
        }
        self.booking.tz()?;
        if self.use_gcal && self.gcal.as_ref().and_then(|g| g.key_path.as_ref()).is_none() {
            return Err(ConfigLoadError::Invalid(
                "use_gcal is set but gcal.key_path is missing".to_string(),
            ));
        }
        if self.use_mail && self.mail.is_none() {
            return Err(ConfigLoadError::Invalid(
                "use_mail is set but the mail section is missing".to_string(),
            ));
        }
        Ok(())
    }
}
