// File: services/careslot_backend/src/service_factory.rs
//! Wires the calendar and notification adapters selected by the runtime
//! flags into a [`BookingService`].

use careslot_booking::BookingService;
use careslot_common::services::{CalendarService, NotificationService};
use careslot_common::{config_error, CareslotError};
use careslot_config::AppConfig;
use std::sync::Arc;
use tracing::info;

/// Builds the calendar adapter. A booking backend cannot run without one.
pub async fn calendar_service(
    config: &AppConfig,
) -> Result<Arc<dyn CalendarService>, CareslotError> {
    #[cfg(feature = "gcal")]
    {
        if config.use_gcal {
            let gcal = config
                .gcal
                .as_ref()
                .ok_or_else(|| config_error("use_gcal is set but the gcal section is missing"))?;
            let time_zone = config.booking.tz()?;
            let service =
                careslot_gcal::GoogleCalendarService::from_config(gcal, time_zone).await?;
            info!("Google Calendar adapter ready");
            return Ok(Arc::new(service));
        }
    }

    Err(config_error(if cfg!(feature = "gcal") {
        "use_gcal must be enabled: no other calendar backend is available"
    } else {
        "built without the gcal feature: no calendar backend is available"
    }))
}

/// Builds the optional notification adapter.
pub fn notification_service(
    config: &AppConfig,
) -> Result<Option<Arc<dyn NotificationService>>, CareslotError> {
    if !config.use_mail {
        info!("Mail notifications disabled");
        return Ok(None);
    }
    mail_service(config)
}

#[cfg(feature = "mail")]
fn mail_service(
    config: &AppConfig,
) -> Result<Option<Arc<dyn NotificationService>>, CareslotError> {
    let mail = config
        .mail
        .as_ref()
        .ok_or_else(|| config_error("use_mail is set but the mail section is missing"))?;
    let service = careslot_mail::MailNotificationService::from_config(mail)?;
    Ok(Some(Arc::new(service)))
}

#[cfg(not(feature = "mail"))]
fn mail_service(
    _config: &AppConfig,
) -> Result<Option<Arc<dyn NotificationService>>, CareslotError> {
    tracing::warn!("use_mail is set but the binary was built without the mail feature");
    Ok(None)
}

/// Builds the booking service with every configured adapter.
pub async fn booking_service(config: &AppConfig) -> Result<BookingService, CareslotError> {
    let calendar = calendar_service(config).await?;
    let notifier = notification_service(config)?;
    BookingService::new(config, calendar, notifier)
}
