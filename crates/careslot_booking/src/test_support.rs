//! Shared builders for the unit tests of this crate.

use careslot_common::memory::{InMemoryCalendar, RecordingNotifier};
use careslot_common::services::NotificationService;
use careslot_config::{
    AppConfig, BookingConfig, CaregiverConfig, HourBlock, LoggingConfig, ServerConfig,
};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Madrid;
use std::sync::Arc;

use crate::clock::FixedClock;
use crate::reservation::{Customer, ReservationRequest};
use crate::service::BookingService;

pub const JOSE_CALENDAR: &str = "jose@group.calendar.google.com";
pub const ANA_CALENDAR: &str = "ana@group.calendar.google.com";
pub const OFFICE_CALENDAR: &str = "office@group.calendar.google.com";

pub fn sample_config(lead_workdays: u32, mirrors: Vec<String>) -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        },
        use_gcal: false,
        use_mail: false,
        logging: LoggingConfig::default(),
        booking: BookingConfig {
            time_zone: "Europe/Madrid".to_string(),
            lead_workdays,
            hourly_rate: 15.0,
            tax_rate: 0.21,
            currency: "EUR".to_string(),
            morning: HourBlock {
                start_hour: 9,
                end_hour: 14,
            },
            afternoon: HourBlock {
                start_hour: 16,
                end_hour: 20,
            },
            mirror_calendars: mirrors,
            event_summary_prefix: "Reserva".to_string(),
        },
        caregivers: vec![
            CaregiverConfig {
                name: "José".to_string(),
                calendar_id: JOSE_CALENDAR.to_string(),
                email: "jose@example.com".to_string(),
            },
            CaregiverConfig {
                name: "Ana María".to_string(),
                calendar_id: ANA_CALENDAR.to_string(),
                email: "ana@example.com".to_string(),
            },
        ],
        gcal: None,
        mail: None,
    }
}

/// Monday 2025-05-05, 10:00 in Madrid.
pub fn monday_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 5, 8, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// A wall-clock time in Madrid as a UTC instant.
pub fn madrid(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    Madrid
        .from_local_datetime(&day.and_hms_opt(hour, minute, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc)
}

pub fn service_with(
    config: &AppConfig,
    calendar: Arc<InMemoryCalendar>,
    notifier: Option<Arc<RecordingNotifier>>,
) -> BookingService {
    let notifier = notifier.map(|n| n as Arc<dyn NotificationService>);
    BookingService::new(config, calendar, notifier)
        .unwrap()
        .with_clock(Arc::new(FixedClock(monday_morning())))
}

/// Lead time of two working days, no mirrors, no notifier.
pub fn service(calendar: Arc<InMemoryCalendar>) -> BookingService {
    service_with(&sample_config(2, Vec::new()), calendar, None)
}

pub fn request(caregiver: &str, day: &str, ranges: &[&str]) -> ReservationRequest {
    ReservationRequest {
        caregiver: caregiver.to_string(),
        date: day.to_string(),
        ranges: ranges.iter().map(|r| r.to_string()).collect(),
        customer: Customer {
            name: "Lucía Pérez".to_string(),
            email: "lucia@example.com".to_string(),
            phone: "+34 600 000 000".to_string(),
            address: "Calle Mayor 1, Madrid".to_string(),
        },
        services: Some("Acompañamiento".to_string()),
    }
}
