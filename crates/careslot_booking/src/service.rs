// --- File: crates/careslot_booking/src/service.rs ---
//! The booking service: configuration-derived rules plus the calendar and
//! notification capabilities, built once at startup.
//!
//! Availability lives in [`crate::occupancy`], reservations and cancellation
//! in [`crate::reservation`].

use careslot_common::services::{CalendarService, NotificationService};
use careslot_common::{config_error, CareslotError};
use careslot_config::AppConfig;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::clock::{Clock, SystemClock};
use crate::directory::CaregiverDirectory;
use crate::grid::Catalog;
use crate::policy::DatePolicy;
use crate::pricing::PriceSettings;

const DEFAULT_NOTIFY_TIMEOUT: Duration = Duration::from_secs(15);

pub struct BookingService {
    pub(crate) catalog: Catalog,
    pub(crate) policy: DatePolicy,
    pub(crate) directory: CaregiverDirectory,
    pub(crate) pricing: PriceSettings,
    pub(crate) mirrors: Vec<String>,
    pub(crate) summary_prefix: String,
    pub(crate) calendar: Arc<dyn CalendarService>,
    pub(crate) notifier: Option<Arc<dyn NotificationService>>,
    pub(crate) notify_timeout: Duration,
    pub(crate) clock: Arc<dyn Clock>,
}

impl BookingService {
    /// Derives the booking rules from `config`. Mirror calendars that belong
    /// to a caregiver are dropped with a warning.
    pub fn new(
        config: &AppConfig,
        calendar: Arc<dyn CalendarService>,
        notifier: Option<Arc<dyn NotificationService>>,
    ) -> Result<Self, CareslotError> {
        let booking = &config.booking;
        let time_zone = booking.tz()?;
        let catalog = Catalog::from_blocks(&[booking.morning, booking.afternoon])
            .map_err(config_error)?;
        let directory = CaregiverDirectory::from_config(&config.caregivers)?;

        let mut mirrors = Vec::new();
        for mirror in &booking.mirror_calendars {
            let mirror = mirror.trim();
            if mirror.is_empty() || mirrors.iter().any(|m: &String| m == mirror) {
                continue;
            }
            if directory.is_caregiver_calendar(mirror) {
                warn!(
                    "Mirror calendar {} is a caregiver calendar; it will not receive copies",
                    mirror
                );
                continue;
            }
            mirrors.push(mirror.to_string());
        }

        let notify_timeout = config
            .mail
            .as_ref()
            .map(|mail| Duration::from_secs(mail.timeout_secs))
            .unwrap_or(DEFAULT_NOTIFY_TIMEOUT);

        info!(
            "Booking service ready: {} caregivers, {} ranges per day, {} mirror calendars, tz {}",
            directory.len(),
            catalog.len(),
            mirrors.len(),
            time_zone.name()
        );

        Ok(Self {
            catalog,
            policy: DatePolicy::new(time_zone, booking.lead_workdays),
            directory,
            pricing: PriceSettings {
                hourly_rate: booking.hourly_rate,
                tax_rate: booking.tax_rate,
                currency: booking.currency.clone(),
            },
            mirrors,
            summary_prefix: booking.event_summary_prefix.clone(),
            calendar,
            notifier,
            notify_timeout,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replaces the wall clock, used by tests to pin "today".
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn policy(&self) -> &DatePolicy {
        &self.policy
    }

    pub fn directory(&self) -> &CaregiverDirectory {
        &self.directory
    }

    pub fn mirrors(&self) -> &[String] {
        &self.mirrors
    }

    /// Today's civil date in the business time zone.
    pub fn today(&self) -> NaiveDate {
        self.policy.today(self.clock.now())
    }

    /// Configured caregiver names, in configuration order.
    pub fn caregiver_names(&self) -> Vec<String> {
        self.directory.names()
    }

    /// Probes every caregiver calendar with a real authenticated read.
    ///
    /// Returns the number of calendars checked; the first failure aborts.
    pub async fn health(&self) -> Result<usize, CareslotError> {
        let mut checked = 0;
        for caregiver in self.directory.iter() {
            self.calendar.probe(&caregiver.calendar_id).await.map_err(|e| {
                warn!("Health probe failed for {}: {}", caregiver.name, e);
                CareslotError::from(e)
            })?;
            checked += 1;
        }
        Ok(checked)
    }
}
