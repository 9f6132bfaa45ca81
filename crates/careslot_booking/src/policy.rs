// --- File: crates/careslot_booking/src/policy.rs ---
//! Weekend and lead-time rules, evaluated in the business time zone.

use careslot_common::{policy_rejected, validation_error, CareslotError};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;

/// Why a well-formed date cannot be booked.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("bookings are not possible on weekends")]
    Weekend,
    #[error("the earliest bookable date is {earliest}")]
    BeforeLeadTime { earliest: NaiveDate },
}

impl PolicyViolation {
    /// Machine-readable reason reported to clients.
    pub fn reason(&self) -> &'static str {
        match self {
            PolicyViolation::Weekend => "weekend",
            PolicyViolation::BeforeLeadTime { .. } => "before_lead_time",
        }
    }
}

impl From<PolicyViolation> for CareslotError {
    fn from(violation: PolicyViolation) -> Self {
        policy_rejected(violation)
    }
}

/// Parses a civil date in `YYYY-MM-DD` form.
pub fn parse_date(input: &str) -> Result<NaiveDate, CareslotError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|_| {
        validation_error(format!("Invalid date '{}', expected YYYY-MM-DD", input.trim()))
    })
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy)]
pub struct DatePolicy {
    time_zone: Tz,
    lead_workdays: u32,
}

impl DatePolicy {
    pub fn new(time_zone: Tz, lead_workdays: u32) -> Self {
        Self {
            time_zone,
            lead_workdays,
        }
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    pub fn lead_workdays(&self) -> u32 {
        self.lead_workdays
    }

    /// The civil date of `now` in the business time zone.
    pub fn today(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.time_zone).date_naive()
    }

    /// Walks forward from `today` one day at a time, counting only weekdays,
    /// until `lead_workdays` have been counted. Zero yields `today`.
    pub fn earliest_bookable_date(&self, today: NaiveDate) -> NaiveDate {
        let mut date = today;
        let mut counted = 0;
        while counted < self.lead_workdays {
            date += Duration::days(1);
            if !is_weekend(date) {
                counted += 1;
            }
        }
        date
    }

    pub fn check(&self, date: NaiveDate, today: NaiveDate) -> Result<(), PolicyViolation> {
        if is_weekend(date) {
            return Err(PolicyViolation::Weekend);
        }
        if date < self.earliest_bookable_date(today) {
            return Err(PolicyViolation::BeforeLeadTime {
                earliest: self.next_bookable_date(today),
            });
        }
        Ok(())
    }

    /// First date passing both rules, which differs from
    /// [`DatePolicy::earliest_bookable_date`] only when that lands on a weekend.
    pub fn next_bookable_date(&self, today: NaiveDate) -> NaiveDate {
        let mut date = self.earliest_bookable_date(today);
        while is_weekend(date) {
            date += Duration::days(1);
        }
        date
    }

    pub fn is_bookable(&self, date: NaiveDate, today: NaiveDate) -> bool {
        self.check(date, today).is_ok()
    }

    /// `[local 00:00, next local 00:00)` of `date`, as UTC instants.
    pub fn day_window(&self, date: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let start = self.local_midnight(date)?;
        let end = self.local_midnight(date.succ_opt()?)?;
        Some((start, end))
    }

    fn local_midnight(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        self.time_zone
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest()
            .map(|instant| instant.with_timezone(&Utc))
    }
}
