// --- File: crates/careslot_booking/src/occupancy.rs ---
//! Marks catalog ranges taken when existing calendar events overlap them.
//!
//! Every resolution costs exactly one `list_events` call covering the whole
//! civil day; nothing is cached between requests.

use careslot_common::services::{CalendarEvent, CalendarService};
use careslot_common::{internal_error, not_found, CareslotError};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::Serialize;
use tracing::debug;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::directory::Caregiver;
use crate::grid::{overlaps, TimeRange};
use crate::policy::{DatePolicy, PolicyViolation};
use crate::service::BookingService;

/// Metadata keys written on every event created by a reservation.
pub const META_CAREGIVER: &str = "careslot_caregiver";
pub const META_DATE: &str = "careslot_date";
pub const META_RANGE: &str = "careslot_range";
pub const META_BOOKING: &str = "careslot_booking";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct SlotStatus {
    #[cfg_attr(feature = "openapi", schema(value_type = String, example = "09:00-10:00"))]
    pub range: TimeRange,
    pub taken: bool,
}

/// The grid for one caregiver and date.
#[derive(Debug, Clone, PartialEq)]
pub struct Availability {
    pub date: NaiveDate,
    pub caregiver: String,
    /// Set when the date cannot be booked; every slot is then taken.
    pub violation: Option<PolicyViolation>,
    pub slots: Vec<SlotStatus>,
}

impl Availability {
    pub fn bookable(&self) -> bool {
        self.violation.is_none()
    }

    pub fn taken_ranges(&self) -> Vec<TimeRange> {
        self.slots
            .iter()
            .filter(|slot| slot.taken)
            .map(|slot| slot.range)
            .collect()
    }
}

fn tagged_with(event: &CalendarEvent, date_key: &str, range: &TimeRange) -> bool {
    if event.metadata.get(META_DATE).map(String::as_str) != Some(date_key) {
        return false;
    }
    event
        .metadata
        .get(META_RANGE)
        .and_then(|raw| raw.parse::<TimeRange>().ok())
        .is_some_and(|tagged| tagged.overlaps(range))
}

/// Pure marking step: a range is taken when an event overlaps its instants
/// or an event's metadata tags it for the same date.
pub fn mark_occupancy(
    date: NaiveDate,
    time_zone: &Tz,
    ranges: &[TimeRange],
    events: &[CalendarEvent],
) -> Result<Vec<SlotStatus>, CareslotError> {
    let date_key = date.format("%Y-%m-%d").to_string();

    ranges
        .iter()
        .map(|range| {
            let (start, end) = range.instants_or_err(date, time_zone)?;
            let taken = events.iter().any(|event| {
                overlaps(start, end, event.start, event.end)
                    || tagged_with(event, &date_key, range)
            });
            Ok(SlotStatus {
                range: *range,
                taken,
            })
        })
        .collect()
}

/// Fetches the caregiver's events for `date` (one read) and marks `ranges`.
pub async fn resolve(
    calendar: &dyn CalendarService,
    policy: &DatePolicy,
    caregiver: &Caregiver,
    date: NaiveDate,
    ranges: &[TimeRange],
) -> Result<Vec<SlotStatus>, CareslotError> {
    let time_zone = policy.time_zone();
    let (window_start, window_end) = policy
        .day_window(date)
        .ok_or_else(|| internal_error(format!("no civil day window for {}", date)))?;

    debug!(
        "Fetching events for {} ({}) in [{}, {})",
        caregiver.name, caregiver.calendar_id, window_start, window_end
    );
    let events = calendar
        .list_events(&caregiver.calendar_id, window_start, window_end)
        .await?;

    mark_occupancy(date, &time_zone, ranges, &events)
}

impl BookingService {
    /// Availability grid over the full catalog.
    ///
    /// Unknown caregivers are not found. Dates failing the date policy
    /// return the full grid marked taken without touching the calendar.
    pub async fn compute_occupancy(
        &self,
        date: NaiveDate,
        caregiver_name: &str,
    ) -> Result<Availability, CareslotError> {
        let caregiver = self
            .directory
            .lookup(caregiver_name)
            .ok_or_else(|| not_found(format!("Unknown caregiver '{}'", caregiver_name.trim())))?;

        if let Err(violation) = self.policy.check(date, self.today()) {
            debug!("{} is not bookable: {}", date, violation);
            return Ok(Availability {
                date,
                caregiver: caregiver.name.clone(),
                violation: Some(violation),
                slots: self
                    .catalog
                    .ranges()
                    .iter()
                    .map(|range| SlotStatus {
                        range: *range,
                        taken: true,
                    })
                    .collect(),
            });
        }

        let slots = self.occupancy_for(caregiver, date, self.catalog.ranges()).await?;
        Ok(Availability {
            date,
            caregiver: caregiver.name.clone(),
            violation: None,
            slots,
        })
    }

    /// Occupancy of exactly `ranges`, one calendar read.
    pub async fn occupancy_for(
        &self,
        caregiver: &Caregiver,
        date: NaiveDate,
        ranges: &[TimeRange],
    ) -> Result<Vec<SlotStatus>, CareslotError> {
        resolve(self.calendar.as_ref(), &self.policy, caregiver, date, ranges).await
    }
}
