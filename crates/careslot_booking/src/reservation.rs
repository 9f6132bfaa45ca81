// --- File: crates/careslot_booking/src/reservation.rs ---
//! Reservation orchestration: validate, apply the date policy, resolve the
//! caregiver, re-check occupancy of the requested ranges, write one event per
//! range (plus mirrors), price, then notify.
//!
//! There is no lock between the re-check and the writes. Two requests for the
//! same range can both pass the re-check and both insert; the calendar offers
//! no transactional primitive to prevent it.

use careslot_common::services::{CalendarError, EmailMessage, Metadata, NewCalendarEvent};
use careslot_common::{conflict, not_found, validation_error, CareslotError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::directory::Caregiver;
use crate::grid::{merge_adjacent, TimeRange};
use crate::occupancy::{META_BOOKING, META_CAREGIVER, META_DATE, META_RANGE};
use crate::policy::parse_date;
use crate::pricing::PriceBreakdown;
use crate::service::BookingService;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct Customer {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

/// Incoming reservation. Missing fields deserialize empty and are reported
/// by validation, naming the field.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReservationRequest {
    #[serde(default)]
    pub caregiver: String,
    /// Civil date, `YYYY-MM-DD`.
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "2025-05-12"))]
    pub date: String,
    /// Catalog ranges, `HH:MM-HH:MM`.
    #[serde(default)]
    pub ranges: Vec<String>,
    #[serde(default)]
    pub customer: Customer,
    /// Free-text list of requested services.
    #[serde(default)]
    pub services: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ReservationResponse {
    pub success: bool,
    /// Number of events created on the caregiver's calendar.
    pub created: usize,
    pub booking_id: String,
    pub caregiver: String,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub date: NaiveDate,
    #[cfg_attr(feature = "openapi", schema(value_type = Vec<String>))]
    pub ranges: Vec<TimeRange>,
    pub price: PriceBreakdown,
}

#[derive(Debug, Clone)]
struct ValidatedRequest {
    caregiver: String,
    date: NaiveDate,
    ranges: Vec<TimeRange>,
    customer: Customer,
    services: Option<String>,
}

fn required(value: &str, field: &str) -> Result<String, CareslotError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(validation_error(format!("{} is required", field)));
    }
    Ok(value.to_string())
}

impl BookingService {
    fn validate(&self, request: &ReservationRequest) -> Result<ValidatedRequest, CareslotError> {
        let caregiver = required(&request.caregiver, "caregiver")?;
        let date = parse_date(&required(&request.date, "date")?)?;

        let customer = Customer {
            name: required(&request.customer.name, "customer.name")?,
            email: required(&request.customer.email, "customer.email")?,
            phone: required(&request.customer.phone, "customer.phone")?,
            address: required(&request.customer.address, "customer.address")?,
        };
        if !customer.email.contains('@') {
            return Err(validation_error(format!(
                "customer.email '{}' is not an email address",
                customer.email
            )));
        }

        if request.ranges.is_empty() {
            return Err(validation_error("ranges must contain at least one range"));
        }
        let mut seen = HashSet::new();
        let mut ranges = Vec::with_capacity(request.ranges.len());
        for raw in &request.ranges {
            let range: TimeRange = raw.parse()?;
            if !self.catalog.contains(&range) {
                return Err(validation_error(format!(
                    "range {} is not a bookable range",
                    range
                )));
            }
            if !seen.insert(range) {
                return Err(validation_error(format!("range {} is requested twice", range)));
            }
            ranges.push(range);
        }
        ranges.sort_by_key(|range| self.catalog.position(range));

        let services = request
            .services
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(ValidatedRequest {
            caregiver,
            date,
            ranges,
            customer,
            services,
        })
    }

    /// Creates one calendar event per requested range, or none at all.
    pub async fn create_reservation(
        &self,
        request: ReservationRequest,
    ) -> Result<ReservationResponse, CareslotError> {
        let request = self.validate(&request)?;

        self.policy.check(request.date, self.today())?;

        let caregiver = self.directory.lookup(&request.caregiver).ok_or_else(|| {
            not_found(format!("Unknown caregiver '{}'", request.caregiver))
        })?;

        let statuses = self
            .occupancy_for(caregiver, request.date, &request.ranges)
            .await?;
        let conflicts: Vec<String> = statuses
            .iter()
            .filter(|status| status.taken)
            .map(|status| status.range.to_string())
            .collect();
        if !conflicts.is_empty() {
            info!(
                "Reservation for {} on {} rejected, taken: {:?}",
                caregiver.name, request.date, conflicts
            );
            return Err(conflict(
                "Requested ranges are no longer available",
                conflicts,
            ));
        }

        let booking_id = Uuid::new_v4().to_string();
        self.write_events(caregiver, &request, &booking_id).await?;

        let price = self.pricing.breakdown(request.ranges.len());
        info!(
            "Reservation {} created for {} on {}: {} ranges",
            booking_id,
            caregiver.name,
            request.date,
            request.ranges.len()
        );

        self.notify(caregiver, &request, &price).await;

        Ok(ReservationResponse {
            success: true,
            created: request.ranges.len(),
            booking_id,
            caregiver: caregiver.name.clone(),
            date: request.date,
            ranges: request.ranges,
            price,
        })
    }

    // Caregiver calendar first, then each mirror. On the first failed insert
    // everything created so far is deleted again, newest first. A failed
    // insert may still have been stored, so every calendar written to is then
    // swept for events tagged with this booking id.
    async fn write_events(
        &self,
        caregiver: &Caregiver,
        request: &ValidatedRequest,
        booking_id: &str,
    ) -> Result<(), CareslotError> {
        let targets = std::iter::once(&caregiver.calendar_id).chain(self.mirrors.iter());
        let mut created: Vec<(String, String)> = Vec::new();
        let mut touched: Vec<&String> = Vec::new();

        for calendar_id in targets {
            touched.push(calendar_id);
            for range in &request.ranges {
                let event = self.build_event(caregiver, request, *range, booking_id)?;
                match self.calendar.insert_event(calendar_id, event).await {
                    Ok(result) => {
                        debug!("Created event {} in {}", result.event_id, calendar_id);
                        created.push((calendar_id.clone(), result.event_id));
                    }
                    Err(err) => {
                        error!(
                            "Insert of {} into {} failed after {} events: {}",
                            range,
                            calendar_id,
                            created.len(),
                            err
                        );
                        self.compensate(&created).await;
                        self.sweep_booking(&touched, request.date, booking_id).await;
                        return Err(err.into());
                    }
                }
            }
        }
        Ok(())
    }

    async fn compensate(&self, created: &[(String, String)]) {
        for (calendar_id, event_id) in created.iter().rev() {
            match self.calendar.delete_event(calendar_id, event_id).await {
                Ok(()) => warn!("Rolled back event {} in {}", event_id, calendar_id),
                Err(err) => error!(
                    "Could not roll back event {} in {}: {}",
                    event_id, calendar_id, err
                ),
            }
        }
    }

    async fn sweep_booking(&self, calendars: &[&String], date: NaiveDate, booking_id: &str) {
        let Some((window_start, window_end)) = self.policy.day_window(date) else {
            error!("No day window for {}; booking {} not swept", date, booking_id);
            return;
        };

        for calendar_id in calendars {
            let events = match self
                .calendar
                .list_events(calendar_id, window_start, window_end)
                .await
            {
                Ok(events) => events,
                Err(err) => {
                    error!(
                        "Could not sweep {} for booking {}: {}",
                        calendar_id, booking_id, err
                    );
                    continue;
                }
            };

            let orphans = events.iter().filter(|event| {
                event.metadata.get(META_BOOKING).map(String::as_str) == Some(booking_id)
            });
            for event_id in orphans.filter_map(|event| event.id.as_deref()) {
                match self.calendar.delete_event(calendar_id, event_id).await {
                    Ok(()) => warn!("Removed unacknowledged event {} in {}", event_id, calendar_id),
                    Err(err) => error!(
                        "Could not remove unacknowledged event {} in {}: {}",
                        event_id, calendar_id, err
                    ),
                }
            }
        }
    }

    fn build_event(
        &self,
        caregiver: &Caregiver,
        request: &ValidatedRequest,
        range: TimeRange,
        booking_id: &str,
    ) -> Result<NewCalendarEvent, CareslotError> {
        let (start, end) = range.instants_or_err(request.date, &self.policy.time_zone())?;

        let mut metadata = Metadata::new();
        metadata.insert(META_CAREGIVER.to_string(), caregiver.name.clone());
        metadata.insert(
            META_DATE.to_string(),
            request.date.format("%Y-%m-%d").to_string(),
        );
        metadata.insert(META_RANGE.to_string(), range.to_string());
        metadata.insert(META_BOOKING.to_string(), booking_id.to_string());

        Ok(NewCalendarEvent {
            start,
            end,
            summary: format!(
                "{} {} - {}",
                self.summary_prefix, caregiver.name, request.customer.name
            ),
            description: Some(describe(caregiver, request)),
            metadata,
        })
    }

    async fn notify(&self, caregiver: &Caregiver, request: &ValidatedRequest, price: &PriceBreakdown) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        if caregiver.email.is_empty() {
            warn!("Caregiver {} has no email; skipping notification", caregiver.name);
            return;
        }

        let message = EmailMessage {
            to: vec![caregiver.email.clone()],
            cc: vec![request.customer.email.clone()],
            reply_to: Some(request.customer.email.clone()),
            subject: format!(
                "{}: {} {}",
                self.summary_prefix, request.customer.name, request.date
            ),
            body: format!(
                "{}\nHours: {}\nTotal: {:.2} {}\n",
                describe(caregiver, request),
                price.hours,
                price.total,
                price.currency
            ),
        };

        match tokio::time::timeout(self.notify_timeout, notifier.send_email(message)).await {
            Ok(Ok(result)) => info!("Notification {} {}", result.id, result.status),
            Ok(Err(err)) => warn!("Reservation notification failed: {}", err),
            Err(_) => warn!(
                "Reservation notification timed out after {:?}",
                self.notify_timeout
            ),
        }
    }

    /// Deletes one reservation event from the caregiver's calendar.
    pub async fn cancel_reservation(
        &self,
        caregiver_name: &str,
        event_id: &str,
    ) -> Result<(), CareslotError> {
        let caregiver = self
            .directory
            .lookup(caregiver_name)
            .ok_or_else(|| not_found(format!("Unknown caregiver '{}'", caregiver_name.trim())))?;
        let event_id = required(event_id, "event_id")?;

        match self.calendar.delete_event(&caregiver.calendar_id, &event_id).await {
            Ok(()) => {
                info!("Cancelled event {} for {}", event_id, caregiver.name);
                Ok(())
            }
            Err(CalendarError::NotFound(_)) => Err(not_found(format!(
                "No reservation event '{}' for {}",
                event_id, caregiver.name
            ))),
            Err(err) => Err(err.into()),
        }
    }
}

fn describe(caregiver: &Caregiver, request: &ValidatedRequest) -> String {
    let ranges = merge_adjacent(&request.ranges)
        .iter()
        .map(TimeRange::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Caregiver: {}\nDate: {}\nRanges: {}\nCustomer: {}\nEmail: {}\nPhone: {}\nAddress: {}\nServices: {}",
        caregiver.name,
        request.date,
        ranges,
        request.customer.name,
        request.customer.email,
        request.customer.phone,
        request.customer.address,
        request.services.as_deref().unwrap_or("-"),
    )
}
