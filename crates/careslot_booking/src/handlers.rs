// File: crates/careslot_booking/src/handlers.rs
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    response::{Json, Response},
};
use careslot_common::{handle_json_result, validation_error, CareslotError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

use crate::occupancy::{Availability, SlotStatus};
use crate::policy::parse_date;
use crate::reservation::{ReservationRequest, ReservationResponse};
use crate::service::BookingService;

// Shared state needed by the booking handlers
pub struct BookingState {
    pub booking: Arc<BookingService>,
}

#[derive(Deserialize, Debug, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Date in YYYY-MM-DD format
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2025-05-12"))]
    pub date: String,

    /// Caregiver name, matched ignoring case and accents
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(example = "José"))]
    pub caregiver: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct AvailabilityResponse {
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date"))]
    pub date: NaiveDate,
    pub caregiver: String,
    pub bookable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<String>, format = "date"))]
    pub earliest_bookable_date: Option<NaiveDate>,
    pub slots: Vec<SlotStatus>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CancellationResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct CaregiversResponse {
    pub caregivers: Vec<String>,
}

#[derive(Serialize, Debug)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub calendars_checked: usize,
}

impl BookingState {
    fn availability_response(&self, availability: Availability) -> AvailabilityResponse {
        let earliest_bookable_date = availability
            .violation
            .map(|_| self.booking.policy().next_bookable_date(self.booking.today()));

        AvailabilityResponse {
            date: availability.date,
            bookable: availability.bookable(),
            reason: availability.violation.map(|v| v.reason().to_string()),
            earliest_bookable_date,
            caregiver: availability.caregiver,
            slots: availability.slots,
        }
    }
}

/// Handler for the availability grid of one caregiver and date.
#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Grid of catalog ranges for the date", body = AvailabilityResponse),
        (status = 400, description = "Malformed date or missing parameter"),
        (status = 404, description = "Unknown caregiver"),
        (status = 502, description = "Calendar rejected the request"),
        (status = 503, description = "Calendar temporarily unavailable")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, Response> {
    let result: Result<AvailabilityResponse, CareslotError> = async {
        if query.caregiver.trim().is_empty() {
            return Err(validation_error("caregiver is required"));
        }
        if query.date.trim().is_empty() {
            return Err(validation_error("date is required"));
        }
        let date = parse_date(&query.date)?;
        let availability = state.booking.compute_occupancy(date, &query.caregiver).await?;
        Ok(state.availability_response(availability))
    }
    .await;

    handle_json_result(result)
}

/// Handler for creating a reservation.
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/reservations",
    request_body = ReservationRequest,
    responses(
        (status = 200, description = "Reservation created", body = ReservationResponse),
        (status = 400, description = "Missing or malformed field"),
        (status = 404, description = "Unknown caregiver"),
        (status = 409, description = "Some requested ranges are taken"),
        (status = 422, description = "Weekend or before the lead time"),
        (status = 502, description = "Calendar rejected the request"),
        (status = 503, description = "Calendar temporarily unavailable")
    ),
    tag = "Booking"
))]
pub async fn create_reservation_handler(
    State(state): State<Arc<BookingState>>,
    payload: Result<Json<ReservationRequest>, JsonRejection>,
) -> Result<Json<ReservationResponse>, Response> {
    let result: Result<ReservationResponse, CareslotError> = async {
        let Json(request) = payload.map_err(|rejection| validation_error(rejection.body_text()))?;
        state.booking.create_reservation(request).await
    }
    .await;

    handle_json_result(result)
}

/// Handler for deleting one reservation event.
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/reservations/{caregiver}/{event_id}",
    params(
        ("caregiver" = String, Path, description = "Caregiver owning the calendar"),
        ("event_id" = String, Path, description = "The calendar event to delete")
    ),
    responses(
        (status = 200, description = "Event deleted", body = CancellationResponse),
        (status = 404, description = "Unknown caregiver or event")
    ),
    tag = "Booking"
))]
pub async fn cancel_reservation_handler(
    State(state): State<Arc<BookingState>>,
    Path((caregiver, event_id)): Path<(String, String)>,
) -> Result<Json<CancellationResponse>, Response> {
    let result: Result<CancellationResponse, CareslotError> = state
        .booking
        .cancel_reservation(&caregiver, &event_id)
        .await
        .map(|()| CancellationResponse {
            success: true,
            message: format!("Reservation event {} deleted.", event_id),
        });

    handle_json_result(result)
}

/// Handler listing the configured caregivers.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/caregivers",
    responses((status = 200, description = "Configured caregiver names", body = CaregiversResponse)),
    tag = "Booking"
))]
pub async fn list_caregivers_handler(
    State(state): State<Arc<BookingState>>,
) -> Json<CaregiversResponse> {
    Json(CaregiversResponse {
        caregivers: state.booking.caregiver_names(),
    })
}

/// Handler probing every caregiver calendar.
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Every caregiver calendar answered", body = HealthResponse),
        (status = 502, description = "Calendar rejected the credentials"),
        (status = 503, description = "Calendar temporarily unavailable")
    ),
    tag = "Booking"
))]
pub async fn health_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<HealthResponse>, Response> {
    let result = state.booking.health().await.map(|checked| {
        info!("Health check passed for {} calendars", checked);
        HealthResponse {
            status: "ok".to_string(),
            calendars_checked: checked,
        }
    });

    handle_json_result(result)
}
