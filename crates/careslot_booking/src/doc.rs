// File: crates/careslot_booking/src/doc.rs

#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::handlers::{
    AvailabilityQuery, AvailabilityResponse, CancellationResponse, CaregiversResponse,
    HealthResponse,
};
use crate::occupancy::SlotStatus;
use crate::pricing::PriceBreakdown;
use crate::reservation::{Customer, ReservationRequest, ReservationResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::create_reservation_handler,
        crate::handlers::cancel_reservation_handler,
        crate::handlers::list_caregivers_handler,
        crate::handlers::health_handler
    ),
    components(
        schemas(
            AvailabilityQuery,
            AvailabilityResponse,
            SlotStatus,
            ReservationRequest,
            Customer,
            ReservationResponse,
            PriceBreakdown,
            CancellationResponse,
            CaregiversResponse,
            HealthResponse
        )
    ),
    tags(
        (name = "Booking", description = "Caregiver availability and reservations")
    ),
    servers(
        (url = "/api", description = "Careslot API server")
    )
)]
pub struct BookingApiDoc;
