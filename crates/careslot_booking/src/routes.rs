// --- File: crates/careslot_booking/src/routes.rs ---

use crate::handlers::{
    cancel_reservation_handler, create_reservation_handler, get_availability_handler,
    health_handler, list_caregivers_handler, BookingState,
};
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;

/// Creates a router containing all booking routes, relative to `/api`.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/reservations", post(create_reservation_handler))
        .route(
            "/admin/reservations/{caregiver}/{event_id}",
            delete(cancel_reservation_handler),
        )
        .route("/caregivers", get(list_caregivers_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
