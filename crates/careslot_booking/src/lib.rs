// --- File: crates/careslot_booking/src/lib.rs ---
// Declare modules within this crate
pub mod clock;
pub mod directory;
pub mod doc;
pub mod grid;
#[cfg(test)]
mod grid_proptest;
pub mod handlers;
pub mod occupancy;
pub mod policy;
#[cfg(test)]
mod policy_test;
pub mod pricing;
pub mod reservation;
pub mod routes;
pub mod service;
#[cfg(test)]
mod test_support;

pub use handlers::BookingState;
pub use service::BookingService;
