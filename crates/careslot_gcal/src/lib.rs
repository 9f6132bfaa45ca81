// --- File: crates/careslot_gcal/src/lib.rs ---
// Declare modules within this crate
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod service;

pub use service::GoogleCalendarService;
