// --- File: crates/careslot_common/src/lib.rs ---

// Declare modules within this crate
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
#[cfg(any(test, feature = "test-util"))]
pub mod memory; // In-memory service doubles
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, internal_error, not_found, policy_rejected, upstream_error,
    validation_error, CareslotError, Context, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{handle_json_result, map_json_error, IntoHttpResponse};
