// --- File: crates/careslot_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type surfaced to the HTTP layer.
///
/// Every crate keeps its own domain error and converts into this one at the
/// handler boundary. The variants follow the caller-facing taxonomy: input
/// problems, business-rule rejections, unknown resources, booking conflicts,
/// failures of external services and everything else.
#[derive(Error, Debug)]
pub enum CareslotError {
    /// Malformed or missing input; detected before any external call.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Well-formed input rejected by a business rule (weekend, lead time).
    #[error("Policy rejected: {0}")]
    PolicyRejected(String),

    /// Unknown resource.
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Requested ranges collide with existing occupancy.
    #[error("Conflict: {message}")]
    ConflictError { message: String, ranges: Vec<String> },

    /// An external service call failed.
    #[error("External service error: {service_name} - {message}")]
    UpstreamError {
        service_name: String,
        message: String,
        retryable: bool,
    },

    /// Missing or invalid configuration.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Anything else.
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl CareslotError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            CareslotError::ValidationError(_) => "validation",
            CareslotError::PolicyRejected(_) => "policy_rejected",
            CareslotError::NotFoundError(_) => "not_found",
            CareslotError::ConflictError { .. } => "conflict",
            CareslotError::UpstreamError { .. } => "upstream",
            CareslotError::ConfigError(_) => "config",
            CareslotError::InternalError(_) => "internal",
        }
    }

    /// Whether the detail may be shown to the caller verbatim.
    pub fn is_public(&self) -> bool {
        matches!(
            self,
            CareslotError::ValidationError(_)
                | CareslotError::PolicyRejected(_)
                | CareslotError::NotFoundError(_)
                | CareslotError::ConflictError { .. }
        )
    }
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for CareslotError {
    fn status_code(&self) -> u16 {
        match self {
            CareslotError::ValidationError(_) => 400,
            CareslotError::PolicyRejected(_) => 422,
            CareslotError::NotFoundError(_) => 404,
            CareslotError::ConflictError { .. } => 409,
            CareslotError::UpstreamError { retryable, .. } => {
                if *retryable {
                    503
                } else {
                    502
                }
            }
            CareslotError::ConfigError(_) => 500,
            CareslotError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, CareslotError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, CareslotError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, CareslotError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| CareslotError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, CareslotError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| CareslotError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<careslot_config::ConfigLoadError> for CareslotError {
    fn from(err: careslot_config::ConfigLoadError) -> Self {
        CareslotError::ConfigError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> CareslotError {
    CareslotError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> CareslotError {
    CareslotError::ValidationError(message.to_string())
}

pub fn policy_rejected<T: fmt::Display>(message: T) -> CareslotError {
    CareslotError::PolicyRejected(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> CareslotError {
    CareslotError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T, ranges: Vec<String>) -> CareslotError {
    CareslotError::ConflictError {
        message: message.to_string(),
        ranges,
    }
}

pub fn upstream_error<T: fmt::Display>(
    service_name: &str,
    message: T,
    retryable: bool,
) -> CareslotError {
    CareslotError::UpstreamError {
        service_name: service_name.to_string(),
        message: message.to_string(),
        retryable,
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> CareslotError {
    CareslotError::InternalError(message.to_string())
}
