// --- File: crates/careslot_common/src/services.rs ---
//! Service abstractions for external services.
//!
//! The booking core only ever talks to the calendar and the mailer through
//! these traits, so it can run against the Google adapter in production and
//! against the in-memory doubles in tests.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

use crate::error::CareslotError;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Free-form key/value data stored on an event by this system.
pub type Metadata = BTreeMap<String, String>;

/// Failures of the external calendar, classified for the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    #[error("calendar request timed out after {0:?}")]
    Timeout(Duration),
    #[error("calendar rate limit exceeded: {0}")]
    RateLimited(String),
    #[error("calendar authentication failed: {0}")]
    Unauthorized(String),
    #[error("calendar rejected the request: {0}")]
    BadRequest(String),
    #[error("calendar resource not found: {0}")]
    NotFound(String),
    #[error("calendar transport failure: {0}")]
    Transport(String),
    #[error("unexpected calendar failure: {0}")]
    Unexpected(String),
}

impl CalendarError {
    /// Whether repeating the same call later may succeed.
    ///
    /// This system never retries by itself; the flag is reported to the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            CalendarError::Timeout(_) | CalendarError::RateLimited(_) | CalendarError::Transport(_)
        )
    }
}

impl From<CalendarError> for CareslotError {
    fn from(err: CalendarError) -> Self {
        CareslotError::UpstreamError {
            service_name: "calendar".to_string(),
            retryable: err.is_retryable(),
            message: err.to_string(),
        }
    }
}

/// An event as read back from the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    /// Opaque id assigned by the calendar.
    pub id: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// An event to be written to the calendar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCalendarEvent {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub summary: String,
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Metadata,
}

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedEvent {
    /// The opaque id needed to delete the event again.
    pub event_id: String,
    pub status: String,
}

/// Narrow capability over the external calendar.
pub trait CalendarService: Send + Sync {
    /// Lists the non-cancelled events of `calendar_id` that intersect
    /// `[window_start, window_end)`.
    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, CalendarError>;

    /// Inserts one event.
    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedEvent, CalendarError>;

    /// Deletes one event by its calendar id.
    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), CalendarError>;

    /// Performs a trivial authenticated read against `calendar_id`.
    fn probe(&self, calendar_id: &str) -> BoxFuture<'_, (), CalendarError>;
}

/// A plain-text email.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub to: Vec<String>,
    #[serde(default)]
    pub cc: Vec<String>,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

/// Represents the result of a notification operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationResult {
    /// The ID of the notification.
    pub id: String,
    /// The status of the notification.
    pub status: String,
}

/// Failures while sending a notification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotificationError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    #[error("notification configuration error: {0}")]
    Config(String),
    #[error("notification could not be sent: {0}")]
    Send(String),
    #[error("notification timed out after {0:?}")]
    Timeout(Duration),
}

/// A trait for notification service operations.
pub trait NotificationService: Send + Sync {
    /// Send an email notification.
    fn send_email(
        &self,
        message: EmailMessage,
    ) -> BoxFuture<'_, NotificationResult, NotificationError>;
}
