// --- File: crates/careslot_gcal/src/service.rs ---
//! Google Calendar service implementation.
//!
//! This module provides an implementation of the CalendarService trait for Google Calendar.
//! Every API call is bounded by the configured request timeout and every
//! failure is classified into a [`CalendarError`].

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use careslot_common::services::{
    BoxFuture, CalendarError, CalendarEvent, CalendarService, CreatedEvent, Metadata,
    NewCalendarEvent,
};
use careslot_common::CareslotError;
use careslot_config::GcalConfig;
use google_calendar3::api::{Event, EventDateTime, EventExtendedProperties};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{create_calendar_hub, HubType};

const PAGE_SIZE: i32 = 250;

/// Google Calendar service implementation.
pub struct GoogleCalendarService {
    calendar_hub: Arc<HubType>,
    time_zone: Tz,
    timeout: Duration,
}

impl GoogleCalendarService {
    /// Create a new Google Calendar service.
    ///
    /// `time_zone` is used to place all-day events on the business day they cover.
    pub fn new(calendar_hub: Arc<HubType>, time_zone: Tz, timeout: Duration) -> Self {
        Self {
            calendar_hub,
            time_zone,
            timeout,
        }
    }

    /// Authenticate with the configured service account and build the service.
    pub async fn from_config(config: &GcalConfig, time_zone: Tz) -> Result<Self, CareslotError> {
        let hub = create_calendar_hub(config).await?;
        Ok(Self::new(
            Arc::new(hub),
            time_zone,
            Duration::from_secs(config.request_timeout_secs),
        ))
    }

    async fn bounded<T, F>(&self, call: F) -> Result<T, CalendarError>
    where
        F: Future<Output = Result<T, google_calendar3::Error>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(classify_error),
            Err(_) => Err(CalendarError::Timeout(self.timeout)),
        }
    }
}

impl CalendarService for GoogleCalendarService {
    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, CalendarError> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let mut events = Vec::new();
            let mut page_token: Option<String> = None;

            loop {
                let mut request = self
                    .calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(window_start)
                    .time_max(window_end)
                    .single_events(true) // Expand recurring events
                    .order_by("startTime")
                    .max_results(PAGE_SIZE);
                if let Some(token) = page_token.as_deref() {
                    request = request.page_token(token);
                }

                let (_, page) = self.bounded(request.doit()).await?;

                for item in page.items.unwrap_or_default() {
                    if let Some(event) = to_calendar_event(item, &self.time_zone) {
                        events.push(event);
                    }
                }

                match page.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => break,
                }
            }

            events.sort_by_key(|event| event.start);
            debug!(
                "Listed {} events from {} in [{}, {})",
                events.len(),
                calendar_id,
                window_start,
                window_end
            );
            Ok(events)
        })
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedEvent, CalendarError> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let new_event = to_google_event(event, &self.time_zone);

            let (_response, created) = self
                .bounded(self.calendar_hub.events().insert(new_event, &calendar_id).doit())
                .await?;

            let event_id = created.id.ok_or_else(|| {
                CalendarError::Unexpected("calendar returned an event without id".to_string())
            })?;

            Ok(CreatedEvent {
                event_id,
                status: created.status.unwrap_or_else(|| "confirmed".to_string()),
            })
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), CalendarError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            self.bounded(
                self.calendar_hub
                    .events()
                    .delete(&calendar_id, &event_id)
                    .send_updates("none")
                    .doit(),
            )
            .await?;
            Ok(())
        })
    }

    fn probe(&self, calendar_id: &str) -> BoxFuture<'_, (), CalendarError> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            self.bounded(
                self.calendar_hub
                    .events()
                    .list(&calendar_id)
                    .time_min(Utc::now())
                    .max_results(1)
                    .doit(),
            )
            .await?;
            Ok(())
        })
    }
}

/// Classifies a Google API failure.
pub fn classify_error(err: google_calendar3::Error) -> CalendarError {
    match err {
        google_calendar3::Error::MissingToken(e) => CalendarError::Unauthorized(e.to_string()),
        google_calendar3::Error::MissingAPIKey => {
            CalendarError::Unauthorized("missing API key".to_string())
        }
        // Non-2xx responses with a JSON body land here, `{"error": {"code": .., "message": ..}}`.
        google_calendar3::Error::BadRequest(body) => {
            let message = body["error"]["message"]
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| body.to_string());
            match body["error"]["code"].as_u64() {
                Some(code) => classify_status(code as u16, message),
                None => CalendarError::BadRequest(message),
            }
        }
        google_calendar3::Error::Failure(response) => {
            let status = response.status();
            classify_status(status.as_u16(), status.to_string())
        }
        google_calendar3::Error::HttpError(e) => CalendarError::Transport(e.to_string()),
        google_calendar3::Error::Io(e) => CalendarError::Transport(e.to_string()),
        other => CalendarError::Unexpected(other.to_string()),
    }
}

/// Maps an HTTP status from the calendar API onto an error class.
pub fn classify_status(status: u16, message: String) -> CalendarError {
    match status {
        401 | 403 => CalendarError::Unauthorized(message),
        404 | 410 => CalendarError::NotFound(message),
        429 => CalendarError::RateLimited(message),
        400..=499 => CalendarError::BadRequest(message),
        500..=599 => CalendarError::Transport(message),
        _ => CalendarError::Unexpected(format!("HTTP {}: {}", status, message)),
    }
}

/// Converts a listed Google event; cancelled or timeless events yield `None`.
pub fn to_calendar_event(event: Event, time_zone: &Tz) -> Option<CalendarEvent> {
    if event.status.as_deref() == Some("cancelled") {
        return None;
    }

    let start = event_instant(event.start.as_ref(), time_zone);
    let end = event_instant(event.end.as_ref(), time_zone);
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => {
            warn!(
                "Skipping event {:?} with missing start/end",
                event.id.as_deref().unwrap_or("<no id>")
            );
            return None;
        }
    };

    let metadata: Metadata = event
        .extended_properties
        .and_then(|props| props.private)
        .map(|private| private.into_iter().collect())
        .unwrap_or_default();

    Some(CalendarEvent {
        id: event.id,
        start,
        end,
        summary: event.summary.unwrap_or_default(),
        metadata,
    })
}

/// Builds the Google representation of an event to insert.
pub fn to_google_event(event: NewCalendarEvent, time_zone: &Tz) -> Event {
    let private: HashMap<String, String> = event.metadata.into_iter().collect();

    Event {
        summary: Some(event.summary),
        description: event.description,
        start: Some(EventDateTime {
            date_time: Some(event.start),
            time_zone: Some(time_zone.name().to_string()),
            ..Default::default()
        }),
        end: Some(EventDateTime {
            date_time: Some(event.end),
            time_zone: Some(time_zone.name().to_string()),
            ..Default::default()
        }),
        extended_properties: Some(EventExtendedProperties {
            private: Some(private),
            ..Default::default()
        }),
        ..Default::default()
    }
}

// All-day events carry a date only; they occupy that day from local midnight.
fn event_instant(time: Option<&EventDateTime>, time_zone: &Tz) -> Option<DateTime<Utc>> {
    let time = time?;
    match (time.date_time, time.date) {
        (Some(date_time), _) => Some(date_time),
        (None, Some(date)) => local_midnight(date, time_zone),
        (None, None) => None,
    }
}

fn local_midnight(date: NaiveDate, time_zone: &Tz) -> Option<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    time_zone
        .from_local_datetime(&midnight)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}
