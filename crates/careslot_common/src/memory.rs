// --- File: crates/careslot_common/src/memory.rs ---
//! In-memory implementations of the service traits.
//!
//! Compiled for this crate's tests and for dependents that enable the
//! `test-util` feature.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::services::{
    BoxFuture, CalendarError, CalendarEvent, CalendarService, CreatedEvent, EmailMessage,
    Metadata, NewCalendarEvent, NotificationError, NotificationResult, NotificationService,
};

/// Calendar double holding events per calendar id.
#[derive(Default)]
pub struct InMemoryCalendar {
    events: Mutex<HashMap<String, Vec<CalendarEvent>>>,
    deleted: Mutex<Vec<(String, String)>>,
    list_calls: AtomicUsize,
    insert_calls: AtomicUsize,
    next_id: AtomicUsize,
    fail_list: Mutex<Option<CalendarError>>,
    fail_probe: Mutex<Option<CalendarError>>,
    fail_insert_on: Mutex<Option<(usize, CalendarError)>>,
    fail_after_insert_on: Mutex<Option<(usize, CalendarError)>>,
}

impl InMemoryCalendar {
    /// Create an empty calendar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an existing event and return its id.
    pub fn seed(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
    ) -> String {
        self.seed_with_metadata(calendar_id, start, end, summary, Metadata::new())
    }

    /// Seed an existing event carrying metadata and return its id.
    pub fn seed_with_metadata(
        &self,
        calendar_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        summary: &str,
        metadata: Metadata,
    ) -> String {
        let id = self.allocate_id();
        let mut events = self.events.lock().unwrap();
        events
            .entry(calendar_id.to_string())
            .or_default()
            .push(CalendarEvent {
                id: Some(id.clone()),
                start,
                end,
                summary: summary.to_string(),
                metadata,
            });
        id
    }

    /// Events currently stored for a calendar.
    pub fn events(&self, calendar_id: &str) -> Vec<CalendarEvent> {
        let events = self.events.lock().unwrap();
        events.get(calendar_id).cloned().unwrap_or_default()
    }

    /// Number of events across all calendars.
    pub fn total_events(&self) -> usize {
        let events = self.events.lock().unwrap();
        events.values().map(Vec::len).sum()
    }

    /// `(calendar_id, event_id)` pairs removed through `delete_event`.
    pub fn deleted(&self) -> Vec<(String, String)> {
        self.deleted.lock().unwrap().clone()
    }

    /// How many times `list_events` was called.
    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    /// How many times `insert_event` was called, failed calls included.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Make every following `list_events` call fail.
    pub fn fail_list_with(&self, err: CalendarError) {
        *self.fail_list.lock().unwrap() = Some(err);
    }

    /// Make every following `probe` call fail.
    pub fn fail_probe_with(&self, err: CalendarError) {
        *self.fail_probe.lock().unwrap() = Some(err);
    }

    /// Make the `call`-th `insert_event` (1-based, counted across calendars) fail.
    pub fn fail_insert_on(&self, call: usize, err: CalendarError) {
        *self.fail_insert_on.lock().unwrap() = Some((call, err));
    }

    /// Store the `call`-th `insert_event` but still report `err`, like a
    /// write whose reply was lost.
    pub fn fail_after_insert_on(&self, call: usize, err: CalendarError) {
        *self.fail_after_insert_on.lock().unwrap() = Some((call, err));
    }

    fn allocate_id(&self) -> String {
        format!("evt-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

impl CalendarService for InMemoryCalendar {
    fn list_events(
        &self,
        calendar_id: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEvent>, CalendarError> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            self.list_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(err) = self.fail_list.lock().unwrap().clone() {
                return Err(err);
            }

            let mut found: Vec<CalendarEvent> = self
                .events(&calendar_id)
                .into_iter()
                .filter(|event| event.start < window_end && event.end > window_start)
                .collect();
            found.sort_by_key(|event| event.start);
            Ok(found)
        })
    }

    fn insert_event(
        &self,
        calendar_id: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, CreatedEvent, CalendarError> {
        let calendar_id = calendar_id.to_string();

        Box::pin(async move {
            let call = self.insert_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((failing_call, err)) = self.fail_insert_on.lock().unwrap().clone() {
                if failing_call == call {
                    return Err(err);
                }
            }

            let id = self.allocate_id();
            self.events
                .lock()
                .unwrap()
                .entry(calendar_id)
                .or_default()
                .push(CalendarEvent {
                    id: Some(id.clone()),
                    start: event.start,
                    end: event.end,
                    summary: event.summary,
                    metadata: event.metadata,
                });

            if let Some((failing_call, err)) = self.fail_after_insert_on.lock().unwrap().clone() {
                if failing_call == call {
                    return Err(err);
                }
            }

            Ok(CreatedEvent {
                event_id: id,
                status: "confirmed".to_string(),
            })
        })
    }

    fn delete_event(&self, calendar_id: &str, event_id: &str) -> BoxFuture<'_, (), CalendarError> {
        let calendar_id = calendar_id.to_string();
        let event_id = event_id.to_string();

        Box::pin(async move {
            let mut events = self.events.lock().unwrap();
            let calendar_events = events.entry(calendar_id.clone()).or_default();
            let before = calendar_events.len();
            calendar_events.retain(|event| event.id.as_deref() != Some(event_id.as_str()));
            if calendar_events.len() == before {
                return Err(CalendarError::NotFound(format!(
                    "event {} in {}",
                    event_id, calendar_id
                )));
            }
            self.deleted.lock().unwrap().push((calendar_id, event_id));
            Ok(())
        })
    }

    fn probe(&self, _calendar_id: &str) -> BoxFuture<'_, (), CalendarError> {
        Box::pin(async move {
            match self.fail_probe.lock().unwrap().clone() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        })
    }
}

/// Notifier double that records every message.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
    attempts: AtomicUsize,
    failing: AtomicBool,
}

impl RecordingNotifier {
    /// Create a notifier that accepts every message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a notifier whose sends always fail.
    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    /// Successfully sent messages.
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Send attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl NotificationService for RecordingNotifier {
    fn send_email(
        &self,
        message: EmailMessage,
    ) -> BoxFuture<'_, NotificationResult, NotificationError> {
        Box::pin(async move {
            let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if self.failing.load(Ordering::SeqCst) {
                return Err(NotificationError::Send("mailbox unavailable".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(NotificationResult {
                id: format!("mail-{}", attempt),
                status: "sent".to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 5, hour, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_list_filters_by_window() {
        let calendar = InMemoryCalendar::new();
        calendar.seed("ana", at(9), at(10), "morning");
        calendar.seed("ana", at(15), at(16), "afternoon");
        calendar.seed("luis", at(9), at(10), "other calendar");

        let events = calendar.list_events("ana", at(8), at(12)).await.unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary, "morning");
        assert_eq!(calendar.list_calls(), 1);
    }

    #[tokio::test]
    async fn test_window_edges_are_half_open() {
        let calendar = InMemoryCalendar::new();
        calendar.seed("ana", at(9), at(10), "edge");

        let after = calendar.list_events("ana", at(10), at(11)).await.unwrap();
        assert!(after.is_empty());
        let before = calendar.list_events("ana", at(8), at(9)).await.unwrap();
        assert!(before.is_empty());
    }

    #[tokio::test]
    async fn test_insert_failure_on_nth_call() {
        let calendar = InMemoryCalendar::new();
        calendar.fail_insert_on(2, CalendarError::Transport("reset".into()));
        let event = NewCalendarEvent {
            start: at(9),
            end: at(10),
            summary: "x".into(),
            description: None,
            metadata: Metadata::new(),
        };

        assert!(calendar.insert_event("ana", event.clone()).await.is_ok());
        assert!(calendar.insert_event("ana", event.clone()).await.is_err());
        assert!(calendar.insert_event("ana", event).await.is_ok());
        assert_eq!(calendar.total_events(), 2);
        assert_eq!(calendar.insert_calls(), 3);
    }

    #[tokio::test]
    async fn test_delete_unknown_event_is_not_found() {
        let calendar = InMemoryCalendar::new();
        let err = calendar.delete_event("ana", "missing").await.unwrap_err();
        assert!(matches!(err, CalendarError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_failing_notifier_counts_attempts() {
        let notifier = RecordingNotifier::failing();
        let message = EmailMessage {
            to: vec!["ana@example.com".into()],
            cc: vec![],
            reply_to: None,
            subject: "s".into(),
            body: "b".into(),
        };

        assert!(notifier.send_email(message).await.is_err());
        assert_eq!(notifier.attempts(), 1);
        assert!(notifier.sent().is_empty());
    }
}
