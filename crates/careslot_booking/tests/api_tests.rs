
use axum::{body::to_bytes, http::StatusCode, response::Response};
use careslot_common::memory::{InMemoryCalendar, RecordingNotifier};
use careslot_common::services::CalendarError;
use fixtures::{
    create_test_app, delete, get, madrid, post_json, reservation_body, JOSE_CALENDAR,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_availability_grid() {
    let calendar = Arc::new(InMemoryCalendar::new());
    calendar.seed(
        JOSE_CALENDAR,
        madrid(2025, 5, 12, 9, 30),
        madrid(2025, 5, 12, 10, 30),
        "busy",
    );
    let app = create_test_app(calendar, None);

    let response = app
        .oneshot(get("/availability?date=2025-05-12&caregiver=jose"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["caregiver"], "José");
    assert_eq!(body["bookable"], true);
    assert!(body.get("reason").is_none());
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 9);
    assert_eq!(slots[0], json!({"range": "09:00-10:00", "taken": true}));
    assert_eq!(slots[1], json!({"range": "10:00-11:00", "taken": true}));
    assert_eq!(slots[2], json!({"range": "11:00-12:00", "taken": false}));
}

#[tokio::test]
async fn test_availability_on_weekend() {
    let app = create_test_app(Arc::new(InMemoryCalendar::new()), None);

    let response = app
        .oneshot(get("/availability?date=2025-05-10&caregiver=Jos%C3%A9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["bookable"], false);
    assert_eq!(body["reason"], "weekend");
    assert_eq!(body["earliest_bookable_date"], "2025-05-07");
    assert!(body["slots"]
        .as_array()
        .unwrap()
        .iter()
        .all(|slot| slot["taken"] == true));
}

#[tokio::test]
async fn test_availability_bad_input() {
    let app = create_test_app(Arc::new(InMemoryCalendar::new()), None);

    let malformed = app
        .clone()
        .oneshot(get("/availability?date=12-05-2025&caregiver=jose"))
        .await
        .unwrap();
    assert_eq!(malformed.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(malformed).await["error"]["kind"], "validation");

    let missing = app
        .clone()
        .oneshot(get("/availability?date=2025-05-12"))
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let unknown = app
        .oneshot(get("/availability?date=2025-05-12&caregiver=Pedro"))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_calendar_failure_hides_detail() {
    let calendar = Arc::new(InMemoryCalendar::new());
    calendar.fail_list_with(CalendarError::Timeout(Duration::from_secs(10)));
    let app = create_test_app(calendar, None);

    let response = app
        .oneshot(get("/availability?date=2025-05-12&caregiver=jose"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = json_body(response).await;
    assert_eq!(body["error"]["retryable"], true);
    assert!(body["error"]["correlation_id"].is_string());
    assert!(!body["error"]["message"].as_str().unwrap().contains("10s"));
}

#[tokio::test]
async fn test_create_reservation() {
    let calendar = Arc::new(InMemoryCalendar::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let app = create_test_app(calendar.clone(), Some(notifier.clone()));

    let response = app
        .oneshot(post_json(
            "/reservations",
            &reservation_body("JOSÉ", &["09:00-10:00", "16:00-17:00"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["created"], 2);
    assert_eq!(body["date"], "2025-05-12");
    assert_eq!(body["ranges"], json!(["09:00-10:00", "16:00-17:00"]));
    assert_eq!(body["price"]["hours"], 2);
    assert_eq!(body["price"]["subtotal"], 30.0);
    assert_eq!(body["price"]["tax"], 6.3);
    assert_eq!(body["price"]["total"], 36.3);
    assert_eq!(body["price"]["currency"], "EUR");
    assert!(body["booking_id"].is_string());

    assert_eq!(calendar.events(JOSE_CALENDAR).len(), 2);
    assert_eq!(notifier.sent().len(), 1);
}

#[tokio::test]
async fn test_reservation_conflict() {
    let calendar = Arc::new(InMemoryCalendar::new());
    calendar.seed(
        JOSE_CALENDAR,
        madrid(2025, 5, 12, 16, 0),
        madrid(2025, 5, 12, 17, 0),
        "busy",
    );
    let app = create_test_app(calendar.clone(), None);

    let response = app
        .oneshot(post_json(
            "/reservations",
            &reservation_body("José", &["09:00-10:00", "16:00-17:00"]),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = json_body(response).await;
    assert_eq!(body["error"]["kind"], "conflict");
    assert_eq!(body["error"]["conflicts"], json!(["16:00-17:00"]));
    assert_eq!(calendar.total_events(), 1);
}

#[tokio::test]
async fn test_reservation_rejections() {
    let app = create_test_app(Arc::new(InMemoryCalendar::new()), None);

    let mut weekend = reservation_body("José", &["09:00-10:00"]);
    weekend["date"] = json!("2025-05-10");
    let response = app
        .clone()
        .oneshot(post_json("/reservations", &weekend))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"]["kind"], "policy_rejected");

    let mut nameless = reservation_body("José", &["09:00-10:00"]);
    nameless["customer"]["name"] = json!("");
    let response = app
        .clone()
        .oneshot(post_json("/reservations", &nameless))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let message = json_body(response).await["error"]["message"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(message.contains("customer.name"));

    let response = app
        .oneshot(
            axum::http::Request::builder()
                .method("POST")
                .uri("/reservations")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_reservation() {
    let calendar = Arc::new(InMemoryCalendar::new());
    let event_id = calendar.seed(
        JOSE_CALENDAR,
        madrid(2025, 5, 12, 9, 0),
        madrid(2025, 5, 12, 10, 0),
        "Reserva",
    );
    let app = create_test_app(calendar.clone(), None);
    let uri = format!("/admin/reservations/jose/{}", event_id);

    let response = app.clone().oneshot(delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["success"], true);
    assert_eq!(calendar.total_events(), 0);

    let response = app.oneshot(delete(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_caregivers() {
    let app = create_test_app(Arc::new(InMemoryCalendar::new()), None);

    let response = app.oneshot(get("/caregivers")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"caregivers": ["José", "Ana María"]})
    );
}

#[tokio::test]
async fn test_health_probes_calendars() {
    let calendar = Arc::new(InMemoryCalendar::new());
    let app = create_test_app(calendar.clone(), None);

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "ok", "calendars_checked": 2})
    );

    calendar.fail_probe_with(CalendarError::Unauthorized("invalid_grant".to_string()));
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["error"]["retryable"], false);
    assert!(!body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("invalid_grant"));
}
