// --- File: crates/careslot_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use tracing::error;
use uuid::Uuid;

use crate::error::{CareslotError, HttpStatusCode};

const GENERIC_UPSTREAM_MESSAGE: &str = "The calendar service is currently unavailable.";
const GENERIC_INTERNAL_MESSAGE: &str = "An internal error occurred.";

/// Extension trait for CareslotError to convert it to an Axum HTTP response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

/// Builds the JSON error body.
///
/// Caller-facing kinds carry their message verbatim. Upstream and internal
/// failures get a generic message plus a correlation id; the full detail is
/// logged server-side under the same id.
pub fn error_body(err: &CareslotError) -> Value {
    let code = err.status_code();
    let mut body = json!({
        "kind": err.kind(),
        "code": code,
    });

    if err.is_public() {
        body["message"] = json!(match err {
            CareslotError::ValidationError(msg)
            | CareslotError::PolicyRejected(msg)
            | CareslotError::NotFoundError(msg) => msg.clone(),
            CareslotError::ConflictError { message, .. } => message.clone(),
            other => other.to_string(),
        });
        if let CareslotError::ConflictError { ranges, .. } = err {
            body["conflicts"] = json!(ranges);
        }
    } else {
        let correlation_id = Uuid::new_v4().to_string();
        error!(correlation_id = %correlation_id, kind = err.kind(), "{}", err);
        body["correlation_id"] = json!(correlation_id);
        match err {
            CareslotError::UpstreamError { retryable, .. } => {
                body["message"] = json!(GENERIC_UPSTREAM_MESSAGE);
                body["retryable"] = json!(retryable);
            }
            _ => body["message"] = json!(GENERIC_INTERNAL_MESSAGE),
        }
    }

    json!({ "error": body })
}

impl IntoHttpResponse for CareslotError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status_code, Json(error_body(&self))).into_response()
    }
}

/// Implement IntoResponse for CareslotError to make it easier to use in Axum handlers.
impl IntoResponse for CareslotError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Converts a Result<T, CareslotError> to a Result<Json<T>, Response>.
pub fn handle_json_result<T>(result: Result<T, CareslotError>) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
{
    result.map(Json).map_err(|err| err.into_response())
}

/// Converts a Result<T, E> to a Result<Json<T>, Response> using a custom error mapper.
/// Handlers use this to turn domain-specific errors into HTTP responses.
pub fn map_json_error<T, E, F>(result: Result<T, E>, f: F) -> Result<Json<T>, Response>
where
    T: serde::Serialize,
    F: FnOnce(E) -> CareslotError,
{
    result.map(Json).map_err(|err| f(err).into_response())
}
