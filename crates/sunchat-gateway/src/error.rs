//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use sunchat_core::SunChatError;

/// An error returned by an API handler; wraps the domain error and maps it
/// onto the HTTP taxonomy: validation → 400, not-found → 404, upstream and
/// store failures → 500.
#[derive(Debug)]
pub struct ApiError(pub SunChatError);

impl From<SunChatError> for ApiError {
    fn from(e: SunChatError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            SunChatError::Validation(m) => (StatusCode::BAD_REQUEST, m.clone()),
            SunChatError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            // Upstream messages are already generic; store/config details
            // are logged server-side, not leaked to the widget.
            SunChatError::Upstream(m) => (StatusCode::INTERNAL_SERVER_ERROR, m.clone()),
            other => {
                tracing::error!("internal error: {other}");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal server error".to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
