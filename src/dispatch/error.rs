// Dispatcher error module

use hyper::StatusCode;

use super::payload::{ErrorPayload, INTERNAL_ERROR};
use super::response::Response;

/// Fault raised while building a response
///
/// The dispatcher never returns this to its caller; it is folded into a 500
/// response by [`InternalError::to_response`].
#[derive(Debug, thiserror::Error)]
pub enum InternalError {
    #[error("failed to encode response body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl InternalError {
    pub fn to_response(&self, timestamp: &str) -> Response {
        let message = self.to_string();
        let body = serde_json::to_string(&ErrorPayload::new(&message, timestamp))
            .unwrap_or_else(|_| format!(r#"{{"error":"{INTERNAL_ERROR}"}}"#));
        Response::json(StatusCode::INTERNAL_SERVER_ERROR, body)
    }
}
