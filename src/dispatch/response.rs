// Dispatcher response record
// HTTP-shaped output: status code, unique headers, JSON text body

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::StatusCode;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::http::{ALLOW_ORIGIN_ANY, CONTENT_TYPE_JSON};
use crate::logger;

/// Response record handed back to the gateway
///
/// Serializes as `{"statusCode":..,"headers":{..},"body":".."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    /// JSON response carrying the content type and the fixed CORS origin
    pub fn json(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            ("Content-Type".to_string(), CONTENT_TYPE_JSON.to_string()),
            (
                "Access-Control-Allow-Origin".to_string(),
                ALLOW_ORIGIN_ANY.to_string(),
            ),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_string(), value.into());
        self
    }

    /// Case-insensitive header lookup
    #[cfg(test)]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Render as a hyper response
    pub fn into_http(self) -> hyper::Response<Full<Bytes>> {
        let mut builder = hyper::Response::builder().status(self.status_code);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder
            .body(Full::new(Bytes::from(self.body)))
            .unwrap_or_else(|e| {
                logger::log_error(&format!("Failed to render dispatcher response: {e}"));
                crate::http::build_internal_error_response()
            })
    }
}
