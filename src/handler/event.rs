//! Invocation event extraction
//!
//! Builds an `InvocationEvent` from a query string or a JSON request body.

use serde_json::Value;

use crate::dispatch::InvocationEvent;

/// Read `action` from a query string such as `action=system-stats&x=1`
///
/// The first `action` parameter wins. A missing or empty value leaves the
/// action absent.
pub fn event_from_query(query: Option<&str>) -> InvocationEvent {
    let pairs: Vec<(String, String)> = query
        .and_then(|q| serde_urlencoded::from_str(q).ok())
        .unwrap_or_default();

    let action = pairs
        .into_iter()
        .find(|(key, _)| key == "action")
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty());

    InvocationEvent { action }
}

/// Parse a JSON request body; an empty body is an event without action
pub fn event_from_body(body: &[u8]) -> Result<InvocationEvent, String> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(InvocationEvent::default());
    }

    let value: Value =
        serde_json::from_slice(body).map_err(|e| format!("Request body is not valid JSON: {e}"))?;
    if !value.is_object() {
        return Err("Request body must be a JSON object".to_string());
    }
    serde_json::from_value(value).map_err(|e| format!("Invalid invocation event: {e}"))
}
