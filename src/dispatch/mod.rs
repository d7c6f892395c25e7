//! Request dispatcher
//!
//! Maps an invocation's `action` label to one of a fixed set of canned JSON
//! responses. Every call produces exactly one well-formed [`Response`]; faults
//! while building the body are folded into a 500 response.
//!
//! Logging, the clock and the body encoder are injected so the dispatcher
//! holds no ambient state.

mod error;
mod event;
mod payload;
mod response;

use chrono::{DateTime, SecondsFormat, Utc};
use hyper::StatusCode;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

pub use error::InternalError;
pub use event::{Action, InvocationEvent};
pub use response::Response;

/// `system-stats` responses may be cached by clients for five minutes
const SYSTEM_STATS_CACHE_CONTROL: &str = "public, max-age=300";

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Turns a payload into the text stored in `Response::body`
pub trait BodyEncoder: Send + Sync {
    fn encode(&self, payload: &Value) -> serde_json::Result<String>;
}

pub struct JsonEncoder;

impl BodyEncoder for JsonEncoder {
    fn encode(&self, payload: &Value) -> serde_json::Result<String> {
        serde_json::to_string(payload)
    }
}

/// Diagnostic sink for the dispatcher
pub trait DispatchLog: Send + Sync {
    /// Called once per invocation, before classification
    fn event(&self, event_json: &str);
    /// Called when building the response failed
    fn fault(&self, error: &InternalError);
}

pub struct Dispatcher {
    log: Arc<dyn DispatchLog>,
    clock: Arc<dyn Clock>,
    encoder: Arc<dyn BodyEncoder>,
}

impl Dispatcher {
    pub fn new(log: Arc<dyn DispatchLog>) -> Self {
        Self {
            log,
            clock: Arc::new(SystemClock),
            encoder: Arc::new(JsonEncoder),
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[cfg(test)]
    #[must_use]
    pub fn with_encoder(mut self, encoder: Arc<dyn BodyEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    /// Dispatch one invocation. Never fails.
    pub fn dispatch(&self, event: &InvocationEvent) -> Response {
        self.log.event(&event.to_log_json());

        match self.try_dispatch(event) {
            Ok(response) => response,
            Err(err) => {
                self.log.fault(&err);
                err.to_response(&self.timestamp())
            }
        }
    }

    fn try_dispatch(&self, event: &InvocationEvent) -> Result<Response, InternalError> {
        let timestamp = self.timestamp();

        match event.action() {
            Action::HealthCheck => {
                let body = self.encode(&payload::HealthPayload::new(&timestamp))?;
                Ok(Response::json(StatusCode::OK, body))
            }
            Action::SystemStats => {
                let body = self.encode(&payload::SystemStatsPayload::new(&timestamp))?;
                Ok(Response::json(StatusCode::OK, body)
                    .with_header("Cache-Control", SYSTEM_STATS_CACHE_CONTROL))
            }
            Action::Other(label) => {
                let body = self.encode(&payload::EchoPayload::new(label, &timestamp))?;
                Ok(Response::json(StatusCode::OK, body))
            }
        }
    }

    fn encode<T: Serialize>(&self, payload: &T) -> Result<String, InternalError> {
        let value = serde_json::to_value(payload)?;
        Ok(self.encoder.encode(&value)?)
    }

    /// ISO-8601 in UTC with millisecond precision, e.g. `2026-10-18T09:15:02.123Z`
    fn timestamp(&self) -> String {
        self.clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
