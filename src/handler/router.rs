//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: preflight, liveness, the two
//! dispatcher routes and access logging.

use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderMap, CONTENT_LENGTH, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use super::event::{event_from_body, event_from_query};
use crate::config::AppState;
use crate::dispatch::InvocationEvent;
use crate::http;
use crate::logger::{self, AccessLogEntry};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Outcome of routing: the response and, when the dispatcher ran, its action
struct Routed {
    response: Response<Full<Bytes>>,
    action: Option<String>,
}

impl Routed {
    const fn gateway(response: Response<Full<Bytes>>) -> Self {
        Self {
            response,
            action: None,
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut entry = state.config.logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            remote_addr.to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.user_agent = req
            .headers()
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        entry
    });

    let routed = route_request(req, &state).await;
    let response = http::with_server_name(routed.response, &state.config.http.server_name);

    if let Some(entry) = entry.as_mut() {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.action = routed.action;
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on method, path and configuration
async fn route_request<B>(req: Request<B>, state: &AppState) -> Routed
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let http_config = &state.config.http;
    let health = &state.config.health;

    // 1. CORS preflight on any path
    if method == Method::OPTIONS {
        return Routed::gateway(http::build_preflight_response());
    }

    // 2. Liveness check
    if health.enabled && path == health.liveness_path {
        // hyper omits the entity of HEAD responses but keeps Content-Length
        return match method {
            Method::GET | Method::HEAD => Routed::gateway(http::build_health_response("ok")),
            _ => Routed::gateway(http::build_405_response("GET, HEAD, OPTIONS")),
        };
    }

    // 3. Direct invocation: respond with the serialized response record
    if path == http_config.invoke_path {
        if method != Method::POST {
            logger::log_warning(&format!("Method not allowed on {path}: {method}"));
            return Routed::gateway(http::build_405_response("POST, OPTIONS"));
        }
        let event = match read_event(req, http_config.max_body_size).await {
            Ok(event) => event,
            Err(rejection) => return Routed::gateway(rejection),
        };
        let record = state.dispatcher.dispatch(&event);
        return Routed {
            response: http::build_json_response(StatusCode::OK, &record),
            action: Some(event.action().label().to_string()),
        };
    }

    // 4. Gateway dispatch: render the response record as HTTP
    if path == http_config.dispatch_path {
        let event = match method {
            Method::GET | Method::HEAD => event_from_query(req.uri().query()),
            Method::POST => match read_event(req, http_config.max_body_size).await {
                Ok(event) => event,
                Err(rejection) => return Routed::gateway(rejection),
            },
            _ => {
                logger::log_warning(&format!("Method not allowed on {path}: {method}"));
                return Routed::gateway(http::build_405_response("GET, HEAD, POST, OPTIONS"));
            }
        };
        return Routed {
            response: state.dispatcher.dispatch(&event).into_http(),
            action: Some(event.action().label().to_string()),
        };
    }

    Routed::gateway(http::build_404_response(&path))
}

/// Read and parse the request body into an invocation event
///
/// Rejections (413, 400) are returned as ready-made responses.
async fn read_event<B>(
    req: Request<B>,
    max_body_size: u64,
) -> Result<InvocationEvent, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if let Some(resp) = check_body_size(req.headers(), max_body_size) {
        return Err(resp);
    }

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let bytes = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body too large while reading (max: {max_body_size})"
            ));
            return Err(http::build_413_response(max_body_size));
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            return Err(http::build_400_response("Failed to read request body"));
        }
    };

    event_from_body(&bytes).map_err(|message| {
        logger::log_warning(&message);
        http::build_400_response(&message)
    })
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(headers: &HeaderMap, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response(max_body_size))
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}
