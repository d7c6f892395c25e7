//! HTTP response building module
//!
//! Gateway-level responses. Every builder attaches the CORS origin header so
//! browsers can read rejections as well as dispatcher output.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{HeaderValue, SERVER};
use hyper::{Response, StatusCode};
use serde::Serialize;

use super::{ALLOW_ORIGIN_ANY, CONTENT_TYPE_JSON};

const INTERNAL_ERROR_BODY: &str = r#"{"error":"Internal server error"}"#;

/// Build a JSON response from any serializable value
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_string(body) {
        Ok(json) => json_body(status, json),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_internal_error_response()
        }
    }
}

/// Build CORS preflight response (OPTIONS)
pub fn build_preflight_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN_ANY)
        .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
        .header("Access-Control-Allow-Headers", "Content-Type")
        .header("Access-Control-Max-Age", "86400")
        .body(Full::new(Bytes::new()))
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(Full::new(Bytes::new()))
        })
}

/// Build liveness check response
pub fn build_health_response(body: &'static str) -> Response<Full<Bytes>> {
    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/plain")
        .header("Cache-Control", "no-cache")
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN_ANY)
        .body(Full::new(Bytes::from(body)))
        .unwrap_or_else(|e| {
            log_build_error("health", &e);
            Response::new(Full::new(Bytes::from(body)))
        })
}

/// Build 400 Bad Request response
pub fn build_400_response(message: &str) -> Response<Full<Bytes>> {
    json_error(StatusCode::BAD_REQUEST, "Bad Request", message)
}

/// Build 404 Not Found response
pub fn build_404_response(path: &str) -> Response<Full<Bytes>> {
    json_error(
        StatusCode::NOT_FOUND,
        "Not Found",
        &format!("No route for {path}"),
    )
}

/// Build 405 Method Not Allowed response
pub fn build_405_response(allow: &'static str) -> Response<Full<Bytes>> {
    let mut resp = json_error(
        StatusCode::METHOD_NOT_ALLOWED,
        "Method Not Allowed",
        &format!("Allowed methods: {allow}"),
    );
    resp.headers_mut()
        .insert("Allow", HeaderValue::from_static(allow));
    resp
}

/// Build 413 Payload Too Large response
pub fn build_413_response(max_body_size: u64) -> Response<Full<Bytes>> {
    json_error(
        StatusCode::PAYLOAD_TOO_LARGE,
        "Payload Too Large",
        &format!("Request body exceeds {max_body_size} bytes"),
    )
}

/// Build the last-resort 500 response used when a builder itself fails
pub fn build_internal_error_response() -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::from(INTERNAL_ERROR_BODY)));
    *resp.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    let headers = resp.headers_mut();
    headers.insert("Content-Type", HeaderValue::from_static(CONTENT_TYPE_JSON));
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static(ALLOW_ORIGIN_ANY),
    );
    resp
}

/// Set the `Server` header; invalid names are skipped
pub fn with_server_name(mut resp: Response<Full<Bytes>>, server_name: &str) -> Response<Full<Bytes>> {
    match HeaderValue::from_str(server_name) {
        Ok(value) => {
            resp.headers_mut().insert(SERVER, value);
        }
        Err(_) => {
            crate::logger::log_warning(&format!("Invalid server name header: {server_name:?}"));
        }
    }
    resp
}

fn json_error(status: StatusCode, error: &str, message: &str) -> Response<Full<Bytes>> {
    let body = serde_json::json!({
        "error": error,
        "message": message,
    });
    json_body(status, body.to_string())
}

fn json_body(status: StatusCode, json: String) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .header("Content-Type", CONTENT_TYPE_JSON)
        .header("Access-Control-Allow-Origin", ALLOW_ORIGIN_ANY)
        .body(Full::new(Bytes::from(json)))
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            build_internal_error_response()
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(resp: Response<Full<Bytes>>) -> serde_json::Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_preflight_headers() {
        let resp = build_preflight_response();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(resp.headers()["access-control-allow-origin"], "*");
        assert_eq!(
            resp.headers()["access-control-allow-methods"],
            "GET, POST, OPTIONS"
        );
        assert_eq!(resp.headers()["access-control-allow-headers"], "Content-Type");
    }

    #[tokio::test]
    async fn test_rejections_are_json_with_cors() {
        let responses = [
            build_400_response("bad"),
            build_404_response("/missing"),
            build_405_response("POST"),
            build_413_response(10),
            build_internal_error_response(),
        ];
        for resp in responses {
            assert_eq!(resp.headers()["access-control-allow-origin"], "*");
            assert_eq!(resp.headers()["content-type"], "application/json");
            let body = body_json(resp).await;
            assert!(body["error"].is_string());
        }
    }

    #[test]
    fn test_405_allow_header() {
        let resp = build_405_response("POST");
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(resp.headers()["allow"], "POST");
    }

    #[test]
    fn test_server_name() {
        let resp = with_server_name(build_health_response("ok"), "itsandbox-backend");
        assert_eq!(resp.headers()["server"], "itsandbox-backend");

        let resp = with_server_name(build_health_response("ok"), "bad\nname");
        assert!(resp.headers().get("server").is_none());
    }
}
