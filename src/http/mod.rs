//! HTTP protocol layer module
//!
//! Response builders and header constants shared by the gateway and the
//! dispatcher's response record.

pub mod response;

/// Fixed CORS policy: any origin may read any response
pub const ALLOW_ORIGIN_ANY: &str = "*";
pub const CONTENT_TYPE_JSON: &str = "application/json";

// Re-export commonly used builders
pub use response::{
    build_400_response, build_404_response, build_405_response, build_413_response,
    build_health_response, build_internal_error_response, build_json_response,
    build_preflight_response, with_server_name,
};
