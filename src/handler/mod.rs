//! Request handler module
//!
//! Turns HTTP requests into invocation events, runs the dispatcher and
//! renders its response record back as HTTP.

mod event;
pub mod router;

// Re-export main entry point
pub use router::handle_request;
