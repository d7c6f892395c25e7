//! Logger module
//!
//! Provides logging utilities for the backend including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging
//! - The dispatcher's diagnostic sink (`ServerLog`)

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use chrono::Local;
use std::net::SocketAddr;

use crate::config::Config;
use crate::dispatch::{DispatchLog, InternalError};

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn stamp(message: &str) -> String {
    format!("{} {message}", Local::now().format("%Y-%m-%d %H:%M:%S%.3f"))
}

/// Write to info/access log
fn write_info(message: &str) {
    let line = stamp(message);
    match writer::get() {
        Some(w) => w.info(&line),
        None => println!("{line}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    let line = stamp(message);
    match writer::get() {
        Some(w) => w.error(&line),
        None => eprintln!("{line}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("ITSANDBOX backend started");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!(
        "Dispatch: {}  Invoke: {}",
        config.http.dispatch_path, config.http.invoke_path
    ));
    if config.health.enabled {
        write_info(&format!("Liveness: {}", config.health.liveness_path));
    }
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    if let Some(max) = config.performance.max_connections {
        write_info(&format!("Max connections: {max}"));
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}

pub fn log_shutdown_requested(signal: &str) {
    write_info(&format!("[SIGNAL] {signal} received, shutting down"));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[SHUTDOWN] All connections drained");
    } else {
        log_warning(&format!(
            "[SHUTDOWN] Grace period elapsed with {remaining} connection(s) still open"
        ));
    }
}

/// Dispatcher diagnostics routed through the server log
pub struct ServerLog {
    log_events: bool,
}

impl ServerLog {
    pub const fn new(log_events: bool) -> Self {
        Self { log_events }
    }
}

impl DispatchLog for ServerLog {
    fn event(&self, event_json: &str) {
        if self.log_events {
            write_info(&format!("[Dispatch] Event: {event_json}"));
        }
    }

    fn fault(&self, error: &InternalError) {
        log_error(&format!("Dispatch failed: {error}"));
    }
}
