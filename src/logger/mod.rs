//! Logger module
//!
//! Provides logging utilities for the file server including:
//! - Startup banner
//! - Access logging with multiple formats
//! - Error and warning logging
//! - File-based logging support and silent mode

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use crate::server::PortConflict;
use std::path::Path;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        config.server.silent,
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_warning(message: &str) {
    match writer::get() {
        Some(w) => w.write_warning(message),
        None => eprintln!("{message}"),
    }
}

fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// "Serving!" banner printed once the listener is bound
pub fn log_server_start(
    local_url: &str,
    root: &Path,
    conflict: Option<&PortConflict>,
    config: &Config,
) {
    write_info("======================================");
    write_info("Serving!");
    write_info(&format!("- Local:     {local_url}"));
    write_info(&format!("- Directory: {}", root.display()));
    if let Some(workers) = config.server.workers {
        write_info(&format!("- Workers:   {workers}"));
    }
    if config.server.unzipped {
        write_info("- Compression disabled");
    }
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("- Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("- Error log: {path}"));
    }
    if let Some(conflict) = conflict {
        write_info(&format!(
            "This port was picked because {} is in use.",
            conflict.old
        ));
    }
    write_info("======================================\n");
}

pub fn log_info(message: &str) {
    write_info(message);
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_tls_handshake_failed(peer: &str, err: &std::io::Error) {
    write_warning(&format!("[WARN] TLS handshake with {peer} failed: {err}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_warning(&format!("[WARN] {message}"));
}

pub fn log_traversal_blocked(request_path: &str) {
    log_warning(&format!("Path traversal attempt blocked: {request_path}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown() {
    write_info("\n[Shutdown] Stopped accepting connections");
}
