//! Logger module
//!
//! Provides logging utilities for the dinners server including:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging, with full cause chains for load failures
//! - File-based logging support

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::Config;
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    writer::init(
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
        Level::parse(&config.logging.level),
    )
}

fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_info(message),
        None => println!("{message}"),
    }
}

fn write_error(level: Level, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    write_info("======================================");
    write_info("Dinners server started successfully");
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    match &config.data.base_dir {
        Some(dir) => write_info(&format!(
            "Data file: {} (relative to {dir})",
            config.data.relative_path
        )),
        None => write_info(&format!(
            "Data file: {} (relative to working directory)",
            config.data.relative_path
        )),
    }
    write_info(&format!("Page route: {}", config.routes.page_path));
    write_info(&format!("Data route: {}", config.routes.data_path));
    if let Some(ref path) = config.logging.access_log_file {
        write_info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        write_info(&format!("Error log: {path}"));
    }
    write_info("======================================\n");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        Level::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_info(message: &str) {
    write_info(&format!("[INFO] {message}"));
}

pub fn log_error(message: &str) {
    write_error(Level::Error, &format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(Level::Warn, &format!("[WARN] {message}"));
}

/// Log a failure together with every `source()` below it
pub fn log_failure_chain(context: &str, err: &(dyn std::error::Error + 'static)) {
    write_error(Level::Error, &format_failure_chain(context, err));
}

/// `context: top error` followed by one `caused by:` line per source
pub fn format_failure_chain(context: &str, err: &(dyn std::error::Error + 'static)) -> String {
    let mut line = format!("[ERROR] {context}: {err}");
    let mut cause = err.source();
    while let Some(e) = cause {
        line.push_str(&format!("\n        caused by: {e}"));
        cause = e.source();
    }
    line
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}

pub fn log_shutdown(active: usize) {
    write_info(&format!(
        "[Shutdown] Listener closed, waiting for {active} active connection(s)"
    ));
}

pub fn log_shutdown_complete(remaining: usize) {
    if remaining == 0 {
        write_info("[Shutdown] All connections finished");
    } else {
        write_error(
            Level::Warn,
            &format!("[WARN] [Shutdown] Grace period elapsed with {remaining} connection(s) open"),
        );
    }
}
