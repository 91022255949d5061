//! Logging and observability
//!
//! This module provides structured logging with support for:
//! - Console output filtered by `RUST_LOG` or the configured level
//! - JSON-formatted local log files with rotation
//!
//! # Example
//!
//! ```no_run
//! use hallticket::logging::init_logging;
//! use hallticket::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

// Re-export commonly used items
pub use structured::{init_logging, LoggingGuard};

/// Log the start of a bulk export
///
/// # Example
///
/// ```no_run
/// use hallticket::log_export_start;
///
/// log_export_start!("c-10a", 32, 2);
/// ```
#[macro_export]
macro_rules! log_export_start {
    ($class_id:expr, $students:expr, $arity:expr) => {
        tracing::info!(
            class_id = %$class_id,
            students = $students,
            grid_arity = $arity,
            "Starting hall ticket export"
        );
    };
}

/// Log the completion of an export
///
/// # Example
///
/// ```no_run
/// use hallticket::log_export_complete;
/// use std::time::Duration;
///
/// log_export_complete!(32, 16, Duration::from_secs(10));
/// ```
#[macro_export]
macro_rules! log_export_complete {
    ($tickets:expr, $pages:expr, $duration:expr) => {
        tracing::info!(
            tickets = $tickets,
            pages = $pages,
            duration_ms = $duration.as_millis() as u64,
            "Hall ticket export completed"
        );
    };
}

/// Log a ticket that was rendered with a placeholder
///
/// # Example
///
/// ```no_run
/// use hallticket::log_ticket_degraded;
///
/// log_ticket_degraded!("s-001", "Photo failed to load");
/// ```
#[macro_export]
macro_rules! log_ticket_degraded {
    ($student_id:expr, $reason:expr) => {
        tracing::warn!(
            student_id = %$student_id,
            reason = %$reason,
            "Ticket rendered with placeholder"
        );
    };
}

/// Log a retry attempt
///
/// # Example
///
/// ```no_run
/// use hallticket::log_retry_attempt;
///
/// log_retry_attempt!(2, 3, 1000u64, "Connection timeout");
/// ```
#[macro_export]
macro_rules! log_retry_attempt {
    ($attempt:expr, $max_attempts:expr, $delay_ms:expr, $reason:expr) => {
        tracing::warn!(
            attempt = $attempt,
            max_attempts = $max_attempts,
            delay_ms = $delay_ms,
            reason = %$reason,
            "Retrying backend request"
        );
    };
}
