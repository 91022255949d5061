//! CLI command implementations
//!
//! This module contains all CLI command implementations. Every command
//! returns a process exit code:
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | Success |
//! | 1 | Completed, some tickets degraded or photos unusable |
//! | 2 | Configuration error |
//! | 3 | Export aborted (no class, unknown class, empty roster) |
//! | 4 | Backend connection error, also when it stops the roster read |
//! | 5 | Fatal error |

pub mod classes;
pub mod export;
pub mod init;
pub mod photos;
pub mod students;
pub mod ticket;
pub mod validate;

use crate::config::{load_config, HallTicketConfig};
use crate::domain::{BackendError, ExportAbort, HallTicketError};

pub const EXIT_OK: i32 = 0;
pub const EXIT_DEGRADED: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_ABORTED: i32 = 3;
pub const EXIT_CONNECTION: i32 = 4;
pub const EXIT_FATAL: i32 = 5;

/// Exit code for an error surfaced by a command
pub fn exit_code_for(error: &HallTicketError) -> i32 {
    match error {
        HallTicketError::Configuration(_) | HallTicketError::Validation(_) => EXIT_CONFIG,
        HallTicketError::Aborted(ExportAbort::RosterUnavailable(source))
            if is_connection_error(source) =>
        {
            EXIT_CONNECTION
        }
        HallTicketError::Aborted(_) => EXIT_ABORTED,
        HallTicketError::Backend(source) if is_connection_error(source) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

fn is_connection_error(error: &BackendError) -> bool {
    matches!(
        error,
        BackendError::ConnectionFailed(_)
            | BackendError::Timeout(_)
            | BackendError::AuthenticationFailed(_)
    )
}

/// Loads and validates the configuration, printing the failure
pub(crate) fn load_or_report(config_path: &str) -> Option<HallTicketConfig> {
    match load_config(config_path) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::error!(error = %e, config_path = %config_path, "Failed to load configuration");
            println!("❌ Failed to load configuration file: {config_path}");
            println!("   Error: {e}");
            None
        }
    }
}
