//! Domain error types
//!
//! This module defines the error hierarchy for hallticket.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main hallticket error type
///
/// This is the primary error type used throughout the application.
/// It wraps specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum HallTicketError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Backend (PostgREST) errors
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Ticket rendering errors
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    /// Export aborted before any page was emitted
    #[error("Export aborted: {0}")]
    Aborted(#[from] ExportAbort),

    /// PDF document assembly errors
    #[error("Document error: {0}")]
    Document(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Backend-specific errors
///
/// Errors that occur when reading from the hosted school database.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Failed to connect to the backend
    #[error("Failed to connect to backend: {0}")]
    ConnectionFailed(String),

    /// The anon key was rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response body could not be decoded
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    /// Query rejected by the backend
    #[error("Query failed on {table}: {message}")]
    QueryFailed { table: String, message: String },

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Request timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

impl BackendError {
    /// Whether a retry of the same read could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            BackendError::ConnectionFailed(_)
                | BackendError::ServerError { .. }
                | BackendError::Timeout(_)
        )
    }
}

/// Asset and rendering errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Asset reference could not be fetched
    #[error("Failed to fetch asset {reference}: {message}")]
    AssetFetch { reference: String, message: String },

    /// Asset bytes are not a supported image
    #[error("Failed to decode image {reference}: {message}")]
    Decode { reference: String, message: String },

    /// Remote asset loading is disabled by configuration
    #[error("Remote asset loading disabled: {0}")]
    RemoteDisabled(String),

    /// Font file unusable
    #[error("Invalid font {0}")]
    Font(String),
}

/// Fatal preconditions that abort an export before any work is emitted
#[derive(Debug, Error)]
pub enum ExportAbort {
    /// No class was given
    #[error("no class selected")]
    NoClassSelected,

    /// The class id does not exist for this tenant
    #[error("class not found: {0}")]
    ClassNotFound(String),

    /// The roster has no students
    #[error("no students found in class {0}")]
    EmptyRoster(String),

    /// The class or roster read failed
    #[error("could not load roster: {0}")]
    RosterUnavailable(#[source] BackendError),
}

impl ExportAbort {
    /// Wraps a failed class or roster read, keeping the backend cause
    pub fn roster_unavailable(error: HallTicketError) -> Self {
        match error {
            HallTicketError::Backend(source) => ExportAbort::RosterUnavailable(source),
            other => {
                ExportAbort::RosterUnavailable(BackendError::InvalidResponse(other.to_string()))
            }
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HallTicketError {
    fn from(err: std::io::Error) -> Self {
        HallTicketError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HallTicketError {
    fn from(err: serde_json::Error) -> Self {
        HallTicketError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HallTicketError {
    fn from(err: toml::de::Error) -> Self {
        HallTicketError::Configuration(format!("TOML parse error: {err}"))
    }
}
