//! Configuration management for hallticket.
//!
//! This module provides TOML-based configuration loading, parsing, and validation.
//!
//! # Overview
//!
//! hallticket uses TOML configuration files with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HALLTICKET_*` overrides and the usual Supabase project variables
//! - Default values for optional settings
//! - Validation on load
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use hallticket::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hallticket.toml")?;
//!
//! println!("Backend: {}", config.backend.base_url);
//! println!("Exam: {}", config.exam.display_name());
//! println!("Tickets per page: {}", config.output.grid_arity);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`BackendConfig`] - Backend URL, key, tenant and retries
//! - [`ExamSchedule`](crate::domain::ExamSchedule) - Exam name and subjects
//! - [`RenderConfig`] - Scale, background, asset deadline, font
//! - [`PhotoConfig`] - Photo lookup strategy order and prefetch
//! - [`OutputConfig`] - Output directory and page grid
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [backend]
//! base_url = "https://abcd.supabase.co"
//! anon_key = "${SUPABASE_ANON_KEY}"
//! tenant_id = "9abe534f-1a12-474c-a387-f8795ad3ab5a"
//!
//! [exam]
//! name = "Annual Examination"
//!
//! [[exam.subjects]]
//! name = "Mathematics"
//! date = "2025-03-04"
//! start = "09:00:00"
//! end = "12:00:00"
//!
//! [output]
//! grid_arity = 2
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, BackendConfig, HallTicketConfig, LoggingConfig, OutputConfig, PhotoConfig,
    RenderConfig, RetryConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
