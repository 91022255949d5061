//! Configuration schema types
//!
//! This module defines the configuration structure that maps to
//! `hallticket.toml`.

use crate::config::SecretString;
use crate::core::layout::{GridAlignment, GridArity, LastPagePolicy};
use crate::core::photo::PhotoSource;
use crate::domain::{ExamSchedule, TenantId};
use serde::Deserialize;

/// Main hallticket configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HallTicketConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,

    /// Exam name and subject schedule printed on every ticket
    #[serde(default)]
    pub exam: ExamSchedule,

    /// Ticket rendering settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Photo lookup settings
    #[serde(default)]
    pub photo: PhotoConfig,

    /// Output document settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HallTicketConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.backend.validate()?;
        self.render.validate()?;
        self.photo.validate()?;
        self.output.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

/// Retry configuration for idempotent backend reads
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Initial delay in milliseconds
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay in milliseconds
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Backoff multiplier
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
        }
    }
}

/// Hosted backend (Supabase / PostgREST) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Project URL, e.g. `https://abcd.supabase.co`
    #[serde(default)]
    pub base_url: String,

    /// Anon API key sent as `apikey` and bearer token
    #[serde(default)]
    pub anon_key: Option<SecretString>,

    /// Tenant every query is scoped to
    #[serde(default)]
    pub tenant_id: String,

    /// Value of the `x-application-name` header
    #[serde(default = "default_application_name")]
    pub application_name: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// TLS certificate verification
    #[serde(default = "default_true")]
    pub tls_verify: bool,

    /// Relation tag of the guardian printed on tickets
    #[serde(default = "default_guardian_relation")]
    pub guardian_relation: String,

    /// Retry configuration
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            anon_key: None,
            tenant_id: String::new(),
            application_name: default_application_name(),
            timeout_seconds: default_timeout_seconds(),
            tls_verify: true,
            guardian_relation: default_guardian_relation(),
            retry: RetryConfig::default(),
        }
    }
}

impl BackendConfig {
    fn validate(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        if self.base_url.is_empty() {
            return Err("backend.base_url cannot be empty".to_string());
        }

        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| format!("backend.base_url is not a valid URL: {e}"))?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err("backend.base_url must start with http:// or https://".to_string());
        }

        match &self.anon_key {
            Some(key) if !key.expose_secret().is_blank() => {}
            _ => return Err("backend.anon_key is required".to_string()),
        }

        self.tenant()?;

        if self.timeout_seconds == 0 {
            return Err("backend.timeout_seconds must be > 0".to_string());
        }

        if self.retry.max_retries == 0 {
            return Err("backend.retry.max_retries must be >= 1".to_string());
        }

        if self.guardian_relation.trim().is_empty() {
            return Err("backend.guardian_relation cannot be empty".to_string());
        }

        Ok(())
    }

    /// Parsed tenant id
    pub fn tenant(&self) -> Result<TenantId, String> {
        TenantId::new(self.tenant_id.as_str()).map_err(|e| format!("backend.tenant_id: {e}"))
    }
}

/// Ticket rendering configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Upscale factor applied to the ticket canvas
    #[serde(default = "default_scale")]
    pub scale: f32,

    /// Opaque canvas background as `#RRGGBB`
    #[serde(default = "default_background")]
    pub background: String,

    /// Shared deadline for logo, photo and watermark loads
    #[serde(default = "default_asset_timeout_ms")]
    pub asset_timeout_ms: u64,

    /// Load `http(s)://` asset references
    #[serde(default = "default_true")]
    pub allow_remote_images: bool,

    /// TrueType font used for ticket text
    #[serde(default)]
    pub font_path: Option<String>,

    /// Watermark image reference drawn faintly behind the ticket body
    #[serde(default)]
    pub watermark: Option<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            background: default_background(),
            asset_timeout_ms: default_asset_timeout_ms(),
            allow_remote_images: true,
            font_path: None,
            watermark: None,
        }
    }
}

impl RenderConfig {
    fn validate(&self) -> Result<(), String> {
        if !(0.5..=4.0).contains(&self.scale) {
            return Err(format!(
                "render.scale must be between 0.5 and 4.0, got {}",
                self.scale
            ));
        }

        self.background_rgb()?;

        if self.asset_timeout_ms == 0 || self.asset_timeout_ms > 60_000 {
            return Err(format!(
                "render.asset_timeout_ms must be between 1 and 60000, got {}",
                self.asset_timeout_ms
            ));
        }

        if let Some(path) = &self.font_path {
            if !std::path::Path::new(path).exists() {
                return Err(format!("render.font_path not found: {path}"));
            }
        }

        Ok(())
    }

    /// Background colour as RGB bytes
    pub fn background_rgb(&self) -> Result<[u8; 3], String> {
        parse_hex_color(&self.background)
            .ok_or_else(|| format!("render.background must be #RRGGBB, got '{}'", self.background))
    }
}

fn parse_hex_color(value: &str) -> Option<[u8; 3]> {
    let hex = value.trim().strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Photo lookup configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoConfig {
    /// Lookup strategies in priority order
    #[serde(default = "default_photo_sources")]
    pub sources: Vec<PhotoSource>,

    /// Bulk-prefetch guardian names and photo references before rendering
    #[serde(default = "default_true")]
    pub prefetch: bool,
}

impl Default for PhotoConfig {
    fn default() -> Self {
        Self {
            sources: default_photo_sources(),
            prefetch: true,
        }
    }
}

impl PhotoConfig {
    fn validate(&self) -> Result<(), String> {
        if self.sources.is_empty() {
            return Err("photo.sources must list at least one source".to_string());
        }
        for (i, source) in self.sources.iter().enumerate() {
            if self.sources[..i].contains(source) {
                return Err(format!("photo.sources lists '{source}' more than once"));
            }
        }
        Ok(())
    }
}

/// Output document configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Directory the PDF files are written to
    #[serde(default = "default_output_directory")]
    pub directory: String,

    /// Tickets per page (1, 2, 4 or 6)
    #[serde(default)]
    pub grid_arity: GridArity,

    /// Horizontal alignment of the grid
    #[serde(default)]
    pub alignment: GridAlignment,

    /// What to do with empty cells on the last page
    #[serde(default)]
    pub last_page: LastPagePolicy,

    /// Page margin in points
    #[serde(default = "default_margin_pt")]
    pub margin_pt: f32,

    /// Gap between grid cells in points
    #[serde(default = "default_gap_pt")]
    pub gap_pt: f32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            grid_arity: GridArity::default(),
            alignment: GridAlignment::default(),
            last_page: LastPagePolicy::default(),
            margin_pt: default_margin_pt(),
            gap_pt: default_gap_pt(),
        }
    }
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.directory.trim().is_empty() {
            return Err("output.directory cannot be empty".to_string());
        }
        if !(0.0..=144.0).contains(&self.margin_pt) {
            return Err(format!(
                "output.margin_pt must be between 0 and 144, got {}",
                self.margin_pt
            ));
        }
        if !(0.0..=72.0).contains(&self.gap_pt) {
            return Err(format!(
                "output.gap_pt must be between 0 and 72, got {}",
                self.gap_pt
            ));
        }
        Ok(())
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Enable local file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local_enabled".to_string());
        }
        Ok(())
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_application_name() -> String {
    "hallticket-global".to_string()
}

fn default_guardian_relation() -> String {
    "Father".to_string()
}

fn default_true() -> bool {
    true
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_max_retries() -> usize {
    3
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    8000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_scale() -> f32 {
    2.0
}

fn default_background() -> String {
    "#FFFFFF".to_string()
}

fn default_asset_timeout_ms() -> u64 {
    5000
}

fn default_photo_sources() -> Vec<PhotoSource> {
    vec![PhotoSource::LinkedProfile, PhotoSource::StudentRecord]
}

fn default_output_directory() -> String {
    "output".to_string()
}

fn default_margin_pt() -> f32 {
    20.0
}

fn default_gap_pt() -> f32 {
    12.0
}

fn default_local_path() -> String {
    "logs".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}
