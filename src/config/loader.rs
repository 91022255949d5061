//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::HallTicketConfig;
use super::secret::secret_string;
use crate::domain::errors::HallTicketError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into HallTicketConfig
/// 4. Applies environment variable overrides (HALLTICKET_* prefix and the
///    conventional Supabase project variables)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use hallticket::config::loader::load_config;
///
/// let config = load_config("hallticket.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<HallTicketConfig> {
    let config = load_config_unvalidated(path)?;

    config.validate().map_err(|e| {
        HallTicketError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Loads and overrides the configuration without validating it
///
/// Used by `validate-config` so it can report the validation error itself.
pub fn load_config_unvalidated(path: impl AsRef<Path>) -> Result<HallTicketConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(HallTicketError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        HallTicketError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    parse_config(&contents)
}

/// Parses configuration text, applying substitution and overrides
pub fn parse_config(contents: &str) -> Result<HallTicketConfig> {
    let contents = substitute_env_vars(contents)?;

    let mut config: HallTicketConfig = toml::from_str(&contents)
        .map_err(|e| HallTicketError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    Ok(config)
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap_or_else(|_| unreachable!())
    })
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are passed through untouched.
///
/// # Errors
///
/// Returns an error listing every referenced variable that is not set
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = placeholder_pattern();
    let mut result = String::new();
    let mut missing_vars = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.contains(&var_name.to_string()) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(HallTicketError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// First non-empty value among the given variables
fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Applies environment variable overrides
///
/// Variables follow the pattern `HALLTICKET_<SECTION>_<KEY>`. The backend
/// URL and key also honour the variable names used by Supabase projects.
fn apply_env_overrides(config: &mut HallTicketConfig) {
    // Application overrides
    if let Ok(val) = std::env::var("HALLTICKET_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Backend overrides
    if let Some(val) = first_env(&[
        "HALLTICKET_BACKEND_BASE_URL",
        "SUPABASE_URL",
        "RSUPABASE_URL",
        "SUPABASE_PROJECT_URL",
    ]) {
        config.backend.base_url = val.trim().to_string();
    }
    if let Some(val) = first_env(&[
        "HALLTICKET_BACKEND_ANON_KEY",
        "SUPABASE_ANON_KEY",
        "ANON_KEY",
    ]) {
        config.backend.anon_key = Some(secret_string(val));
    }
    if let Ok(val) = std::env::var("HALLTICKET_BACKEND_TENANT_ID") {
        config.backend.tenant_id = val;
    }
    if let Ok(val) = std::env::var("HALLTICKET_BACKEND_APPLICATION_NAME") {
        config.backend.application_name = val;
    }
    if let Ok(val) = std::env::var("HALLTICKET_BACKEND_TIMEOUT_SECONDS") {
        if let Ok(seconds) = val.parse() {
            config.backend.timeout_seconds = seconds;
        }
    }
    if let Ok(val) = std::env::var("HALLTICKET_BACKEND_TLS_VERIFY") {
        config.backend.tls_verify = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("HALLTICKET_BACKEND_MAX_RETRIES") {
        if let Ok(retries) = val.parse() {
            config.backend.retry.max_retries = retries;
        }
    }

    // Exam overrides
    if let Ok(val) = std::env::var("HALLTICKET_EXAM_NAME") {
        config.exam.name = val;
    }

    // Render overrides
    if let Ok(val) = std::env::var("HALLTICKET_RENDER_SCALE") {
        if let Ok(scale) = val.parse() {
            config.render.scale = scale;
        }
    }
    if let Ok(val) = std::env::var("HALLTICKET_RENDER_ASSET_TIMEOUT_MS") {
        if let Ok(ms) = val.parse() {
            config.render.asset_timeout_ms = ms;
        }
    }
    if let Ok(val) = std::env::var("HALLTICKET_RENDER_ALLOW_REMOTE_IMAGES") {
        config.render.allow_remote_images = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("HALLTICKET_RENDER_FONT_PATH") {
        config.render.font_path = Some(val);
    }

    // Photo overrides
    if let Ok(val) = std::env::var("HALLTICKET_PHOTO_PREFETCH") {
        config.photo.prefetch = val.parse().unwrap_or(true);
    }

    // Output overrides
    if let Ok(val) = std::env::var("HALLTICKET_OUTPUT_DIRECTORY") {
        config.output.directory = val;
    }
    if let Ok(val) = std::env::var("HALLTICKET_OUTPUT_GRID_ARITY") {
        if let Ok(arity) = val.parse() {
            config.output.grid_arity = arity;
        }
    }

    // Logging overrides
    if let Ok(val) = std::env::var("HALLTICKET_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("HALLTICKET_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
