//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the hallticket configuration file.

use super::{EXIT_CONFIG, EXIT_OK};
use crate::config::loader::load_config_unvalidated;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config_unvalidated(config_path) {
            Ok(c) => {
                println!("✅ Configuration file loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration file");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        match config.validate() {
            Ok(()) => {
                let key_state = match &config.backend.anon_key {
                    Some(key) if !key.expose_secret().is_blank() => "set",
                    _ => "missing",
                };
                let sources: Vec<&str> = config.photo.sources.iter().map(|s| s.as_str()).collect();

                println!("✅ Configuration is valid");
                println!();
                println!("Configuration Summary:");
                println!("  Log Level: {}", config.application.log_level);
                println!("  Backend: {}", config.backend.base_url);
                println!("  Anon Key: {key_state}");
                println!("  Tenant: {}", config.backend.tenant_id);
                println!("  Exam: {}", config.exam.display_name());
                println!("  Subjects: {}", config.exam.subjects.len());
                println!("  Render Scale: {}", config.render.scale);
                println!("  Asset Timeout: {} ms", config.render.asset_timeout_ms);
                println!("  Photo Sources: {}", sources.join(", "));
                println!("  Tickets per Page: {}", config.output.grid_arity);
                println!("  Output Directory: {}", config.output.directory);
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(EXIT_CONFIG)
            }
        }
    }
}
