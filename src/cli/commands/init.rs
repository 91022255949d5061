//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use super::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "hallticket.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing hallticket configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your exam name and subjects", self.output);
                println!("  2. Create a .env file with your backend credentials:");
                println!("     - SUPABASE_URL=https://<project>.supabase.co");
                println!("     - SUPABASE_ANON_KEY=<anon key>");
                println!("     - HALLTICKET_BACKEND_TENANT_ID=<school id>");
                println!("  3. Validate configuration: hallticket validate-config");
                println!("  4. Find your class: hallticket classes");
                println!("  5. Export: hallticket export --class-id <id>");
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# hallticket configuration

[application]
log_level = "info"

[backend]
base_url = "${SUPABASE_URL}"
anon_key = "${SUPABASE_ANON_KEY}"
tenant_id = "${HALLTICKET_BACKEND_TENANT_ID}"

[exam]
name = "Half Yearly Examination"

[[exam.subjects]]
name = "Mathematics"
date = "2025-03-10"
start = "09:00:00"
end = "12:00:00"

[output]
directory = "output"
grid_arity = 2

[logging]
local_enabled = false
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r##"# hallticket configuration
#
# Every value below shows its default unless noted otherwise.
# ${VAR} references are replaced from the environment (and .env).

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Backend (PostgREST / Supabase)
# ============================================================================
[backend]
# Project URL, /rest/v1 is appended
base_url = "${SUPABASE_URL}"

# Anon key, sent as apikey and bearer token
anon_key = "${SUPABASE_ANON_KEY}"

# School tenant; every query is filtered by it (required)
tenant_id = "${HALLTICKET_BACKEND_TENANT_ID}"

# Sent as x-application-name
application_name = "hallticket-global"

# Request timeout in seconds
timeout_seconds = 30

# TLS certificate verification
tls_verify = true

# parents.relation value treated as the guardian
guardian_relation = "Father"

[backend.retry]
# Attempts for idempotent reads, including the first
max_retries = 3
initial_delay_ms = 500
max_delay_ms = 8000
backoff_multiplier = 2.0

# ============================================================================
# Exam
# ============================================================================
[exam]
# Printed in the ticket header; blank prints "Examination"
name = "Half Yearly Examination"

# Subjects in printed order; date and times are optional
[[exam.subjects]]
name = "Mathematics"
date = "2025-03-10"
start = "09:00:00"
end = "12:00:00"

[[exam.subjects]]
name = "Science"
date = "2025-03-12"
start = "09:00:00"
end = "12:00:00"

# ============================================================================
# Rendering
# ============================================================================
[render]
# Upscale factor (0.5 - 4.0)
scale = 2.0

# Opaque page background
background = "#FFFFFF"

# Shared deadline for logo, photo and watermark per ticket
asset_timeout_ms = 5000

# Load http(s) images
allow_remote_images = true

# TrueType font; the bundled DejaVu Sans is used when unset
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"

# Faint image drawn behind the ticket body (URL, path or data URL)
# watermark = "https://example.com/crest.png"

# ============================================================================
# Photos
# ============================================================================
[photo]
# Sources tried in order: linked_profile, student_record
sources = ["linked_profile", "student_record"]

# Bulk-load guardian names and photo references before rendering
prefetch = true

# ============================================================================
# Output
# ============================================================================
[output]
directory = "output"

# Tickets per page: 1 or 2 (portrait), 4 or 6 (landscape)
grid_arity = 2

# center | left
alignment = "center"

# leave_blank | repeat_last
last_page = "leave_blank"

# Page margin and gap between cells, in points
margin_pt = 20.0
gap_pt = 12.0

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to the console
local_enabled = false
local_path = "logs"

# daily | hourly | never
local_rotation = "daily"
"##
        .to_string()
    }
}
