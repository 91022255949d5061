//! Photos command implementation
//!
//! Resolves every roster student's photo reference and tries to load it
//! within the asset timeout, reporting anything unusable before an export.

use super::{exit_code_for, load_or_report, EXIT_CONFIG, EXIT_DEGRADED, EXIT_OK};
use crate::adapters::assets::HttpAssetLoader;
use crate::adapters::backend::PostgrestBackend;
use crate::core::export::load_class_roster;
use crate::core::photo::probe_photos;
use crate::domain::ClassId;
use clap::Args;
use std::time::Duration;

/// Arguments for the photos command
#[derive(Args, Debug)]
pub struct PhotosArgs {
    /// Class to probe
    #[arg(long)]
    pub class_id: String,

    /// Maximum number of issues to print
    #[arg(long, default_value_t = 20)]
    pub limit: usize,
}

impl PhotosArgs {
    /// Execute the photos command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_or_report(config_path) else {
            return Ok(EXIT_CONFIG);
        };
        let class_id = match ClassId::new(self.class_id.as_str()) {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid class id: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let clients = PostgrestBackend::new(&config.backend)
            .and_then(|b| HttpAssetLoader::new(&config.render).map(|l| (b, l)));
        let (backend, loader) = match clients {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to initialize clients: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let roster = match load_class_roster(&backend, Some(&class_id)).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!(
            "🔍 Probing photos for {} ({} students)",
            roster.class().label(),
            roster.len()
        );
        println!();

        let report = probe_photos(
            &backend,
            &loader,
            &config.photo.sources,
            &roster,
            Duration::from_millis(config.render.asset_timeout_ms),
        )
        .await;
        report.log_summary();

        println!("📊 Photo Report:");
        println!("  Students: {}", report.total_students);
        println!("  With photo reference: {}", report.with_reference);
        println!("  Accessible: {}", report.accessible);
        println!("  Accessibility Rate: {:.1}%", report.accessibility_rate());
        println!();

        if report.issues.is_empty() {
            println!("✅ Every photo is accessible");
            return Ok(EXIT_OK);
        }

        println!("⚠️  Issues:");
        for issue in report.issues.iter().take(self.limit) {
            println!("  - {} ({}): {}", issue.student_name, issue.student_id, issue.problem);
        }
        if report.issues.len() > self.limit {
            println!("  ... and {} more", report.issues.len() - self.limit);
        }
        println!();
        Ok(EXIT_DEGRADED)
    }
}
