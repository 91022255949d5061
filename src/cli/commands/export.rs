//! Export command implementation
//!
//! This module implements the `export` command for rendering every student
//! of a class into one multi-ticket PDF.

use super::{exit_code_for, load_or_report, EXIT_CONFIG, EXIT_DEGRADED, EXIT_OK};
use crate::config::HallTicketConfig;
use crate::core::export::{ConsoleProgress, ExportPipeline, ProgressReporter, SilentProgress};
use crate::core::layout::{GridAlignment, GridArity, LastPagePolicy};
use crate::domain::ClassId;
use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Class to export
    #[arg(long)]
    pub class_id: Option<String>,

    /// Override the exam name printed on every ticket
    #[arg(long)]
    pub exam: Option<String>,

    /// Override tickets per page (1, 2, 4 or 6)
    #[arg(long, value_name = "N")]
    pub per_page: Option<u8>,

    /// Anchor the grid to the top-left of each cell
    #[arg(long)]
    pub left_align: bool,

    /// Fill the last page by repeating the final ticket
    #[arg(long)]
    pub repeat_last: bool,

    /// Override the output directory
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Skip bulk prefetch of guardian names and photo references
    #[arg(long)]
    pub no_prefetch: bool,

    /// Do not draw the progress line
    #[arg(long)]
    pub quiet: bool,
}

impl ExportArgs {
    /// Applies command-line overrides to the loaded configuration
    pub fn apply_overrides(&self, config: &mut HallTicketConfig) -> Result<(), String> {
        if let Some(exam) = &self.exam {
            tracing::info!(exam = %exam, "Overriding exam name from CLI");
            config.exam.name = exam.clone();
        }

        if let Some(per_page) = self.per_page {
            tracing::info!(per_page, "Overriding grid arity from CLI");
            config.output.grid_arity = GridArity::new(per_page)?;
        }

        if self.left_align {
            config.output.alignment = GridAlignment::Left;
        }

        if self.repeat_last {
            config.output.last_page = LastPagePolicy::RepeatLast;
        }

        if let Some(dir) = &self.output_dir {
            tracing::info!(output_dir = %dir, "Overriding output directory from CLI");
            config.output.directory = dir.clone();
        }

        if self.no_prefetch {
            config.photo.prefetch = false;
        }

        config.validate()
    }

    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let Some(mut config) = load_or_report(config_path) else {
            return Ok(EXIT_CONFIG);
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(EXIT_CONFIG);
        }

        let class_id = match self.class_id.as_deref().map(ClassId::new).transpose() {
            Ok(id) => id,
            Err(e) => {
                eprintln!("Invalid class id: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut pipeline = match ExportPipeline::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create export pipeline");
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("🚀 Starting export...");
        println!("  Exam: {}", config.exam.display_name());
        println!("  Tickets per page: {}", config.output.grid_arity);
        println!();

        let mut console = ConsoleProgress::new();
        let mut silent = SilentProgress;
        let progress: &mut dyn ProgressReporter = if self.quiet {
            &mut silent
        } else {
            &mut console
        };

        let summary = match pipeline.export_class(class_id.as_ref(), progress).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        summary.log_summary();

        println!("📊 Export Summary:");
        println!("  Class: {}", summary.class_label);
        println!("  Students: {}", summary.total_students);
        println!("  Tickets: {}", summary.rendered_tickets);
        println!("  Pages: {}", summary.pages);
        println!("  Degraded: {}", summary.degraded.len());
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
        if let Some(path) = &summary.output_path {
            println!("  Output: {}", path.display());
        }
        if let Some(sum) = &summary.checksum {
            println!("  SHA-256: {sum}");
        }
        println!();

        if !summary.degraded.is_empty() {
            println!("⚠️  Tickets with placeholders:");
            for (i, ticket) in summary.degraded.iter().enumerate() {
                if i < 10 {
                    println!("  - {} ({}): {}", ticket.student_name, ticket.student_id, ticket.reason);
                }
            }
            if summary.degraded.len() > 10 {
                println!("  ... and {} more", summary.degraded.len() - 10);
            }
            println!();
        }

        let exit_code = if summary.is_successful() {
            println!("✅ Export completed successfully!");
            EXIT_OK
        } else {
            println!("⚠️  Export completed with placeholders");
            EXIT_DEGRADED
        };

        Ok(exit_code)
    }
}
