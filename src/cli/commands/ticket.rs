//! Ticket command implementation
//!
//! Exports a single student's hall ticket on one A4 page.

use super::{exit_code_for, load_or_report, EXIT_CONFIG, EXIT_DEGRADED, EXIT_OK};
use crate::core::export::ExportPipeline;
use crate::domain::{ClassId, StudentId};
use clap::Args;

/// Arguments for the ticket command
#[derive(Args, Debug)]
pub struct TicketArgs {
    /// Class the student belongs to
    #[arg(long)]
    pub class_id: String,

    /// Student to export
    #[arg(long)]
    pub student_id: String,

    /// Override the exam name
    #[arg(long)]
    pub exam: Option<String>,

    /// Override the output directory
    #[arg(short, long)]
    pub output_dir: Option<String>,
}

impl TicketArgs {
    /// Execute the ticket command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(mut config) = load_or_report(config_path) else {
            return Ok(EXIT_CONFIG);
        };
        if let Some(exam) = &self.exam {
            config.exam.name = exam.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output.directory = dir.clone();
        }

        let (class_id, student_id) = match (
            ClassId::new(self.class_id.as_str()),
            StudentId::new(self.student_id.as_str()),
        ) {
            (Ok(c), Ok(s)) => (c, s),
            (Err(e), _) | (_, Err(e)) => {
                eprintln!("Invalid id: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        let mut pipeline = match ExportPipeline::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                eprintln!("Failed to initialize export: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let summary = match pipeline.export_student(Some(&class_id), &student_id).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Ticket export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        summary.log_summary();

        if let Some(path) = &summary.output_path {
            println!("✅ Hall ticket written: {}", path.display());
        }
        match summary.degraded.first() {
            Some(ticket) => {
                println!("⚠️  {}", ticket.reason);
                Ok(EXIT_DEGRADED)
            }
            None => Ok(EXIT_OK),
        }
    }
}
