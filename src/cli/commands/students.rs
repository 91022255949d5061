//! Students command implementation
//!
//! Lists the roster of a class in the order tickets are exported, followed
//! by the subjects registered for the class.

use super::{exit_code_for, load_or_report, EXIT_CONFIG, EXIT_OK};
use crate::adapters::backend::{PostgrestBackend, SchoolBackend};
use crate::core::export::load_class_roster;
use crate::domain::ClassId;
use clap::Args;
use std::sync::Arc;

/// Arguments for the students command
#[derive(Args, Debug)]
pub struct StudentsArgs {
    /// Class to list
    #[arg(long)]
    pub class_id: String,
}

impl StudentsArgs {
    /// Execute the students command
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

        let backend: Arc<dyn SchoolBackend> = match PostgrestBackend::new(&config.backend) {
            Ok(b) => Arc::new(b),
            Err(e) => {
                eprintln!("Failed to initialize backend client: {e}");
                return Ok(exit_code_for(&e));
            }
        };
        let roster = match load_class_roster(backend.as_ref(), Some(&class_id)).await {
            Ok(r) => r,
            Err(e) => {
                println!("❌ {e}");
                return Ok(exit_code_for(&e));
            }
        };

        println!("📋 {} ({} students)", roster.class().label(), roster.len());
        println!();
        println!("{:<8} {:<16} {:<32} {:<36}", "Roll", "Admission", "Name", "Student ID");
        println!("{}", "-".repeat(92));
        for student in roster.students() {
            println!(
                "{:<8} {:<16} {:<32} {:<36}",
                student
                    .roll_no
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_else(|| "-".to_string()),
                student.admission_no.as_deref().unwrap_or("-"),
                student.name,
                student.id
            );
        }
        println!();

        match backend.list_subjects(&class_id).await {
            Ok(subjects) if subjects.is_empty() => println!("No subjects registered."),
            Ok(subjects) => println!("Subjects: {}", subjects.join(", ")),
            Err(e) => {
                tracing::warn!(class_id = %class_id, error = %e, "Subject listing failed");
                println!("⚠️  Subjects unavailable: {e}");
            }
        }
        println!();
        Ok(EXIT_OK)
    }
}
