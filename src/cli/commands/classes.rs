//! Classes command implementation

use super::{exit_code_for, load_or_report, EXIT_CONFIG, EXIT_OK};
use crate::adapters::backend::{PostgrestBackend, SchoolBackend};
use clap::Args;

/// Arguments for the classes command
#[derive(Args, Debug)]
pub struct ClassesArgs {}

impl ClassesArgs {
    /// Execute the classes command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let Some(config) = load_or_report(config_path) else {
            return Ok(EXIT_CONFIG);
        };

        let backend = match PostgrestBackend::new(&config.backend) {
            Ok(b) => b,
            Err(e) => {
                eprintln!("Failed to initialize backend client: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let classes = match backend.list_classes().await {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to list classes");
                println!("   Error: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        if classes.is_empty() {
            println!("No classes found for tenant {}.", backend.tenant());
            return Ok(EXIT_OK);
        }

        println!("Found {} class(es):", classes.len());
        println!();
        println!("{:<40} {:<20}", "Class ID", "Class");
        println!("{}", "-".repeat(60));
        for class in &classes {
            println!("{:<40} {:<20}", class.id, class.label());
        }
        println!();
        Ok(EXIT_OK)
    }
}
