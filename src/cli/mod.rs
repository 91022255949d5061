//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for hallticket using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// hallticket - Exam Hall Ticket Export Tool
#[derive(Parser, Debug)]
#[command(name = "hallticket")]
#[command(version, about, long_about = None)]
#[command(author = "Hallticket Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hallticket.toml", env = "HALLTICKET_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HALLTICKET_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export every student of a class into one PDF
    Export(commands::export::ExportArgs),

    /// Export one student's hall ticket
    Ticket(commands::ticket::TicketArgs),

    /// List classes
    Classes(commands::classes::ClassesArgs),

    /// List the students and subjects of a class
    Students(commands::students::StudentsArgs),

    /// Check that every student's photo resolves and loads
    Photos(commands::photos::PhotosArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["hallticket", "export", "--class-id", "c-10a"]);
        assert_eq!(cli.config, "hallticket.toml");
        match cli.command {
            Commands::Export(args) => assert_eq!(args.class_id.as_deref(), Some("c-10a")),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_cli_parse_export_without_class() {
        let cli = Cli::parse_from(["hallticket", "export"]);
        assert!(matches!(cli.command, Commands::Export(ref a) if a.class_id.is_none()));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["hallticket", "--config", "custom.toml", "classes"]);
        assert_eq!(cli.config, "custom.toml");
        assert!(matches!(cli.command, Commands::Classes(_)));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["hallticket", "--log-level", "debug", "validate-config"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_ticket() {
        let cli = Cli::parse_from([
            "hallticket",
            "ticket",
            "--class-id",
            "c-10a",
            "--student-id",
            "s-7",
        ]);
        assert!(matches!(cli.command, Commands::Ticket(_)));
    }

    #[test]
    fn test_cli_parse_students_and_photos() {
        let cli = Cli::parse_from(["hallticket", "students", "--class-id", "c-1"]);
        assert!(matches!(cli.command, Commands::Students(_)));
        let cli = Cli::parse_from(["hallticket", "photos", "--class-id", "c-1"]);
        assert!(matches!(cli.command, Commands::Photos(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["hallticket", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }
}
