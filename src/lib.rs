// hallticket - Exam Hall Ticket Export Tool
// Copyright (c) 2025 Hallticket Contributors
// Licensed under the MIT License

//! # hallticket - Exam Hall Ticket Export Tool
//!
//! hallticket renders exam hall tickets for every student of a class and
//! writes them into one printable PDF. Student, guardian, photo and school
//! data is read from a PostgREST (Supabase) school database.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** class rosters and ticket metadata over PostgREST
//! - **Rendering** each ticket into a raster image with bounded asset loading
//! - **Laying out** tickets on A4 pages, 1, 2, 4 or 6 per page
//! - **Writing** the finished document in one step
//!
//! ## Architecture
//!
//! hallticket follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (export pipeline, cache, layout, rendering)
//! - [`adapters`] - External integrations (PostgREST backend, image loading)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hallticket::config::load_config;
//! use hallticket::core::export::{ConsoleProgress, ExportPipeline};
//! use hallticket::domain::ClassId;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("hallticket.toml")?;
//!     let mut pipeline = ExportPipeline::from_config(&config)?;
//!
//!     let class_id = ClassId::new("c-10a")?;
//!     let summary = pipeline
//!         .export_class(Some(&class_id), &mut ConsoleProgress::new())
//!         .await?;
//!
//!     println!("Wrote {} tickets on {} pages", summary.rendered_tickets, summary.pages);
//!     Ok(())
//! }
//! ```
//!
//! ## Degraded tickets
//!
//! A student whose photo or guardian cannot be resolved still gets a ticket.
//! The photo box carries a marker instead, and the summary lists the student:
//!
//! ```rust
//! use hallticket::domain::PhotoStatus;
//!
//! assert_eq!(PhotoStatus::Failed.marker(), Some("Photo failed to load"));
//! assert_eq!(PhotoStatus::NotAvailable.marker(), Some("Photo not available"));
//! ```
//!
//! ## Error Handling
//!
//! hallticket uses [`domain::HallTicketError`] for all errors. Preconditions
//! that stop an export before any page exists surface as
//! [`domain::ExportAbort`]:
//!
//! ```rust
//! use hallticket::domain::{ExportAbort, HallTicketError};
//!
//! let err: HallTicketError = ExportAbort::NoClassSelected.into();
//! assert!(matches!(err, HallTicketError::Aborted(_)));
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
