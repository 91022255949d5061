//! Export orchestration
//!
//! This module provides the export logic for hallticket, including:
//! - The per-class and per-student export pipeline
//! - Output file naming
//! - Progress reporting
//! - Summary and reporting

pub mod naming;
pub mod pipeline;
pub mod progress;
pub mod summary;

pub use naming::{bulk_filename, sanitize_file_stem, single_ticket_filename};
pub use pipeline::{load_class_roster, ExportOptions, ExportPipeline};
pub use progress::{ConsoleProgress, ProgressReporter, SilentProgress};
pub use summary::{DegradedTicket, ExportState, ExportSummary};
