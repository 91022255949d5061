//! Core business logic for hallticket.
//!
//! # Modules
//!
//! - [`export`] - Export pipeline, file naming, progress and summary
//! - [`cache`] - Run-scoped memo of backend lookups
//! - [`photo`] - Ranked photo lookup and the photo probe
//! - [`render`] - Bounded asset loading and ticket rasterization
//! - [`layout`] - Page grid and pagination
//! - [`document`] - PDF assembly
//!
//! # Export Workflow
//!
//! 1. **Load Roster**: Resolve the class and its students, abort if empty
//! 2. **Prefetch**: Bulk-load guardian names and photo references
//! 3. **Populate**: Fill ticket text for each student in roster order
//! 4. **Capture**: Load logo, photo and watermark under a deadline, rasterize
//! 5. **Assemble**: Place images on the grid and build the PDF
//! 6. **Save**: Write the document and report a summary
//!
//! # Example
//!
//! ```rust,no_run
//! use hallticket::config::load_config;
//! use hallticket::core::export::{ExportPipeline, SilentProgress};
//! use hallticket::domain::ClassId;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("hallticket.toml")?;
//! let mut pipeline = ExportPipeline::from_config(&config)?;
//!
//! let class_id = ClassId::new("c-10a")?;
//! let summary = pipeline
//!     .export_class(Some(&class_id), &mut SilentProgress)
//!     .await?;
//!
//! println!("Pages: {}", summary.pages);
//! println!("Degraded: {}", summary.degraded.len());
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod document;
pub mod export;
pub mod layout;
pub mod photo;
pub mod render;
