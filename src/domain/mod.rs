//! Domain models and types for hallticket.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`TenantId`], [`ClassId`], [`StudentId`])
//! - **Roster models** ([`ClassSection`], [`Student`], [`Roster`])
//! - **Ticket content** ([`SchoolDetails`], [`ExamSchedule`], [`TicketData`])
//! - **Error types** ([`HallTicketError`], [`BackendError`], [`RenderError`], [`ExportAbort`])
//! - **Result type alias** ([`Result`])
//!
//! # Type Safety
//!
//! ```rust
//! use hallticket::domain::{ClassId, StudentId};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let class_id = ClassId::new("c-10a")?;
//! let student_id = StudentId::new("s-001")?;
//!
//! // This won't compile - ids of different tables don't mix
//! // let wrong: StudentId = class_id;
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod exam;
pub mod ids;
pub mod result;
pub mod school;
pub mod student;
pub mod ticket;

// Re-export commonly used types for convenience
pub use errors::{BackendError, ExportAbort, HallTicketError, RenderError};
pub use exam::{ExamSchedule, ExamSubject, SubjectRow, DEFAULT_EXAM_NAME};
pub use ids::{ClassId, StudentId, TenantId};
pub use result::Result;
pub use school::SchoolDetails;
pub use student::{ClassSection, RollNumber, Roster, Student};
pub use ticket::{PhotoStatus, TicketData};
