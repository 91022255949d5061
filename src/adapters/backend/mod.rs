//! Hosted school database adapter
//!
//! [`SchoolBackend`] abstracts the reads the export needs; [`PostgrestBackend`]
//! implements it against a Supabase/PostgREST project.

pub mod models;
pub mod postgrest;
pub mod traits;

pub use postgrest::PostgrestBackend;
pub use traits::SchoolBackend;
