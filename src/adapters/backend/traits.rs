//! School backend trait definition
//!
//! The export pipeline only reads from the hosted school database. Every
//! read it needs is expressed here so the pipeline can run against the
//! PostgREST client or a test stub.

use crate::domain::{ClassId, ClassSection, Result, SchoolDetails, Student, StudentId};
use async_trait::async_trait;
use std::collections::HashMap;

/// Read-only access to one tenant's school data
///
/// All methods are idempotent reads. Lookups that can legitimately find
/// nothing return `Ok(None)` or an empty collection; `Err` means the read
/// itself failed.
#[async_trait]
pub trait SchoolBackend: Send + Sync {
    /// Lists every class and section, ordered by class name then section
    async fn list_classes(&self) -> Result<Vec<ClassSection>>;

    /// Fetches one class by id
    async fn fetch_class(&self, class_id: &ClassId) -> Result<Option<ClassSection>>;

    /// Fetches the roster of a class, ordered by roll number then name
    async fn fetch_roster(&self, class_id: &ClassId) -> Result<Vec<Student>>;

    /// Lists subject names registered for a class
    async fn list_subjects(&self, class_id: &ClassId) -> Result<Vec<String>>;

    /// Fetches the school header (first row of `school_details`)
    async fn fetch_school_details(&self) -> Result<Option<SchoolDetails>>;

    /// Fetches the guardian name of one student
    async fn fetch_guardian_name(&self, student_id: &StudentId) -> Result<Option<String>>;

    /// Fetches guardian names for many students in one read
    ///
    /// Students without a guardian row are absent from the map.
    async fn fetch_guardian_names(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>>;

    /// Profile picture of the user account linked to a student
    async fn fetch_profile_photo(&self, student_id: &StudentId) -> Result<Option<String>>;

    /// Bulk variant of [`SchoolBackend::fetch_profile_photo`]
    async fn fetch_profile_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>>;

    /// Photo stored on the student record itself
    async fn fetch_record_photo(&self, student_id: &StudentId) -> Result<Option<String>>;

    /// Bulk variant of [`SchoolBackend::fetch_record_photo`]
    async fn fetch_record_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>>;
}
