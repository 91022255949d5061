//! Student photo lookup
//!
//! A photo reference can live in two places: the profile picture of the user
//! account linked to the student, or the photo column of the student record.
//! [`PhotoSource`] names each place; lookups try the configured sources in
//! rank order and stop at the first non-empty reference.

use crate::adapters::assets::AssetLoader;
use crate::adapters::backend::SchoolBackend;
use crate::core::render::assets::{load_before, AssetOutcome};
use crate::domain::{Result, Roster, StudentId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

/// Where a photo reference is looked up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhotoSource {
    /// `users.profile_url` of the account linked to the student
    LinkedProfile,
    /// `students.photo_url`
    StudentRecord,
}

impl PhotoSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PhotoSource::LinkedProfile => "linked_profile",
            PhotoSource::StudentRecord => "student_record",
        }
    }

    /// Looks up one student's reference in this source
    pub async fn lookup(
        self,
        backend: &dyn SchoolBackend,
        student_id: &StudentId,
    ) -> Result<Option<String>> {
        match self {
            PhotoSource::LinkedProfile => backend.fetch_profile_photo(student_id).await,
            PhotoSource::StudentRecord => backend.fetch_record_photo(student_id).await,
        }
    }

    /// Looks up many students' references in this source
    pub async fn lookup_many(
        self,
        backend: &dyn SchoolBackend,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        match self {
            PhotoSource::LinkedProfile => backend.fetch_profile_photos(student_ids).await,
            PhotoSource::StudentRecord => backend.fetch_record_photos(student_ids).await,
        }
    }
}

impl fmt::Display for PhotoSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a ranked photo lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoLookup {
    /// A reference was found
    Found(String),
    /// Every source answered and none had a reference
    NotFound,
    /// No reference was found and at least one source errored
    LookupFailed,
}

impl PhotoLookup {
    pub fn reference(&self) -> Option<&str> {
        match self {
            PhotoLookup::Found(url) => Some(url),
            _ => None,
        }
    }
}

/// Tries each source in order and returns the first reference found
///
/// A source that errors is logged and skipped.
pub async fn resolve_photo(
    backend: &dyn SchoolBackend,
    sources: &[PhotoSource],
    student_id: &StudentId,
) -> PhotoLookup {
    let mut errored = false;

    for source in sources {
        match source.lookup(backend, student_id).await {
            Ok(Some(url)) if !url.trim().is_empty() => {
                tracing::debug!(student_id = %student_id, source = %source, "Photo reference found");
                return PhotoLookup::Found(url.trim().to_string());
            }
            Ok(_) => {}
            Err(e) => {
                errored = true;
                tracing::warn!(
                    student_id = %student_id,
                    source = %source,
                    error = %e,
                    "Photo lookup failed, trying next source"
                );
            }
        }
    }

    if errored {
        PhotoLookup::LookupFailed
    } else {
        PhotoLookup::NotFound
    }
}

/// One student whose photo is missing or unusable
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoIssue {
    pub student_id: StudentId,
    pub student_name: String,
    pub problem: String,
}

/// Photo accessibility report for a roster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PhotoProbeReport {
    pub total_students: usize,
    pub with_reference: usize,
    pub accessible: usize,
    pub issues: Vec<PhotoIssue>,
}

impl PhotoProbeReport {
    /// Share of students with a loadable photo, in percent
    pub fn accessibility_rate(&self) -> f64 {
        if self.total_students == 0 {
            return 0.0;
        }
        self.accessible as f64 / self.total_students as f64 * 100.0
    }

    pub fn log_summary(&self) {
        tracing::info!(
            total_students = self.total_students,
            with_reference = self.with_reference,
            accessible = self.accessible,
            accessibility_rate = format!("{:.1}%", self.accessibility_rate()),
            "Photo probe completed"
        );
    }
}

/// Resolves and loads every student's photo, reporting what is unusable
///
/// Each load gets its own `timeout`; students are probed one at a time.
pub async fn probe_photos(
    backend: &dyn SchoolBackend,
    loader: &dyn AssetLoader,
    sources: &[PhotoSource],
    roster: &Roster,
    timeout: Duration,
) -> PhotoProbeReport {
    let mut report = PhotoProbeReport {
        total_students: roster.len(),
        ..Default::default()
    };

    for student in roster.students() {
        let issue = |problem: String| PhotoIssue {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            problem,
        };

        let reference = match resolve_photo(backend, sources, &student.id).await {
            PhotoLookup::Found(url) => url,
            PhotoLookup::NotFound => {
                report.issues.push(issue("no photo reference".to_string()));
                continue;
            }
            PhotoLookup::LookupFailed => {
                report.issues.push(issue("photo lookup failed".to_string()));
                continue;
            }
        };
        report.with_reference += 1;

        let deadline = tokio::time::Instant::now() + timeout;
        match load_before(loader, Some(&reference), deadline).await {
            AssetOutcome::Loaded(_) => report.accessible += 1,
            AssetOutcome::Failed(message) => report.issues.push(issue(message)),
            AssetOutcome::TimedOut => report.issues.push(issue(format!(
                "photo did not load within {} ms",
                timeout.as_millis()
            ))),
            AssetOutcome::Missing => report.issues.push(issue("empty reference".to_string())),
        }
    }

    report
}
