//! Per-export metadata cache
//!
//! A [`SessionCache`] lives for exactly one export run. It is created by the
//! pipeline, passed down by `&mut`, and dropped with the run. Entries are
//! written once and never invalidated; a failed lookup is stored as absent
//! so it is not retried within the same run.

use crate::adapters::backend::SchoolBackend;
use crate::core::photo::{resolve_photo, PhotoLookup, PhotoSource};
use crate::core::render::AssetOutcome;
use crate::domain::{SchoolDetails, StudentId};
use std::collections::HashMap;

/// Run-scoped memo of backend lookups and shared images
#[derive(Debug, Default)]
pub struct SessionCache {
    school: Option<Option<SchoolDetails>>,
    guardians: HashMap<StudentId, Option<String>>,
    photos: HashMap<StudentId, PhotoLookup>,
    shared_assets: HashMap<String, AssetOutcome>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// School header, fetched on first use
    pub async fn school_details(&mut self, backend: &dyn SchoolBackend) -> Option<&SchoolDetails> {
        if self.school.is_none() {
            let details = match backend.fetch_school_details().await {
                Ok(details) => {
                    if details.is_none() {
                        tracing::warn!("No school details configured, using generic header");
                    }
                    details
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load school details, using generic header");
                    None
                }
            };
            self.school = Some(details);
        }
        self.school.as_ref().and_then(Option::as_ref)
    }

    /// Guardian name of a student, fetched on first use
    pub async fn guardian_name(
        &mut self,
        backend: &dyn SchoolBackend,
        student_id: &StudentId,
    ) -> Option<String> {
        if let Some(cached) = self.guardians.get(student_id) {
            return cached.clone();
        }

        let name = match backend.fetch_guardian_name(student_id).await {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(student_id = %student_id, error = %e, "Guardian lookup failed");
                None
            }
        };
        self.guardians.insert(student_id.clone(), name.clone());
        name
    }

    /// Photo reference of a student, resolved on first use
    pub async fn photo(
        &mut self,
        backend: &dyn SchoolBackend,
        sources: &[PhotoSource],
        student_id: &StudentId,
    ) -> PhotoLookup {
        if let Some(cached) = self.photos.get(student_id) {
            return cached.clone();
        }

        let lookup = resolve_photo(backend, sources, student_id).await;
        self.photos.insert(student_id.clone(), lookup.clone());
        lookup
    }

    /// Bulk-loads guardian names and photo references for `student_ids`
    ///
    /// Only present values are recorded; students left unresolved are looked
    /// up individually later. Photo sources run in rank order and a lower
    /// source never overrides a higher one. If a source's bulk read fails,
    /// lower sources are not prefetched so rank order is preserved.
    pub async fn prefetch(
        &mut self,
        backend: &dyn SchoolBackend,
        sources: &[PhotoSource],
        student_ids: &[StudentId],
    ) {
        if student_ids.is_empty() {
            return;
        }

        match backend.fetch_guardian_names(student_ids).await {
            Ok(names) => {
                tracing::debug!(found = names.len(), "Prefetched guardian names");
                for (student_id, name) in names {
                    self.guardians.entry(student_id).or_insert(Some(name));
                }
            }
            Err(e) => tracing::warn!(error = %e, "Guardian prefetch failed"),
        }

        for source in sources {
            match source.lookup_many(backend, student_ids).await {
                Ok(references) => {
                    tracing::debug!(source = %source, found = references.len(), "Prefetched photo references");
                    for (student_id, url) in references {
                        self.photos
                            .entry(student_id)
                            .or_insert(PhotoLookup::Found(url));
                    }
                }
                Err(e) => {
                    tracing::warn!(source = %source, error = %e, "Photo prefetch failed");
                    break;
                }
            }
        }
    }

    /// Memoized outcome for a logo or watermark reference
    pub fn shared_asset(&self, reference: &str) -> Option<AssetOutcome> {
        self.shared_assets.get(reference).cloned()
    }

    /// Records a logo or watermark outcome for the rest of the run
    ///
    /// Timeouts are not recorded; the next ticket gets a fresh attempt.
    pub fn remember_shared_asset(&mut self, reference: &str, outcome: &AssetOutcome) {
        if matches!(outcome, AssetOutcome::Missing | AssetOutcome::TimedOut) {
            return;
        }
        self.shared_assets
            .entry(reference.to_string())
            .or_insert_with(|| outcome.clone());
    }

    /// Number of students with a cached guardian entry
    pub fn guardian_entries(&self) -> usize {
        self.guardians.len()
    }

    /// Number of students with a cached photo entry
    pub fn photo_entries(&self) -> usize {
        self.photos.len()
    }
}
