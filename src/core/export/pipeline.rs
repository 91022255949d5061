//! Export pipeline - turns a class roster into one PDF of hall tickets
//!
//! The pipeline loads the roster, then for each student in roster order
//! populates the ticket text, loads the ticket images under a deadline and
//! rasterizes the ticket. Once every ticket is captured the images are laid
//! out on the grid, assembled into a PDF and written in one step. Nothing is
//! written unless every page was assembled.

use crate::adapters::assets::{AssetLoader, HttpAssetLoader};
use crate::adapters::backend::{PostgrestBackend, SchoolBackend};
use crate::config::HallTicketConfig;
use crate::core::cache::SessionCache;
use crate::core::document::assemble_pdf;
use crate::core::export::naming::{bulk_filename, single_ticket_filename};
use crate::core::export::progress::ProgressReporter;
use crate::core::export::summary::{DegradedTicket, ExportState, ExportSummary};
use crate::core::layout::{GridAlignment, GridArity, GridLayout, LastPagePolicy};
use crate::core::photo::{PhotoLookup, PhotoSource};
use crate::core::render::assets::{load_before, reuse_or_load};
use crate::core::render::{
    AssetOutcome, RasterTicketRenderer, RenderedTicket, TicketAssets, TicketRenderer,
};
use crate::domain::{
    ClassId, ExamSchedule, ExportAbort, HallTicketError, PhotoStatus, Result, Roster, Student,
    StudentId, TicketData,
};
use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Per-run export settings
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub exam: ExamSchedule,
    pub photo_sources: Vec<PhotoSource>,
    pub prefetch: bool,
    pub asset_timeout: Duration,
    pub watermark: Option<String>,
    pub arity: GridArity,
    pub alignment: GridAlignment,
    pub last_page: LastPagePolicy,
    pub margin_pt: f32,
    pub gap_pt: f32,
    pub output_dir: PathBuf,
    /// Date printed as the issue date
    pub issued_on: NaiveDate,
}

impl ExportOptions {
    pub fn from_config(config: &HallTicketConfig) -> Self {
        Self {
            exam: config.exam.clone(),
            photo_sources: config.photo.sources.clone(),
            prefetch: config.photo.prefetch,
            asset_timeout: Duration::from_millis(config.render.asset_timeout_ms),
            watermark: config.render.watermark.clone(),
            arity: config.output.grid_arity,
            alignment: config.output.alignment,
            last_page: config.output.last_page,
            margin_pt: config.output.margin_pt,
            gap_pt: config.output.gap_pt,
            output_dir: PathBuf::from(&config.output.directory),
            issued_on: chrono::Local::now().date_naive(),
        }
    }

    fn grid(&self) -> GridLayout {
        GridLayout::new(self.arity, self.alignment, self.margin_pt, self.gap_pt)
    }
}

/// Ticket text plus the references still to be loaded
struct PreparedTicket {
    data: TicketData,
    logo: Option<String>,
    photo: PhotoLookup,
}

/// A captured ticket and what ended up in its photo box
struct CapturedTicket {
    image: RenderedTicket,
    data: TicketData,
}

/// Hall ticket export pipeline
pub struct ExportPipeline {
    backend: Arc<dyn SchoolBackend>,
    loader: Arc<dyn AssetLoader>,
    renderer: Arc<dyn TicketRenderer>,
    options: ExportOptions,
    state: ExportState,
}

impl ExportPipeline {
    /// Create a pipeline over explicit collaborators
    pub fn new(
        backend: Arc<dyn SchoolBackend>,
        loader: Arc<dyn AssetLoader>,
        renderer: Arc<dyn TicketRenderer>,
        options: ExportOptions,
    ) -> Self {
        Self {
            backend,
            loader,
            renderer,
            options,
            state: ExportState::Idle,
        }
    }

    /// Create a pipeline wired to the configured backend, loader and renderer
    pub fn from_config(config: &HallTicketConfig) -> Result<Self> {
        let backend = Arc::new(PostgrestBackend::new(&config.backend)?);
        let loader = Arc::new(HttpAssetLoader::new(&config.render)?);
        let renderer = Arc::new(RasterTicketRenderer::from_config(&config.render)?);

        Ok(Self::new(
            backend,
            loader,
            renderer,
            ExportOptions::from_config(config),
        ))
    }

    /// Current pipeline state
    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Loads the roster of `class_id`, see [`load_class_roster`]
    pub async fn load_roster(&self, class_id: Option<&ClassId>) -> Result<Roster> {
        load_class_roster(self.backend.as_ref(), class_id).await
    }

    /// Exports every student of `class_id` into one document
    ///
    /// Returns the summary of a saved document. Precondition failures abort
    /// before `progress` or any per-student lookup is touched.
    pub async fn export_class(
        &mut self,
        class_id: Option<&ClassId>,
        progress: &mut dyn ProgressReporter,
    ) -> Result<ExportSummary> {
        let started = std::time::Instant::now();
        self.state = ExportState::Idle;

        let roster = match self.load_roster(class_id).await {
            Ok(roster) => roster,
            Err(e) => {
                self.state = ExportState::Aborted;
                tracing::error!(error = %e, "Export aborted");
                return Err(e);
            }
        };
        self.state = ExportState::RosterLoaded;

        let class_label = roster.class().label();
        crate::log_export_start!(
            roster.class().id,
            roster.len(),
            self.options.arity.get()
        );

        let mut summary = ExportSummary::new(&class_label);
        summary.total_students = roster.len();
        summary.tickets_per_page = self.options.arity.get();

        let mut cache = SessionCache::new();
        if self.options.prefetch {
            cache
                .prefetch(
                    self.backend.as_ref(),
                    &self.options.photo_sources,
                    &roster.student_ids(),
                )
                .await;
        }

        let total = roster.len();
        progress.start(total);

        let mut tickets = Vec::with_capacity(total);
        for (index, student) in roster.students().iter().enumerate() {
            self.state = ExportState::Populating(index);
            let prepared = self.prepare(&mut cache, student, &class_label).await;

            self.state = ExportState::Capturing(index);
            let captured = self.capture(&mut cache, prepared).await;

            if let Some(reason) = captured.data.photo_status.marker() {
                crate::log_ticket_degraded!(student.id, reason);
                summary.add_degraded(DegradedTicket {
                    student_id: student.id.clone(),
                    student_name: student.name.clone(),
                    reason: reason.to_string(),
                });
            }
            tickets.push(captured.image);
            progress.advance(index + 1, total);
        }
        summary.rendered_tickets = tickets.len();

        let path = self.options.output_dir.join(bulk_filename(roster.class()));
        let result = self
            .save(&class_label, &self.options.grid(), &tickets, &path)
            .await;
        progress.finish();

        let (pages, bytes) = match result {
            Ok(written) => written,
            Err(e) => {
                self.state = ExportState::Aborted;
                tracing::error!(error = %e, "Export failed before the document was saved");
                return Err(e);
            }
        };

        summary.pages = pages;
        summary.bytes_written = bytes.len();
        summary.checksum = Some(checksum(&bytes));
        summary.output_path = Some(path);
        summary.final_state = ExportState::Saved;
        self.state = ExportState::Saved;

        let summary = summary.with_duration(started.elapsed());
        crate::log_export_complete!(summary.rendered_tickets, summary.pages, summary.duration);
        Ok(summary)
    }

    /// Exports one student's ticket on a single A4 page
    pub async fn export_student(
        &mut self,
        class_id: Option<&ClassId>,
        student_id: &StudentId,
    ) -> Result<ExportSummary> {
        let started = std::time::Instant::now();
        self.state = ExportState::Idle;

        let roster = match self.load_roster(class_id).await {
            Ok(roster) => roster,
            Err(e) => {
                self.state = ExportState::Aborted;
                return Err(e);
            }
        };
        let Some(student) = roster.find(student_id) else {
            self.state = ExportState::Aborted;
            return Err(HallTicketError::Validation(format!(
                "student {student_id} is not in class {}",
                roster.class().label()
            )));
        };
        self.state = ExportState::RosterLoaded;

        let class_label = roster.class().label();
        let mut summary = ExportSummary::new(&class_label);
        summary.total_students = 1;

        let mut cache = SessionCache::new();
        self.state = ExportState::Populating(0);
        let prepared = self.prepare(&mut cache, student, &class_label).await;
        self.state = ExportState::Capturing(0);
        let captured = self.capture(&mut cache, prepared).await;

        if let Some(reason) = captured.data.photo_status.marker() {
            crate::log_ticket_degraded!(student.id, reason);
            summary.add_degraded(DegradedTicket {
                student_id: student.id.clone(),
                student_name: student.name.clone(),
                reason: reason.to_string(),
            });
        }
        summary.rendered_tickets = 1;

        let path = self
            .options
            .output_dir
            .join(single_ticket_filename(&student.name));
        let tickets = [captured.image];
        let (pages, bytes) = match self
            .save(&student.name, &GridLayout::full_page(), &tickets, &path)
            .await
        {
            Ok(written) => written,
            Err(e) => {
                self.state = ExportState::Aborted;
                return Err(e);
            }
        };

        summary.pages = pages;
        summary.bytes_written = bytes.len();
        summary.checksum = Some(checksum(&bytes));
        summary.output_path = Some(path);
        summary.final_state = ExportState::Saved;
        self.state = ExportState::Saved;

        Ok(summary.with_duration(started.elapsed()))
    }

    /// Populates ticket text and resolves the references to load
    async fn prepare(
        &self,
        cache: &mut SessionCache,
        student: &Student,
        class_label: &str,
    ) -> PreparedTicket {
        let backend = self.backend.as_ref();

        let school = cache.school_details(backend).await.cloned();
        let guardian = cache.guardian_name(backend, &student.id).await;
        let photo = cache
            .photo(backend, &self.options.photo_sources, &student.id)
            .await;

        let data = TicketData::populate(
            student,
            school.as_ref(),
            guardian.as_deref(),
            class_label,
            &self.options.exam,
            self.options.issued_on,
        );

        PreparedTicket {
            data,
            logo: school.and_then(|s| s.logo().map(str::to_string)),
            photo,
        }
    }

    /// Loads the ticket images under one deadline and rasterizes the ticket
    async fn capture(&self, cache: &mut SessionCache, prepared: PreparedTicket) -> CapturedTicket {
        let loader = self.loader.as_ref();
        let deadline = tokio::time::Instant::now() + self.options.asset_timeout;

        let logo_ref = prepared.logo.as_deref();
        let watermark_ref = self.options.watermark.as_deref();
        let cached_logo = logo_ref.and_then(|r| cache.shared_asset(r));
        let cached_watermark = watermark_ref.and_then(|r| cache.shared_asset(r));

        let (logo, photo, watermark) = tokio::join!(
            reuse_or_load(loader, cached_logo, logo_ref, deadline),
            load_before(loader, prepared.photo.reference(), deadline),
            reuse_or_load(loader, cached_watermark, watermark_ref, deadline),
        );

        if let Some(reference) = logo_ref {
            cache.remember_shared_asset(reference, &logo);
        }
        if let Some(reference) = watermark_ref {
            cache.remember_shared_asset(reference, &watermark);
        }

        let status = photo_status(&prepared.photo, &photo);
        let data = prepared.data.with_photo_status(status);
        let assets = TicketAssets {
            logo,
            photo,
            watermark,
        };

        CapturedTicket {
            image: self.renderer.render(&data, &assets),
            data,
        }
    }

    /// Lays out, assembles and writes the document
    ///
    /// Returns the page count and the written bytes.
    async fn save(
        &self,
        title: &str,
        grid: &GridLayout,
        tickets: &[RenderedTicket],
        path: &Path,
    ) -> Result<(usize, Vec<u8>)> {
        let sizes: Vec<(u32, u32)> = tickets.iter().map(RenderedTicket::dimensions).collect();
        let pages = grid.paginate(&sizes, self.options.last_page);
        let bytes = assemble_pdf(title, &pages, tickets)?;
        tracing::debug!(pages = pages.len(), bytes = bytes.len(), "Document assembled");

        write_atomically(path, &bytes).await?;
        tracing::info!(path = %path.display(), "Document saved");
        Ok((pages.len(), bytes))
    }
}

/// Loads the roster of `class_id`
///
/// # Errors
///
/// Returns [`HallTicketError::Aborted`] when no class is given, the class
/// does not exist, the roster read fails or the class has no students.
pub async fn load_class_roster(
    backend: &dyn SchoolBackend,
    class_id: Option<&ClassId>,
) -> Result<Roster> {
    let class_id = class_id.ok_or(ExportAbort::NoClassSelected)?;

    let class = backend
        .fetch_class(class_id)
        .await
        .map_err(ExportAbort::roster_unavailable)?
        .ok_or_else(|| ExportAbort::ClassNotFound(class_id.to_string()))?;

    let students = backend
        .fetch_roster(class_id)
        .await
        .map_err(ExportAbort::roster_unavailable)?;

    if students.is_empty() {
        return Err(ExportAbort::EmptyRoster(class.label()).into());
    }

    tracing::debug!(class_id = %class_id, students = students.len(), "Roster loaded");
    Ok(Roster::new(class, students))
}

/// What the photo box shows given the lookup and the load outcome
pub fn photo_status(lookup: &PhotoLookup, outcome: &AssetOutcome) -> PhotoStatus {
    match (lookup, outcome) {
        (PhotoLookup::Found(_), AssetOutcome::Loaded(_)) => PhotoStatus::Shown,
        (PhotoLookup::NotFound, _) => PhotoStatus::NotAvailable,
        _ => PhotoStatus::Failed,
    }
}

/// Writes to a `.part` sibling then renames it into place
async fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let mut part = path.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    let written = match tokio::fs::write(&part, bytes).await {
        Ok(()) => tokio::fs::rename(&part, path).await,
        Err(e) => Err(e),
    };
    if let Err(e) = written {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(e.into());
    }
    Ok(())
}

/// Hex-encoded SHA-256 of `bytes`
fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::DynamicImage;

    #[test]
    fn test_photo_status_mapping() {
        let loaded = AssetOutcome::Loaded(Arc::new(DynamicImage::new_rgb8(1, 1)));
        let found = PhotoLookup::Found("p.png".into());

        assert_eq!(photo_status(&found, &loaded), PhotoStatus::Shown);
        assert_eq!(
            photo_status(&found, &AssetOutcome::TimedOut),
            PhotoStatus::Failed
        );
        assert_eq!(
            photo_status(&found, &AssetOutcome::Failed("404".into())),
            PhotoStatus::Failed
        );
        assert_eq!(
            photo_status(&PhotoLookup::NotFound, &AssetOutcome::Missing),
            PhotoStatus::NotAvailable
        );
        assert_eq!(
            photo_status(&PhotoLookup::LookupFailed, &AssetOutcome::Missing),
            PhotoStatus::Failed
        );
    }

    #[test]
    fn test_checksum_is_hex_sha256() {
        let sum = checksum(b"hall tickets");
        assert_eq!(sum.len(), 64);
        assert!(sum.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(sum, checksum(b"hall tickets"));
    }

    #[tokio::test]
    async fn test_write_atomically_leaves_no_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.pdf");

        write_atomically(&path, b"%PDF-1.3").await.unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.3");
        assert!(!dir.path().join("nested").join("out.pdf.part").exists());
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_failed_write_removes_part_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.pdf");
        let part = dir.path().join("out.pdf.part");
        // Writes through to /dev/full fail with "no space left on device"
        std::os::unix::fs::symlink("/dev/full", &part).unwrap();

        let err = write_atomically(&path, b"%PDF-1.3").await.unwrap_err();

        assert!(matches!(err, HallTicketError::Io(_)));
        assert!(std::fs::symlink_metadata(&part).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_options_from_default_config() {
        let config = HallTicketConfig::default();
        let options = ExportOptions::from_config(&config);
        assert_eq!(options.arity, GridArity::ONE);
        assert_eq!(options.asset_timeout, Duration::from_millis(5000));
        assert!(options.prefetch);
        assert_eq!(options.output_dir, PathBuf::from("output"));
    }
}
