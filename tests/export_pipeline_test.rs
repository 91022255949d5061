//! Integration tests for the export pipeline
//!
//! The backend, asset loader and renderer are in-memory stubs so the tests
//! exercise ordering, caching, degradation and pagination end to end.

mod common;

use common::{
    class_id, fake_students, options, student_id, RecordingRenderer, StubBackend, StubLoader,
};
use hallticket::core::export::{ExportPipeline, ExportState, ProgressReporter};
use hallticket::core::layout::{GridArity, LastPagePolicy};
use hallticket::core::render::RasterTicketRenderer;
use hallticket::cli::commands::{exit_code_for, EXIT_CONNECTION};
use hallticket::domain::{BackendError, ExportAbort, HallTicketError, PhotoStatus};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Records every progress callback
#[derive(Debug, Default)]
struct RecordingProgress {
    started: Option<usize>,
    advanced: Vec<(usize, usize)>,
    finished: bool,
}

impl ProgressReporter for RecordingProgress {
    fn start(&mut self, total: usize) {
        self.started = Some(total);
    }

    fn advance(&mut self, done: usize, total: usize) {
        self.advanced.push((done, total));
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

fn pipeline(
    backend: &Arc<StubBackend>,
    loader: &Arc<StubLoader>,
    renderer: &Arc<RecordingRenderer>,
    dir: &Path,
    arity: GridArity,
) -> ExportPipeline {
    let mut options = options(dir);
    options.arity = arity;
    ExportPipeline::new(backend.clone(), loader.clone(), renderer.clone(), options)
}

fn pdf_count(dir: &Path) -> usize {
    std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|ext| ext == "pdf"))
                .count()
        })
        .unwrap_or(0)
}

#[tokio::test]
async fn test_five_students_two_per_page() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(fake_students(5)));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::TWO);
    let mut progress = RecordingProgress::default();

    let summary = pipeline
        .export_class(Some(&class_id()), &mut progress)
        .await
        .unwrap();

    assert_eq!(summary.total_students, 5);
    assert_eq!(summary.rendered_tickets, 5);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.tickets_per_page, 2);
    assert!(summary.degraded.is_empty());
    assert!(summary.is_successful());
    assert_eq!(summary.final_state, ExportState::Saved);
    assert_eq!(pipeline.state(), ExportState::Saved);

    let path = summary.output_path.unwrap();
    assert_eq!(path, dir.path().join("10_A_all_hall_tickets.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(bytes.len(), summary.bytes_written);
    assert_eq!(summary.checksum.unwrap().len(), 64);

    assert_eq!(progress.started, Some(5));
    assert_eq!(
        progress.advanced,
        vec![(1, 5), (2, 5), (3, 5), (4, 5), (5, 5)]
    );
    assert!(progress.finished);
}

#[tokio::test]
async fn test_tickets_follow_roster_order() {
    let dir = tempfile::tempdir().unwrap();
    // Backend returns roll numbers 6..1; the roster puts them 1..6
    let students = fake_students(6);
    let mut expected: Vec<_> = students.clone();
    expected.reverse();

    let backend = Arc::new(StubBackend::with_students(students));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::FOUR);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    let rendered: Vec<String> = renderer
        .calls()
        .into_iter()
        .map(|c| c.student_name)
        .collect();
    let roster: Vec<String> = expected.into_iter().map(|s| s.name).collect();
    assert_eq!(rendered, roster);
    assert_eq!(summary.pages, 2);
}

#[tokio::test]
async fn test_empty_roster_aborts_without_metadata_calls() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(Vec::new()));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::TWO);
    let mut progress = RecordingProgress::default();

    let err = pipeline
        .export_class(Some(&class_id()), &mut progress)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HallTicketError::Aborted(ExportAbort::EmptyRoster(_))
    ));
    assert_eq!(pipeline.state(), ExportState::Aborted);
    assert_eq!(backend.calls.metadata_calls(), 0);
    assert_eq!(
        backend
            .calls
            .school
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
    assert!(renderer.calls().is_empty());
    assert!(progress.started.is_none());
    assert!(progress.advanced.is_empty());
    assert_eq!(pdf_count(dir.path()), 0);
}

#[tokio::test]
async fn test_missing_class_selection_aborts() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(fake_students(3)));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::ONE);

    let err = pipeline
        .export_class(None, &mut RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        HallTicketError::Aborted(ExportAbort::NoClassSelected)
    ));
    assert_eq!(backend.calls.metadata_calls(), 0);
    assert_eq!(pdf_count(dir.path()), 0);
}

#[tokio::test]
async fn test_unknown_class_and_roster_failure_abort() {
    let dir = tempfile::tempdir().unwrap();
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());

    let backend = Arc::new(StubBackend::with_students(fake_students(2)));
    let mut p = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::ONE);
    let err = p
        .export_class(
            Some(&hallticket::domain::ClassId::new("other").unwrap()),
            &mut RecordingProgress::default(),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HallTicketError::Aborted(ExportAbort::ClassNotFound(_))
    ));

    let mut failing = StubBackend::with_students(fake_students(2));
    failing.roster_fails = true;
    let backend = Arc::new(failing);
    let mut p = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::ONE);
    let err = p
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        HallTicketError::Aborted(ExportAbort::RosterUnavailable(
            BackendError::ConnectionFailed(_)
        ))
    ));
    assert_eq!(exit_code_for(&err), EXIT_CONNECTION);
    assert_eq!(pdf_count(dir.path()), 0);
}

#[tokio::test]
async fn test_photo_lookup_error_degrades_one_ticket() {
    let dir = tempfile::tempdir().unwrap();
    let mut stub = StubBackend::with_students(fake_students(5));
    stub.photo_errors.insert(student_id("s3"));
    let backend = Arc::new(stub);
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::TWO);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(summary.rendered_tickets, 5);
    assert_eq!(summary.pages, 3);
    assert_eq!(summary.degraded.len(), 1);
    assert_eq!(summary.degraded[0].student_id, student_id("s3"));
    assert_eq!(summary.degraded[0].reason, "Photo failed to load");
    assert!(!summary.is_successful());

    let calls = renderer.calls();
    assert_eq!(calls.len(), 5);
    assert_eq!(calls[2].photo_status, PhotoStatus::Failed);
    assert!(!calls[2].photo_loaded);
    for (i, call) in calls.iter().enumerate().filter(|(i, _)| *i != 2) {
        assert_eq!(call.photo_status, PhotoStatus::Shown, "ticket {i}");
        assert!(call.photo_loaded);
    }
}

#[tokio::test]
async fn test_missing_photo_and_guardian_use_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let mut stub = StubBackend::with_students(fake_students(2));
    stub.record_photos.remove(&student_id("s1"));
    stub.guardians.remove(&student_id("s1"));
    let backend = Arc::new(stub);
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::ONE);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    let calls = renderer.calls();
    assert_eq!(calls[0].photo_status, PhotoStatus::NotAvailable);
    assert_eq!(calls[0].guardian_name, "-");
    assert_eq!(calls[1].photo_status, PhotoStatus::Shown);
    assert_eq!(summary.degraded.len(), 1);
    assert_eq!(summary.degraded[0].reason, "Photo not available");
}

#[tokio::test(start_paused = true)]
async fn test_slow_photo_never_blocks_past_timeout() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(fake_students(3)));
    let mut stub_loader = StubLoader::default();
    stub_loader
        .delays
        .insert("photo://s2".to_string(), Duration::from_secs(3600));
    let loader = Arc::new(stub_loader);
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::TWO);

    let started = tokio::time::Instant::now();
    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(500));
    assert!(elapsed < Duration::from_secs(5));

    assert_eq!(summary.rendered_tickets, 3);
    assert_eq!(summary.pages, 2);
    assert_eq!(summary.final_state, ExportState::Saved);
    assert_eq!(summary.degraded.len(), 1);
    assert_eq!(summary.degraded[0].student_id, student_id("s2"));
    assert_eq!(renderer.calls()[1].photo_status, PhotoStatus::Failed);
}

#[tokio::test]
async fn test_lookups_happen_at_most_once_per_student() {
    let dir = tempfile::tempdir().unwrap();
    let mut stub = StubBackend::with_students(fake_students(4));
    stub.guardians.remove(&student_id("s2"));
    stub.record_photos.remove(&student_id("s4"));
    let backend = Arc::new(stub);
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());

    let mut options = options(dir.path());
    options.prefetch = true;
    let mut pipeline = ExportPipeline::new(backend.clone(), loader, renderer, options);

    pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    assert!(backend.calls.max_single_lookups() <= 1);
    assert_eq!(
        backend
            .calls
            .guardian_bulk
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
    // The school header is fetched once per run
    assert_eq!(
        backend
            .calls
            .school
            .load(std::sync::atomic::Ordering::SeqCst),
        1
    );
    // Prefetched students are never looked up individually
    assert_eq!(backend.calls.record_lookups(&student_id("s1")), 0);
    // s4 had no prefetched photo and is resolved once per source
    assert_eq!(backend.calls.profile_lookups(&student_id("s4")), 1);
    assert_eq!(backend.calls.record_lookups(&student_id("s4")), 1);
}

#[tokio::test]
async fn test_prefetch_keeps_source_rank() {
    let dir = tempfile::tempdir().unwrap();
    let mut stub = StubBackend::with_students(fake_students(2));
    stub.profile_photos
        .insert(student_id("s1"), "profile://s1".to_string());
    let backend = Arc::new(stub);
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());

    let mut options = options(dir.path());
    options.prefetch = true;
    let mut pipeline = ExportPipeline::new(backend.clone(), loader.clone(), renderer, options);

    pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    // linked_profile outranks student_record
    assert_eq!(loader.load_count("profile://s1"), 1);
    assert_eq!(loader.load_count("photo://s1"), 0);
    assert_eq!(loader.load_count("photo://s2"), 1);
}

#[tokio::test]
async fn test_failed_logo_is_loaded_once_per_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut stub = StubBackend::with_students(fake_students(3));
    if let Some(school) = stub.school.as_mut() {
        school.logo_url = Some("logo://school".to_string());
    }
    let backend = Arc::new(stub);
    let mut stub_loader = StubLoader::default();
    stub_loader.failing.insert("logo://school".to_string());
    let loader = Arc::new(stub_loader);
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::ONE);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(loader.load_count("logo://school"), 1);
    // A missing logo does not degrade tickets
    assert!(summary.degraded.is_empty());
}

#[tokio::test]
async fn test_repeat_last_fills_final_page() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(fake_students(5)));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());

    let mut options = options(dir.path());
    options.arity = GridArity::FOUR;
    options.last_page = LastPagePolicy::RepeatLast;
    let mut pipeline = ExportPipeline::new(backend, loader, renderer.clone(), options);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    // Padding reuses images; nothing is rendered twice
    assert_eq!(renderer.calls().len(), 5);
    assert_eq!(summary.pages, 2);
}

#[tokio::test]
async fn test_single_ticket_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut students = fake_students(3);
    students[0].name = "Asha Rao".to_string();
    let id = students[0].id.clone();
    let backend = Arc::new(StubBackend::with_students(students));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(RecordingRenderer::default());
    let mut pipeline = pipeline(&backend, &loader, &renderer, dir.path(), GridArity::SIX);

    let summary = pipeline
        .export_student(Some(&class_id()), &id)
        .await
        .unwrap();

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.rendered_tickets, 1);
    assert_eq!(
        summary.output_path.unwrap(),
        dir.path().join("Asha_Rao_hall_ticket.pdf")
    );
    assert_eq!(renderer.calls().len(), 1);

    let err = pipeline
        .export_student(Some(&class_id()), &student_id("nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, HallTicketError::Validation(_)));
}

#[tokio::test]
async fn test_raster_renderer_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let backend = Arc::new(StubBackend::with_students(fake_students(3)));
    let loader = Arc::new(StubLoader::default());
    let renderer = Arc::new(
        RasterTicketRenderer::with_bundled_font(0.5, [255, 255, 255]).unwrap(),
    );

    let mut options = options(dir.path());
    options.arity = GridArity::TWO;
    let mut pipeline = ExportPipeline::new(backend, loader, renderer, options);

    let summary = pipeline
        .export_class(Some(&class_id()), &mut RecordingProgress::default())
        .await
        .unwrap();

    assert_eq!(summary.pages, 2);
    let bytes = std::fs::read(summary.output_path.unwrap()).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}
