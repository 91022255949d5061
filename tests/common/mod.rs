//! Shared stubs for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use fake::faker::name::en::Name;
use fake::Fake;
use hallticket::adapters::assets::AssetLoader;
use hallticket::adapters::backend::SchoolBackend;
use hallticket::config::HallTicketConfig;
use hallticket::core::export::ExportOptions;
use hallticket::core::render::{RenderedTicket, TicketAssets, TicketRenderer};
use hallticket::domain::{
    BackendError, ClassId, ClassSection, HallTicketError, PhotoStatus, RenderError, Result,
    RollNumber, SchoolDetails, Student, StudentId, TicketData,
};
use image::{DynamicImage, Rgb, RgbImage};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub const CLASS_ID: &str = "class-10a";

pub fn class_id() -> ClassId {
    ClassId::new(CLASS_ID).unwrap()
}

pub fn student_id(id: &str) -> StudentId {
    StudentId::new(id).unwrap()
}

/// `count` students with random names, returned in reverse roll order
pub fn fake_students(count: usize) -> Vec<Student> {
    (1..=count)
        .rev()
        .map(|roll| {
            let name: String = Name().fake();
            Student::new(student_id(&format!("s{roll}")), name)
                .with_roll_no(RollNumber::Number(roll as i64))
                .with_admission_no(format!("ADM-{roll:03}"))
        })
        .collect()
}

/// Export options writing into `dir`, no watermark, no prefetch
pub fn options(dir: &Path) -> ExportOptions {
    let mut options = ExportOptions::from_config(&HallTicketConfig::default());
    options.output_dir = dir.to_path_buf();
    options.prefetch = false;
    options.asset_timeout = Duration::from_millis(500);
    options
}

/// Per-method call counters
#[derive(Debug, Default)]
pub struct CallLog {
    pub school: AtomicUsize,
    pub guardian_single: Mutex<HashMap<StudentId, usize>>,
    pub guardian_bulk: AtomicUsize,
    pub profile_single: Mutex<HashMap<StudentId, usize>>,
    pub profile_bulk: AtomicUsize,
    pub record_single: Mutex<HashMap<StudentId, usize>>,
    pub record_bulk: AtomicUsize,
}

impl CallLog {
    fn bump(map: &Mutex<HashMap<StudentId, usize>>, id: &StudentId) {
        *map.lock().unwrap().entry(id.clone()).or_default() += 1;
    }

    fn total(map: &Mutex<HashMap<StudentId, usize>>) -> usize {
        map.lock().unwrap().values().sum()
    }

    fn max(map: &Mutex<HashMap<StudentId, usize>>) -> usize {
        map.lock().unwrap().values().copied().max().unwrap_or(0)
    }

    /// Every guardian and photo read, single or bulk
    pub fn metadata_calls(&self) -> usize {
        Self::total(&self.guardian_single)
            + Self::total(&self.profile_single)
            + Self::total(&self.record_single)
            + self.guardian_bulk.load(Ordering::SeqCst)
            + self.profile_bulk.load(Ordering::SeqCst)
            + self.record_bulk.load(Ordering::SeqCst)
    }

    /// Highest number of single reads any student saw on one table
    pub fn max_single_lookups(&self) -> usize {
        Self::max(&self.guardian_single)
            .max(Self::max(&self.profile_single))
            .max(Self::max(&self.record_single))
    }

    pub fn profile_lookups(&self, id: &StudentId) -> usize {
        self.profile_single.lock().unwrap().get(id).copied().unwrap_or(0)
    }

    pub fn record_lookups(&self, id: &StudentId) -> usize {
        self.record_single.lock().unwrap().get(id).copied().unwrap_or(0)
    }
}

/// In-memory school backend
#[derive(Debug, Default)]
pub struct StubBackend {
    pub class: Option<ClassSection>,
    pub students: Vec<Student>,
    pub roster_fails: bool,
    pub school: Option<SchoolDetails>,
    pub guardians: HashMap<StudentId, String>,
    pub profile_photos: HashMap<StudentId, String>,
    pub record_photos: HashMap<StudentId, String>,
    /// Students whose photo reads error on every source
    pub photo_errors: HashSet<StudentId>,
    /// Bulk photo reads error
    pub bulk_photo_fails: bool,
    pub calls: CallLog,
}

impl StubBackend {
    /// Class 10-A with `students`, each with a guardian and a record photo
    pub fn with_students(students: Vec<Student>) -> Self {
        let guardians = students
            .iter()
            .map(|s| (s.id.clone(), format!("Parent of {}", s.name)))
            .collect();
        let record_photos = students
            .iter()
            .map(|s| (s.id.clone(), format!("photo://{}", s.id)))
            .collect();

        Self {
            class: Some(ClassSection::new(class_id(), "10", Some("A".to_string()))),
            students,
            school: Some(SchoolDetails {
                name: Some("Green Valley School".to_string()),
                city: Some("Pune".to_string()),
                ..Default::default()
            }),
            guardians,
            record_photos,
            ..Default::default()
        }
    }

    fn photo_error(&self, table: &str) -> HallTicketError {
        BackendError::QueryFailed {
            table: table.to_string(),
            message: "permission denied".to_string(),
        }
        .into()
    }

    fn bulk(
        &self,
        map: &HashMap<StudentId, String>,
        ids: &[StudentId],
    ) -> HashMap<StudentId, String> {
        ids.iter()
            .filter(|id| !self.photo_errors.contains(*id))
            .filter_map(|id| map.get(id).map(|v| (id.clone(), v.clone())))
            .collect()
    }
}

#[async_trait]
impl SchoolBackend for StubBackend {
    async fn list_classes(&self) -> Result<Vec<ClassSection>> {
        Ok(self.class.iter().cloned().collect())
    }

    async fn fetch_class(&self, class_id: &ClassId) -> Result<Option<ClassSection>> {
        Ok(self.class.clone().filter(|c| &c.id == class_id))
    }

    async fn fetch_roster(&self, _class_id: &ClassId) -> Result<Vec<Student>> {
        if self.roster_fails {
            return Err(BackendError::ConnectionFailed("connection reset".to_string()).into());
        }
        Ok(self.students.clone())
    }

    async fn list_subjects(&self, _class_id: &ClassId) -> Result<Vec<String>> {
        Ok(vec!["Mathematics".to_string()])
    }

    async fn fetch_school_details(&self) -> Result<Option<SchoolDetails>> {
        self.calls.school.fetch_add(1, Ordering::SeqCst);
        Ok(self.school.clone())
    }

    async fn fetch_guardian_name(&self, student_id: &StudentId) -> Result<Option<String>> {
        CallLog::bump(&self.calls.guardian_single, student_id);
        Ok(self.guardians.get(student_id).cloned())
    }

    async fn fetch_guardian_names(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.calls.guardian_bulk.fetch_add(1, Ordering::SeqCst);
        Ok(student_ids
            .iter()
            .filter_map(|id| self.guardians.get(id).map(|n| (id.clone(), n.clone())))
            .collect())
    }

    async fn fetch_profile_photo(&self, student_id: &StudentId) -> Result<Option<String>> {
        CallLog::bump(&self.calls.profile_single, student_id);
        if self.photo_errors.contains(student_id) {
            return Err(self.photo_error("users"));
        }
        Ok(self.profile_photos.get(student_id).cloned())
    }

    async fn fetch_profile_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.calls.profile_bulk.fetch_add(1, Ordering::SeqCst);
        if self.bulk_photo_fails {
            return Err(self.photo_error("users"));
        }
        Ok(self.bulk(&self.profile_photos, student_ids))
    }

    async fn fetch_record_photo(&self, student_id: &StudentId) -> Result<Option<String>> {
        CallLog::bump(&self.calls.record_single, student_id);
        if self.photo_errors.contains(student_id) {
            return Err(self.photo_error("students"));
        }
        Ok(self.record_photos.get(student_id).cloned())
    }

    async fn fetch_record_photos(
        &self,
        student_ids: &[StudentId],
    ) -> Result<HashMap<StudentId, String>> {
        self.calls.record_bulk.fetch_add(1, Ordering::SeqCst);
        if self.bulk_photo_fails {
            return Err(self.photo_error("students"));
        }
        Ok(self.bulk(&self.record_photos, student_ids))
    }
}

/// Loader returning a small image for any reference
///
/// References listed in `delays` resolve only after the delay; references
/// in `failing` return a fetch error.
#[derive(Debug, Default)]
pub struct StubLoader {
    pub delays: HashMap<String, Duration>,
    pub failing: HashSet<String>,
    pub loads: Mutex<Vec<String>>,
}

impl StubLoader {
    pub fn load_count(&self, reference: &str) -> usize {
        self.loads
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.as_str() == reference)
            .count()
    }
}

#[async_trait]
impl AssetLoader for StubLoader {
    async fn load(&self, reference: &str) -> Result<DynamicImage> {
        self.loads.lock().unwrap().push(reference.to_string());
        if let Some(delay) = self.delays.get(reference) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(reference) {
            return Err(RenderError::AssetFetch {
                reference: reference.to_string(),
                message: "404 Not Found".to_string(),
            }
            .into());
        }
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([10, 120, 200]))))
    }
}

/// One rendered ticket as seen by [`RecordingRenderer`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub student_name: String,
    pub guardian_name: String,
    pub photo_status: PhotoStatus,
    pub photo_loaded: bool,
}

/// Renderer that records what it was asked to draw
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub calls: Mutex<Vec<RenderCall>>,
}

impl RecordingRenderer {
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TicketRenderer for RecordingRenderer {
    fn render(&self, ticket: &TicketData, assets: &TicketAssets) -> RenderedTicket {
        self.calls.lock().unwrap().push(RenderCall {
            student_name: ticket.student_name.clone(),
            guardian_name: ticket.guardian_name.clone(),
            photo_status: ticket.photo_status,
            photo_loaded: assets.photo.is_loaded(),
        });
        RenderedTicket::new(RgbImage::from_pixel(76, 60, Rgb([255, 255, 255])))
    }
}
