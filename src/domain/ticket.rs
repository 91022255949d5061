//! Populated ticket content
//!
//! [`TicketData`] is everything printed on one hall ticket except the
//! images. It is built once per student and handed to the renderer.

use super::exam::{ExamSchedule, SubjectRow};
use super::school::SchoolDetails;
use super::student::Student;
use chrono::NaiveDate;

/// Placeholder for any missing text field
pub const EMPTY_FIELD: &str = "-";

/// Marker shown when a student has no photo reference
pub const PHOTO_NOT_AVAILABLE: &str = "Photo not available";

/// Marker shown when the photo reference could not be resolved or loaded
pub const PHOTO_FAILED: &str = "Photo failed to load";

/// What the photo box on a ticket should show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStatus {
    /// A photo image is available
    Shown,
    /// No photo reference exists for the student
    NotAvailable,
    /// Lookup or load failed (error, timeout, undecodable image)
    Failed,
}

impl PhotoStatus {
    /// Error marker text, if the photo is not shown
    pub fn marker(&self) -> Option<&'static str> {
        match self {
            PhotoStatus::Shown => None,
            PhotoStatus::NotAvailable => Some(PHOTO_NOT_AVAILABLE),
            PhotoStatus::Failed => Some(PHOTO_FAILED),
        }
    }
}

/// Text content of one hall ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicketData {
    pub school_name: String,
    pub school_address: String,
    pub student_name: String,
    pub admission_no: String,
    pub roll_no: String,
    pub guardian_name: String,
    pub class_label: String,
    pub exam_name: String,
    pub issue_date: String,
    pub session: String,
    pub semester: String,
    pub subjects: Vec<SubjectRow>,
    pub photo_status: PhotoStatus,
}

impl TicketData {
    /// Populates ticket fields for one student
    ///
    /// `school` is `None` when the header could not be resolved; the
    /// generic name and `-` address are printed in that case.
    pub fn populate(
        student: &Student,
        school: Option<&SchoolDetails>,
        guardian_name: Option<&str>,
        class_label: &str,
        exam: &ExamSchedule,
        issued_on: NaiveDate,
    ) -> Self {
        let fallback = SchoolDetails::default();
        let school = school.unwrap_or(&fallback);

        Self {
            school_name: school.display_name().to_string(),
            school_address: school.address_line(),
            student_name: or_dash(Some(student.name.as_str())),
            admission_no: or_dash(student.admission_no.as_deref()),
            roll_no: student
                .roll_no
                .as_ref()
                .map(|r| r.to_string())
                .unwrap_or_else(|| EMPTY_FIELD.to_string()),
            guardian_name: or_dash(guardian_name),
            class_label: or_dash(Some(class_label)),
            exam_name: exam.display_name().to_string(),
            issue_date: issued_on.format("%d/%m/%Y").to_string(),
            session: issued_on.format("%B %Y").to_string(),
            semester: EMPTY_FIELD.to_string(),
            subjects: exam.printed_rows(),
            photo_status: PhotoStatus::NotAvailable,
        }
    }

    /// Sets what the photo box shows
    pub fn with_photo_status(mut self, status: PhotoStatus) -> Self {
        self.photo_status = status;
        self
    }

    /// Whether the ticket carries a placeholder or error marker
    pub fn is_degraded(&self) -> bool {
        self.photo_status != PhotoStatus::Shown
    }
}

fn or_dash(value: Option<&str>) -> String {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(EMPTY_FIELD)
        .to_string()
}
