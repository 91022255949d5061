//! PostgREST row models
//!
//! These mirror the JSON rows returned by the backend tables. They are kept
//! separate from the domain models and converted with `into_domain`, which
//! drops rows whose ids are unusable.

use crate::domain::{ClassId, ClassSection, RollNumber, Student, StudentId};
use serde::Deserialize;
use std::fmt;

/// Identifier column that may be serialized as text or as a number
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Text(s) => f.write_str(s),
            RawId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl RawId {
    fn student_id(&self) -> Option<StudentId> {
        StudentId::new(self.to_string()).ok()
    }
}

/// Row of `classes`
#[derive(Debug, Clone, Deserialize)]
pub struct ClassRow {
    pub id: RawId,
    #[serde(default)]
    pub class_name: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
}

impl ClassRow {
    /// Converts to a [`ClassSection`]; `None` if the id is blank
    pub fn into_domain(self) -> Option<ClassSection> {
        let id = ClassId::new(self.id.to_string()).ok()?;
        Some(ClassSection::new(
            id,
            self.class_name.unwrap_or_default(),
            self.section,
        ))
    }
}

/// Row of `students` as selected for the roster
#[derive(Debug, Clone, Deserialize)]
pub struct StudentRow {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub admission_no: Option<RawId>,
    #[serde(default)]
    pub roll_no: Option<RollNumber>,
}

impl StudentRow {
    /// Converts to a [`Student`]; `None` if the id is blank
    pub fn into_domain(self) -> Option<Student> {
        let id = self.id.student_id()?;
        let mut student = Student::new(id, self.name.unwrap_or_default().trim());
        if let Some(admission_no) = self.admission_no {
            let admission_no = admission_no.to_string();
            if !admission_no.trim().is_empty() {
                student = student.with_admission_no(admission_no.trim());
            }
        }
        if let Some(roll_no) = self.roll_no {
            student = student.with_roll_no(roll_no);
        }
        Some(student)
    }
}

/// Row of `subjects`
#[derive(Debug, Clone, Deserialize)]
pub struct SubjectRecord {
    pub id: RawId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Row of `parents`
#[derive(Debug, Clone, Deserialize)]
pub struct ParentRow {
    pub student_id: RawId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub relation: Option<String>,
}

impl ParentRow {
    /// `(student, guardian name)` if both are present
    pub fn into_pair(self) -> Option<(StudentId, String)> {
        let name = non_blank(self.name)?;
        Some((self.student_id.student_id()?, name))
    }
}

/// Row of `users` carrying a linked student's profile picture
#[derive(Debug, Clone, Deserialize)]
pub struct ProfilePhotoRow {
    pub linked_student_id: RawId,
    #[serde(default)]
    pub profile_url: Option<String>,
}

impl ProfilePhotoRow {
    pub fn into_pair(self) -> Option<(StudentId, String)> {
        let url = non_blank(self.profile_url)?;
        Some((self.linked_student_id.student_id()?, url))
    }
}

/// Row of `students` carrying the record photo
#[derive(Debug, Clone, Deserialize)]
pub struct RecordPhotoRow {
    pub id: RawId,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl RecordPhotoRow {
    pub fn into_pair(self) -> Option<(StudentId, String)> {
        let url = non_blank(self.photo_url)?;
        Some((self.id.student_id()?, url))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_id_accepts_numbers_and_text() {
        let rows: Vec<ClassRow> = serde_json::from_str(
            r#"[{"id": 7, "class_name": "10", "section": "A"},
                {"id": "c-2", "class_name": "9", "section": null}]"#,
        )
        .unwrap();
        let classes: Vec<_> = rows.into_iter().filter_map(ClassRow::into_domain).collect();
        assert_eq!(classes[0].id.as_str(), "7");
        assert_eq!(classes[0].label(), "10 - A");
        assert_eq!(classes[1].label(), "9");
    }

    #[test]
    fn test_student_row_conversion() {
        let row: StudentRow = serde_json::from_str(
            r#"{"id": 12, "name": " Asha ", "admission_no": 5531, "roll_no": "7"}"#,
        )
        .unwrap();
        let student = row.into_domain().unwrap();
        assert_eq!(student.id.as_str(), "12");
        assert_eq!(student.name, "Asha");
        assert_eq!(student.admission_no.as_deref(), Some("5531"));
        assert_eq!(student.roll_no, Some(RollNumber::Text("7".to_string())));
    }

    #[test]
    fn test_blank_values_are_dropped() {
        let parent: ParentRow =
            serde_json::from_str(r#"{"student_id": "s1", "name": "  ", "relation": "Father"}"#)
                .unwrap();
        assert!(parent.into_pair().is_none());

        let photo: RecordPhotoRow =
            serde_json::from_str(r#"{"id": "s1", "photo_url": null}"#).unwrap();
        assert!(photo.into_pair().is_none());

        let blank_id: StudentRow = serde_json::from_str(r#"{"id": " ", "name": "X"}"#).unwrap();
        assert!(blank_id.into_domain().is_none());
    }
}
