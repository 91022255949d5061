//! Class, student and roster models

use super::ids::{ClassId, StudentId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A class section as listed by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassSection {
    /// Class identifier
    pub id: ClassId,

    /// Class name (e.g. "10")
    pub class_name: String,

    /// Section (e.g. "A"), may be empty
    pub section: Option<String>,
}

impl ClassSection {
    /// Creates a class section
    pub fn new(id: ClassId, class_name: impl Into<String>, section: Option<String>) -> Self {
        Self {
            id,
            class_name: class_name.into(),
            section,
        }
    }

    fn parts(&self) -> impl Iterator<Item = &str> {
        [Some(self.class_name.as_str()), self.section.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Display label printed on tickets, e.g. `10 - A`
    ///
    /// ```
    /// use hallticket::domain::{ClassId, ClassSection};
    ///
    /// let class = ClassSection::new(ClassId::new("c1").unwrap(), "10", Some("A".into()));
    /// assert_eq!(class.label(), "10 - A");
    /// assert_eq!(class.file_stem(), "10_A");
    /// ```
    pub fn label(&self) -> String {
        self.parts().collect::<Vec<_>>().join(" - ")
    }

    /// Stem used for the bulk output filename, e.g. `10_A`
    pub fn file_stem(&self) -> String {
        self.parts().collect::<Vec<_>>().join("_")
    }
}

/// Roll number as stored by the backend
///
/// The column is numeric in most tenants but free text in some, so both
/// forms are accepted. Numeric values order before textual ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RollNumber {
    /// Numeric roll number
    Number(i64),
    /// Textual roll number
    Text(String),
}

impl RollNumber {
    fn sort_key(&self) -> (u8, i64, &str) {
        match self {
            RollNumber::Number(n) => (0, *n, ""),
            RollNumber::Text(t) => match t.trim().parse::<i64>() {
                Ok(n) => (0, n, t.as_str()),
                Err(_) => (1, 0, t.as_str()),
            },
        }
    }
}

impl Ord for RollNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for RollNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for RollNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RollNumber::Number(n) => write!(f, "{n}"),
            RollNumber::Text(t) => write!(f, "{t}"),
        }
    }
}

/// A roster entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// Student identifier
    pub id: StudentId,

    /// Display name
    pub name: String,

    /// Admission number
    pub admission_no: Option<String>,

    /// Roll number
    pub roll_no: Option<RollNumber>,
}

impl Student {
    /// Creates a student with only the required fields
    pub fn new(id: StudentId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            admission_no: None,
            roll_no: None,
        }
    }

    /// Sets the admission number
    pub fn with_admission_no(mut self, admission_no: impl Into<String>) -> Self {
        self.admission_no = Some(admission_no.into());
        self
    }

    /// Sets the roll number
    pub fn with_roll_no(mut self, roll_no: RollNumber) -> Self {
        self.roll_no = Some(roll_no);
        self
    }
}

/// Roll number ascending (missing last), then name ascending
fn roster_order(a: &Student, b: &Student) -> Ordering {
    match (&a.roll_no, &b.roll_no) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.name.cmp(&b.name))
}

/// Immutable roster snapshot for one class
///
/// Students are always held in roster order regardless of the order the
/// backend returned them in.
#[derive(Debug, Clone)]
pub struct Roster {
    class: ClassSection,
    students: Vec<Student>,
}

impl Roster {
    /// Creates a roster, sorting students into roster order
    pub fn new(class: ClassSection, mut students: Vec<Student>) -> Self {
        students.sort_by(roster_order);
        Self { class, students }
    }

    /// The class this roster belongs to
    pub fn class(&self) -> &ClassSection {
        &self.class
    }

    /// Students in roster order
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Number of students
    pub fn len(&self) -> usize {
        self.students.len()
    }

    /// Whether the roster has no students
    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    /// Student ids in roster order, deduplicated
    pub fn student_ids(&self) -> Vec<StudentId> {
        let mut seen = std::collections::HashSet::new();
        self.students
            .iter()
            .filter(|s| seen.insert(s.id.clone()))
            .map(|s| s.id.clone())
            .collect()
    }

    /// Finds a student by id
    pub fn find(&self, id: &StudentId) -> Option<&Student> {
        self.students.iter().find(|s| &s.id == id)
    }
}
