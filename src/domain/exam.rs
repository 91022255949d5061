//! Exam label and subject schedule

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Exam name used when none is given
pub const DEFAULT_EXAM_NAME: &str = "Examination";

/// Printed when the schedule is empty
pub const NO_SUBJECTS_MESSAGE: &str = "No subjects registered";

/// One scheduled exam subject
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSubject {
    /// Subject name
    pub name: String,

    /// Exam date
    #[serde(default)]
    pub date: Option<NaiveDate>,

    /// Start time
    #[serde(default)]
    pub start: Option<NaiveTime>,

    /// End time
    #[serde(default)]
    pub end: Option<NaiveTime>,
}

impl ExamSubject {
    /// Creates a subject row with no date or time
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            date: None,
            start: None,
            end: None,
        }
    }

    /// Sets the exam date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the time window
    pub fn between(mut self, start: Option<NaiveTime>, end: Option<NaiveTime>) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Printed row: (date `dd/mm/yy`, time, name)
    pub fn printed_row(&self) -> SubjectRow {
        let date = self
            .date
            .map(|d| d.format("%d/%m/%y").to_string())
            .unwrap_or_default();
        let time = match (self.start, self.end) {
            (Some(s), Some(e)) => format!("{} - {}", s.format("%H:%M"), e.format("%H:%M")),
            (Some(t), None) | (None, Some(t)) => t.format("%H:%M").to_string(),
            (None, None) => String::new(),
        };
        SubjectRow {
            date,
            time,
            name: self.name.trim().to_string(),
        }
    }
}

/// A formatted schedule row as printed on the ticket
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectRow {
    pub date: String,
    pub time: String,
    pub name: String,
}

/// Exam label plus its subject schedule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamSchedule {
    /// Exam name as entered
    #[serde(default)]
    pub name: String,

    /// Subjects in printed order
    #[serde(default)]
    pub subjects: Vec<ExamSubject>,
}

impl ExamSchedule {
    /// Creates a schedule
    pub fn new(name: impl Into<String>, subjects: Vec<ExamSubject>) -> Self {
        Self {
            name: name.into(),
            subjects,
        }
    }

    /// Exam name, or the default label when blank
    ///
    /// ```
    /// use hallticket::domain::ExamSchedule;
    ///
    /// assert_eq!(ExamSchedule::new("  ", vec![]).display_name(), "Examination");
    /// assert_eq!(ExamSchedule::new("Term 1", vec![]).display_name(), "Term 1");
    /// ```
    pub fn display_name(&self) -> &str {
        let trimmed = self.name.trim();
        if trimmed.is_empty() {
            DEFAULT_EXAM_NAME
        } else {
            trimmed
        }
    }

    /// Printed rows, one per subject
    pub fn printed_rows(&self) -> Vec<SubjectRow> {
        self.subjects.iter().map(ExamSubject::printed_row).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_printed_row_full() {
        let subject = ExamSubject::new(" Mathematics ")
            .on(NaiveDate::from_ymd_opt(2025, 3, 4).unwrap())
            .between(Some(time(9, 0)), Some(time(12, 30)));
        let row = subject.printed_row();
        assert_eq!(row.date, "04/03/25");
        assert_eq!(row.time, "09:00 - 12:30");
        assert_eq!(row.name, "Mathematics");
    }

    #[test]
    fn test_printed_row_single_bound() {
        let only_end = ExamSubject::new("Art").between(None, Some(time(15, 0)));
        assert_eq!(only_end.printed_row().time, "15:00");
        assert_eq!(only_end.printed_row().date, "");
    }

    #[test]
    fn test_deserialize_from_toml() {
        let schedule: ExamSchedule = toml::from_str(
            r#"
name = "Mid Term"

[[subjects]]
name = "Science"
date = "2025-03-10"
start = "09:00:00"
end = "11:00:00"
"#,
        )
        .unwrap();
        assert_eq!(schedule.subjects.len(), 1);
        assert_eq!(schedule.printed_rows()[0].time, "09:00 - 11:00");
    }
}
