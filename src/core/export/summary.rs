//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::domain::StudentId;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Pipeline state
///
/// `Idle -> RosterLoaded -> (Populating -> Capturing) x N -> Assembled -> Saved`,
/// or `Aborted` from any state before `Saved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportState {
    Idle,
    RosterLoaded,
    /// Filling ticket data for the student at this roster index
    Populating(usize),
    /// Loading assets and rendering the student at this roster index
    Capturing(usize),
    Assembled,
    Saved,
    Aborted,
}

impl ExportState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ExportState::Saved | ExportState::Aborted)
    }
}

impl fmt::Display for ExportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportState::Idle => write!(f, "idle"),
            ExportState::RosterLoaded => write!(f, "roster_loaded"),
            ExportState::Populating(i) => write!(f, "populating[{i}]"),
            ExportState::Capturing(i) => write!(f, "capturing[{i}]"),
            ExportState::Assembled => write!(f, "assembled"),
            ExportState::Saved => write!(f, "saved"),
            ExportState::Aborted => write!(f, "aborted"),
        }
    }
}

/// A ticket rendered with a placeholder or error marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DegradedTicket {
    pub student_id: StudentId,
    pub student_name: String,
    /// Marker printed on the ticket
    pub reason: String,
}

/// Summary of an export operation
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Class label printed on the tickets
    pub class_label: String,

    /// Students on the roster
    pub total_students: usize,

    /// Ticket images produced
    pub rendered_tickets: usize,

    /// Tickets carrying a placeholder
    pub degraded: Vec<DegradedTicket>,

    /// Pages in the document
    pub pages: usize,

    /// Tickets per page
    pub tickets_per_page: u8,

    /// Where the document was written
    pub output_path: Option<PathBuf>,

    /// SHA-256 of the written document, hex encoded
    pub checksum: Option<String>,

    /// Size of the written document
    pub bytes_written: usize,

    /// Duration of the export
    pub duration: Duration,

    /// State the pipeline ended in
    pub final_state: ExportState,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(class_label: impl Into<String>) -> Self {
        Self {
            class_label: class_label.into(),
            total_students: 0,
            rendered_tickets: 0,
            degraded: Vec::new(),
            pages: 0,
            tickets_per_page: 1,
            output_path: None,
            checksum: None,
            bytes_written: 0,
            duration: Duration::from_secs(0),
            final_state: ExportState::Idle,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record a degraded ticket
    pub fn add_degraded(&mut self, ticket: DegradedTicket) {
        self.degraded.push(ticket);
    }

    /// Saved with every ticket fully rendered
    pub fn is_successful(&self) -> bool {
        self.final_state == ExportState::Saved && self.degraded.is_empty()
    }

    /// Share of tickets rendered without a placeholder, in percent
    pub fn success_rate(&self) -> f64 {
        if self.rendered_tickets == 0 {
            return 100.0;
        }
        let clean = self.rendered_tickets.saturating_sub(self.degraded.len());
        (clean as f64 / self.rendered_tickets as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            class = %self.class_label,
            total_students = self.total_students,
            rendered = self.rendered_tickets,
            degraded = self.degraded.len(),
            pages = self.pages,
            tickets_per_page = self.tickets_per_page,
            output = ?self.output_path,
            sha256 = self.checksum.as_deref().unwrap_or("-"),
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            state = %self.final_state,
            "Export summary"
        );

        for ticket in &self.degraded {
            tracing::warn!(
                student_id = %ticket.student_id,
                student = %ticket.student_name,
                reason = %ticket.reason,
                "Degraded ticket"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn degraded(id: &str) -> DegradedTicket {
        DegradedTicket {
            student_id: StudentId::new(id).unwrap(),
            student_name: "Asha".to_string(),
            reason: "Photo failed to load".to_string(),
        }
    }

    #[test]
    fn test_export_summary_creation() {
        let summary = ExportSummary::new("10 - A");

        assert_eq!(summary.class_label, "10 - A");
        assert_eq!(summary.rendered_tickets, 0);
        assert_eq!(summary.pages, 0);
        assert_eq!(summary.final_state, ExportState::Idle);
        assert!(summary.output_path.is_none());
    }

    #[test]
    fn test_export_summary_with_duration() {
        let summary = ExportSummary::new("x").with_duration(Duration::from_secs(12));
        assert_eq!(summary.duration, Duration::from_secs(12));
    }

    #[test]
    fn test_export_summary_is_successful() {
        let mut summary = ExportSummary::new("x");
        summary.rendered_tickets = 5;
        assert!(!summary.is_successful());

        summary.final_state = ExportState::Saved;
        assert!(summary.is_successful());

        summary.add_degraded(degraded("s1"));
        assert!(!summary.is_successful());
    }

    #[test]
    fn test_export_summary_success_rate() {
        let mut summary = ExportSummary::new("x");
        assert_eq!(summary.success_rate(), 100.0);

        summary.rendered_tickets = 4;
        summary.add_degraded(degraded("s1"));
        assert_eq!(summary.success_rate(), 75.0);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ExportState::Saved.is_terminal());
        assert!(ExportState::Aborted.is_terminal());
        assert!(!ExportState::Capturing(3).is_terminal());
        assert_eq!(ExportState::Populating(2).to_string(), "populating[2]");
    }
}
