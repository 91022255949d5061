//! Output file names

use crate::domain::ClassSection;
use regex::Regex;
use std::sync::OnceLock;

fn unsafe_chars() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"[^A-Za-z0-9_-]").unwrap_or_else(|_| unreachable!()))
}

/// Replaces every character outside `[A-Za-z0-9_-]` with `_`
///
/// Each character is replaced on its own; runs are not collapsed.
///
/// ```
/// use hallticket::core::export::naming::sanitize_file_stem;
///
/// assert_eq!(sanitize_file_stem("Asha K. Rao"), "Asha_K__Rao");
/// ```
pub fn sanitize_file_stem(name: &str) -> String {
    unsafe_chars().replace_all(name, "_").into_owned()
}

/// `<sanitized name>_hall_ticket.pdf`, or `ticket_hall_ticket.pdf` for an empty name
pub fn single_ticket_filename(student_name: &str) -> String {
    let stem = if student_name.is_empty() {
        "ticket".to_string()
    } else {
        sanitize_file_stem(student_name)
    };
    format!("{stem}_hall_ticket.pdf")
}

/// `<class>_<section>_all_hall_tickets.pdf`
///
/// Path separators in class names are replaced so the file always lands in
/// the output directory.
pub fn bulk_filename(class: &ClassSection) -> String {
    let stem = class.file_stem().replace(['/', '\\'], "_");
    let stem = if stem.is_empty() { "class".to_string() } else { stem };
    format!("{stem}_all_hall_tickets.pdf")
}
