//! School header details

use serde::{Deserialize, Serialize};

/// Name printed when the backend has no school name
pub const DEFAULT_SCHOOL_NAME: &str = "School Name";

/// School header fields (`school_details` row)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolDetails {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
    pub logo_url: Option<String>,
    pub principal_name: Option<String>,
}

impl SchoolDetails {
    /// School name, falling back to a generic label
    pub fn display_name(&self) -> &str {
        non_blank(&self.name).unwrap_or(DEFAULT_SCHOOL_NAME)
    }

    /// Address parts joined with `", "`, or `-` when none are set
    ///
    /// ```
    /// use hallticket::domain::SchoolDetails;
    ///
    /// let details = SchoolDetails {
    ///     address: Some("12 Hill Road".into()),
    ///     city: Some("Pune".into()),
    ///     pincode: Some("411001".into()),
    ///     ..Default::default()
    /// };
    /// assert_eq!(details.address_line(), "12 Hill Road, Pune, 411001");
    /// assert_eq!(hallticket::domain::SchoolDetails::default().address_line(), "-");
    /// ```
    pub fn address_line(&self) -> String {
        let parts: Vec<&str> = [&self.address, &self.city, &self.state, &self.pincode]
            .into_iter()
            .filter_map(non_blank)
            .collect();
        if parts.is_empty() {
            "-".to_string()
        } else {
            parts.join(", ")
        }
    }

    /// Logo reference, if any
    pub fn logo(&self) -> Option<&str> {
        non_blank(&self.logo_url)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let details = SchoolDetails {
            name: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(details.display_name(), DEFAULT_SCHOOL_NAME);
    }

    #[test]
    fn test_logo_blank_is_none() {
        let details = SchoolDetails {
            logo_url: Some(String::new()),
            ..Default::default()
        };
        assert!(details.logo().is_none());
    }

    #[test]
    fn test_deserialize_partial_row() {
        let details: SchoolDetails =
            serde_json::from_str(r#"{"name":"Green Valley","state":"KA","logo_url":null}"#)
                .unwrap();
        assert_eq!(details.display_name(), "Green Valley");
        assert_eq!(details.address_line(), "KA");
    }
}
