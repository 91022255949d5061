//! Domain identifier types with validation
//!
//! Newtype wrappers for backend identifiers. Each type prevents mixing
//! ids of different tables and rejects blank values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Tenant identifier
///
/// Every backend query is scoped to one tenant. Tenants are UUIDs.
///
/// # Examples
///
/// ```
/// use hallticket::domain::ids::TenantId;
/// use std::str::FromStr;
///
/// let tenant = TenantId::from_str("9abe534f-1a12-474c-a387-f8795ad3ab5a").unwrap();
/// assert_eq!(tenant.as_str(), "9abe534f-1a12-474c-a387-f8795ad3ab5a");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    /// Creates a new TenantId, validating UUID format
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("Tenant ID cannot be empty".to_string());
        }
        let parsed = Uuid::parse_str(trimmed)
            .map_err(|e| format!("Tenant ID must be a UUID, got '{trimmed}': {e}"))?;
        Ok(Self(parsed.hyphenated().to_string()))
    }

    /// Returns the tenant ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TenantId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = concat!("Creates a new ", $label, " from a string")]
            pub fn new(id: impl Into<String>) -> Result<Self, String> {
                let id = id.into();
                if id.trim().is_empty() {
                    return Err(concat!($label, " cannot be empty").to_string());
                }
                Ok(Self(id.trim().to_string()))
            }

            /// Returns the id as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consumes self and returns the inner String
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Class section identifier (`classes.id`)
    ClassId,
    "Class ID"
);

string_id!(
    /// Student identifier (`students.id`)
    ///
    /// ```
    /// use hallticket::domain::ids::StudentId;
    ///
    /// let id = StudentId::new("stu-001").unwrap();
    /// assert_eq!(id.to_string(), "stu-001");
    /// assert!(StudentId::new("   ").is_err());
    /// ```
    StudentId,
    "Student ID"
);
