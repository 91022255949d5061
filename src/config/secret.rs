//! Credential handling for the backend anon key
//!
//! The anon key is wrapped in [`secrecy::Secret`] so it is zeroed on drop,
//! redacted in `Debug` output, and only readable through `expose_secret()`.
//!
//! # Example
//!
//! ```rust
//! use hallticket::config::secret_string;
//! use secrecy::ExposeSecret;
//!
//! let key = secret_string("eyJhbGciOi...".to_string());
//! assert_eq!(key.expose_secret().as_str(), "eyJhbGciOi...");
//! assert!(!format!("{key:?}").contains("eyJ"));
//! ```

use secrecy::{CloneableSecret, DebugSecret, Secret};
use serde::{Deserialize, Deserializer};
use zeroize::Zeroize;

/// String payload stored inside a [`Secret`]
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
pub struct SecretValue(String);

impl CloneableSecret for SecretValue {}
impl DebugSecret for SecretValue {}

impl SecretValue {
    /// Borrow the raw value
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the value is empty after trimming
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for SecretValue {
    fn from(s: String) -> Self {
        // Keys pasted from dashboards often carry a trailing newline
        SecretValue(s.trim().to_string())
    }
}

impl<'de> Deserialize<'de> for SecretValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(SecretValue::from)
    }
}

/// Secret string used for credentials in configuration
pub type SecretString = Secret<SecretValue>;

/// Wraps a plain string as a [`SecretString`]
#[inline]
pub fn secret_string(value: String) -> SecretString {
    Secret::new(SecretValue::from(value))
}
