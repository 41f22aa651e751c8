//! # Country Codes
//!
//! Validated ISO 3166-1 alpha-2 country codes. The constructor accepts
//! lowercase input and stores the canonical uppercase form; anything that
//! is not exactly two ASCII letters is rejected at construction time.
//!
//! No country table is embedded here — whether a code maps to a shipping
//! zone is the zone directory's concern, not the code's.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// An ISO 3166-1 alpha-2 destination country code (e.g. `US`, `AE`, `PK`).
///
/// Stored in canonical uppercase form. Serializes as a plain string and
/// validates on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode([u8; 2]);

impl CountryCode {
    /// Create a country code from a string, validating the two-letter format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidCountryCode`] if the input is not
    /// exactly two ASCII letters.
    pub fn new(value: impl AsRef<str>) -> Result<Self, ValidationError> {
        let s = value.as_ref().trim();
        let bytes = s.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ValidationError::InvalidCountryCode(s.to_string()));
        }
        Ok(Self([
            bytes[0].to_ascii_uppercase(),
            bytes[1].to_ascii_uppercase(),
        ]))
    }

    /// Access the canonical uppercase two-letter code.
    pub fn as_str(&self) -> &str {
        // Both bytes are ASCII letters by construction.
        std::str::from_utf8(&self.0).expect("validated at construction")
    }
}

impl TryFrom<String> for CountryCode {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CountryCode> for String {
    fn from(code: CountryCode) -> Self {
        code.as_str().to_string()
    }
}

impl std::str::FromStr for CountryCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl std::fmt::Display for CountryCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
