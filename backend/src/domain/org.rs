//! Clinic organisations (tenants).

use std::fmt;

use rand::{Rng, distributions::Alphanumeric};
use serde::{Deserialize, Serialize};

/// Prefix shared by every generated organisation identifier.
pub const ORG_ID_PREFIX: &str = "org_";
/// Number of random characters following [`ORG_ID_PREFIX`].
///
/// 36^16 ≈ 8e24 possible ids keeps the collision probability negligible.
pub const ORG_ID_RANDOM_LEN: usize = 16;
/// Longest identifier accepted from callers.
pub const ORG_ID_MAX: usize = 64;

/// Validation errors returned by [`OrgId::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrgIdValidationError {
    #[error("org id must not be empty")]
    Empty,
    #[error("org id must be at most {max} characters")]
    TooLong { max: usize },
    #[error("org id may only contain ASCII letters, digits, '_' or '-'")]
    InvalidCharacters,
}

/// Opaque identifier of a clinic organisation.
///
/// ## Invariants
/// - Non-empty, at most [`ORG_ID_MAX`] characters.
/// - Only `[A-Za-z0-9_-]`, so the value is safe inside cache keys and URLs.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::OrgId;
///
/// let generated = OrgId::generate();
/// assert!(generated.as_ref().starts_with("org_"));
/// assert!(OrgId::new("org abc").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrgId(String);

impl OrgId {
    /// Validate a caller-supplied organisation id.
    pub fn new(value: impl Into<String>) -> Result<Self, OrgIdValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(OrgIdValidationError::Empty);
        }
        if value.chars().count() > ORG_ID_MAX {
            return Err(OrgIdValidationError::TooLong { max: ORG_ID_MAX });
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(OrgIdValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Generate a fresh random identifier from the lowercase alphanumeric
    /// alphabet.
    pub fn generate() -> Self {
        let suffix: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(ORG_ID_RANDOM_LEN)
            .map(|byte| char::from(byte).to_ascii_lowercase())
            .collect();
        Self(format!("{ORG_ID_PREFIX}{suffix}"))
    }
}

impl AsRef<str> for OrgId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<OrgId> for String {
    fn from(value: OrgId) -> Self {
        value.0
    }
}

impl TryFrom<String> for OrgId {
    type Error = OrgIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
