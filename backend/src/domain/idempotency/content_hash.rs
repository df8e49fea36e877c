//! Content hashes used as import idempotency tokens.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Longest hash string accepted from callers.
pub const CONTENT_HASH_MAX: usize = 128;

/// Validation errors for [`ContentHash`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentHashValidationError {
    #[error("file hash must not be empty")]
    Empty,
    #[error("file hash must be at most {max} characters")]
    TooLong { max: usize },
    #[error("file hash may only contain ASCII letters, digits, '_' or '-'")]
    InvalidCharacters,
}

/// Deterministic hash of an uploaded file's content.
///
/// Clients compute it before upload (lowercase hex SHA-256 in the bundled
/// client); the value keys the per-org import log.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::ContentHash;
///
/// let hash = ContentHash::of_text("a@example.com\n");
/// assert_eq!(hash.as_ref().len(), 64);
/// assert_eq!(ContentHash::new(hash.as_ref()).expect("valid"), hash);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash(String);

impl ContentHash {
    /// Validate a caller-supplied hash.
    pub fn new(value: impl Into<String>) -> Result<Self, ContentHashValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ContentHashValidationError::Empty);
        }
        if value.len() > CONTENT_HASH_MAX {
            return Err(ContentHashValidationError::TooLong {
                max: CONTENT_HASH_MAX,
            });
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(ContentHashValidationError::InvalidCharacters);
        }
        Ok(Self(value))
    }

    /// Lowercase hex SHA-256 of `text`.
    pub fn of_text(text: &str) -> Self {
        Self(hex::encode(Sha256::digest(text.as_bytes())))
    }
}

impl AsRef<str> for ContentHash {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<ContentHash> for String {
    fn from(value: ContentHash) -> Self {
        value.0
    }
}

impl TryFrom<String> for ContentHash {
    type Error = ContentHashValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// How the importer obtains the hash that keys the import log.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportHashPolicy {
    /// Use the hash supplied by the client as-is.
    #[default]
    TrustClient,
    /// Ignore the supplied value and hash the received CSV text.
    Recompute,
}

impl ImportHashPolicy {
    /// Resolve the effective hash for an upload.
    pub fn effective_hash(self, supplied: ContentHash, csv_text: &str) -> ContentHash {
        match self {
            Self::TrustClient => supplied,
            Self::Recompute => ContentHash::of_text(csv_text),
        }
    }
}
