//! Client-supplied idempotency tokens (`X-Idempotency-Key`).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request header carrying the token.
pub const IDEMPOTENCY_KEY_HEADER: &str = "X-Idempotency-Key";

/// Longest token accepted from clients.
pub const IDEMPOTENCY_KEY_MAX: usize = 128;

/// Validation errors for [`IdempotencyKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdempotencyKeyValidationError {
    /// The key string was empty.
    #[error("idempotency key must not be empty")]
    EmptyKey,
    /// The key exceeded [`IDEMPOTENCY_KEY_MAX`] characters.
    #[error("idempotency key must be at most {max} characters")]
    TooLong { max: usize },
    /// The key contained characters outside `[A-Za-z0-9_-]`.
    #[error("idempotency key may only contain ASCII letters, digits, '_' or '-'")]
    InvalidKey,
}

/// Opaque idempotency token.
///
/// The client wrapper issues UUID v4 tokens, but callers retrying a logical
/// operation may carry any stable token they stored (an export id, say), so
/// only the shape is validated: non-empty, bounded and safe to embed in cache
/// keys.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::IdempotencyKey;
///
/// let key = IdempotencyKey::new("550e8400-e29b-41d4-a716-446655440000").expect("valid");
/// assert_eq!(key.as_ref(), "550e8400-e29b-41d4-a716-446655440000");
/// assert!(IdempotencyKey::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validate and construct an [`IdempotencyKey`] from a string.
    pub fn new(key: impl AsRef<str>) -> Result<Self, IdempotencyKeyValidationError> {
        Self::from_owned(key.as_ref().to_owned())
    }

    /// Generate a new random UUID v4 token.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(key: String) -> Result<Self, IdempotencyKeyValidationError> {
        if key.is_empty() {
            return Err(IdempotencyKeyValidationError::EmptyKey);
        }
        if key.len() > IDEMPOTENCY_KEY_MAX {
            return Err(IdempotencyKeyValidationError::TooLong {
                max: IDEMPOTENCY_KEY_MAX,
            });
        }
        if !key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(IdempotencyKeyValidationError::InvalidKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for IdempotencyKey {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<IdempotencyKey> for String {
    fn from(value: IdempotencyKey) -> Self {
        value.0
    }
}

impl TryFrom<String> for IdempotencyKey {
    type Error = IdempotencyKeyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}
