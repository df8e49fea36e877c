//! Keys for the replayable-response cache.
use thiserror::Error;

use crate::domain::{IdempotencyKey, OrgId};

/// Cache key under which a replayable response is stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResponseCacheKey(String);

impl ResponseCacheKey {
    /// Construct a cache key after validating that it is non-empty and
    /// free of whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, ResponseCacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ResponseCacheKeyValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(ResponseCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key for an org data export replay: `export:{org_id}:{key}`.
    ///
    /// Both components are validated identifiers, so the result is always a
    /// valid key.
    ///
    /// # Examples
    /// ```
    /// use clinic_newsletter::domain::{IdempotencyKey, OrgId};
    /// use clinic_newsletter::domain::ports::ResponseCacheKey;
    ///
    /// let org = OrgId::new("org_abc").unwrap();
    /// let key = IdempotencyKey::new("k-1").unwrap();
    /// assert_eq!(ResponseCacheKey::for_export(&org, &key).as_str(), "export:org_abc:k-1");
    /// ```
    pub fn for_export(org_id: &OrgId, key: &IdempotencyKey) -> Self {
        Self(format!("export:{org_id}:{key}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ResponseCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ResponseCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`ResponseCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResponseCacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("response cache key must not be empty")]
    Empty,
    /// Key contains whitespace.
    #[error("response cache key must not contain whitespace")]
    ContainsWhitespace,
}
