//! Unguessable identifiers shared by tracking links and campaigns.
//!
//! Tracking URLs are public and globally routed, so identifiers carry enough
//! entropy (20 characters of `[A-Za-z0-9]`, ~119 bits) that guessing another
//! clinic's link is impractical.

use rand::{Rng, distributions::Alphanumeric};

/// Length of generated identifiers.
pub const OPAQUE_ID_LEN: usize = 20;
/// Longest identifier accepted from callers.
pub const OPAQUE_ID_MAX: usize = 64;

/// Validation errors shared by opaque identifier newtypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OpaqueIdValidationError {
    #[error("identifier must not be empty")]
    Empty,
    #[error("identifier must be at most {max} characters")]
    TooLong { max: usize },
    #[error("identifier may only contain ASCII letters, digits, '_' or '-'")]
    InvalidCharacters,
}

pub(crate) fn validate_opaque_id(value: &str) -> Result<(), OpaqueIdValidationError> {
    if value.is_empty() {
        return Err(OpaqueIdValidationError::Empty);
    }
    if value.len() > OPAQUE_ID_MAX {
        return Err(OpaqueIdValidationError::TooLong { max: OPAQUE_ID_MAX });
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
    {
        return Err(OpaqueIdValidationError::InvalidCharacters);
    }
    Ok(())
}

pub(crate) fn generate_opaque_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(OPAQUE_ID_LEN)
        .map(char::from)
        .collect()
}

macro_rules! define_opaque_id {
    ($(#[$outer:meta])* $name:ident) => {
        $(#[$outer])*
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Validate a caller-supplied identifier.
            pub fn new(
                value: impl Into<String>,
            ) -> Result<Self, $crate::domain::OpaqueIdValidationError> {
                let value = value.into();
                $crate::domain::opaque_id::validate_opaque_id(&value)?;
                Ok(Self(value))
            }

            /// Generate a fresh random identifier.
            pub fn generate() -> Self {
                Self($crate::domain::opaque_id::generate_opaque_id())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::domain::OpaqueIdValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }
    };
}

pub(crate) use define_opaque_id;
