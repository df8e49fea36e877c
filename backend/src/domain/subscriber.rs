//! Newsletter subscribers and CSV audience parsing.

use std::collections::HashSet;
use std::fmt;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ContentHash;

/// Source tag recorded on subscribers created by CSV import.
pub const CSV_IMPORT_SOURCE: &str = "csv_import";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static CELL_SEPARATOR_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn cell_separator_regex() -> &'static Regex {
    CELL_SEPARATOR_RE.get_or_init(|| {
        Regex::new(r"[,;\t]")
            .unwrap_or_else(|error| panic!("cell separator regex failed to compile: {error}"))
    })
}

/// Validation errors returned by [`EmailAddress::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmailValidationError {
    #[error("email must look like local@domain.tld")]
    InvalidShape,
}

/// Normalised (trimmed, lowercase) email address.
///
/// Only the loose `local@domain.tld` shape is enforced; deliverability is the
/// mail provider's problem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "patient@example.com")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise an email address.
    ///
    /// # Examples
    /// ```
    /// use clinic_newsletter::domain::EmailAddress;
    ///
    /// let email = EmailAddress::parse(" BOB@Example.com ").expect("valid");
    /// assert_eq!(email.as_ref(), "bob@example.com");
    /// assert!(EmailAddress::parse("invalid-row").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, EmailValidationError> {
        let trimmed = raw.trim();
        if !email_regex().is_match(trimmed) {
            return Err(EmailValidationError::InvalidShape);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = EmailValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Extract the audience from CSV text.
///
/// Each line contributes its first cell (split on `,`, `;` or tab). Cells that
/// do not look like an email are dropped silently. The result is lowercased
/// and de-duplicated, keeping first-seen order.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::parse_csv_emails;
///
/// let emails = parse_csv_emails("alice@example.com,Alice\nnope\nALICE@example.com");
/// assert_eq!(emails.len(), 1);
/// assert_eq!(emails[0].as_ref(), "alice@example.com");
/// ```
pub fn parse_csv_emails(csv_text: &str) -> Vec<EmailAddress> {
    let mut seen = HashSet::new();
    csv_text
        .trim()
        .lines()
        .filter_map(|line| {
            let cell = cell_separator_regex().split(line).next().unwrap_or_default();
            EmailAddress::parse(cell).ok()
        })
        .filter(|email| seen.insert(email.clone()))
        .collect()
}

/// Subscriber record stored per organisation and email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subscriber {
    pub email: EmailAddress,
    #[schema(example = "csv_import")]
    pub source: String,
    pub updated_at: DateTime<Utc>,
}

impl Subscriber {
    /// Subscriber row written by the CSV importer.
    pub fn imported(email: EmailAddress, at: DateTime<Utc>) -> Self {
        Self {
            email,
            source: CSV_IMPORT_SOURCE.to_owned(),
            updated_at: at,
        }
    }
}

/// Marker that content with `file_hash` has been imported for an org.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLog {
    pub file_hash: ContentHash,
    pub first_imported_at: DateTime<Utc>,
}

/// Result of one import call.
///
/// Parse-rejected rows are never counted; `imported + skipped` equals the
/// number of distinct valid emails in the upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportOutcome {
    pub imported: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ImportOutcome {
    /// Degenerate success for uploads without a single valid email.
    pub fn empty() -> Self {
        Self {
            imported: 0,
            skipped: 0,
            message: Some("no valid email addresses found, or the file is empty".to_owned()),
        }
    }
}
