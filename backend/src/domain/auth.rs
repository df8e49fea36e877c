//! Login credentials for the cookie-session sign in.
//!
//! Handlers build [`LoginCredentials`] from the request body before talking to
//! the [`LoginService`](crate::domain::ports::LoginService) port, so blank
//! input never reaches an authenticator.

use zeroize::Zeroizing;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginValidationError {
    /// Username was missing or blank once trimmed.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `username` is trimmed and must not be empty after trimming.
/// - `password` must be non-empty; surrounding whitespace is preserved.
///
/// # Examples
/// ```
/// use clinic_newsletter::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" dr.chen ", "s3cret").unwrap();
/// assert_eq!(creds.username(), "dr.chen");
/// assert!(creds.matches("dr.chen", "s3cret"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = username.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            username: normalized.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username string suitable for account lookups.
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    /// Compare against a stored account without short-circuiting on the
    /// first differing password byte.
    pub fn matches(&self, username: &str, password: &str) -> bool {
        let stored = password.as_bytes();
        let given = self.password.as_bytes();
        let mut diff = stored.len() ^ given.len();
        for (left, right) in stored.iter().zip(given.iter()) {
            diff |= usize::from(left ^ right);
        }
        self.username == username && diff == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyUsername)]
    #[case("   ", "pw", LoginValidationError::EmptyUsername)]
    #[case("user", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("dr.chen", "s3cret", true)]
    #[case("dr.chen", "s3cret ", false)]
    #[case("dr.lin", "s3cret", false)]
    #[case("dr.chen", "s3cre", false)]
    fn matches_requires_exact_account(
        #[case] username: &str,
        #[case] password: &str,
        #[case] expected: bool,
    ) {
        let creds = LoginCredentials::try_from_parts("dr.chen", "s3cret").expect("valid");
        assert_eq!(creds.matches(username, password), expected);
    }
}
