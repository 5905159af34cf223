use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::ValidationError;

pub const EMAIL_MAX_LENGTH: usize = 100;
pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 50;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 100;

/// Email value object representing a valid email address
///
/// # Invariants
/// - Exactly one '@' with a non-empty local part
/// - Domain contains a '.' that is neither first nor last
/// - At most 100 characters
/// - Stored lowercase, so equality is case-insensitive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Creates a new Email value object
    ///
    /// # Example
    /// ```
    /// use keystone_api::domain::user::value_objects::Email;
    ///
    /// let email = Email::new("John@Example.com").expect("valid email");
    /// assert_eq!(email.as_str(), "john@example.com");
    /// ```
    pub fn new(email: impl AsRef<str>) -> Result<Self, ValidationError> {
        let email = email.as_ref().trim().to_lowercase();
        if Self::is_valid(&email) {
            Ok(Email(email))
        } else {
            Err(ValidationError::new(format!("Invalid email: {}", email)))
        }
    }

    fn is_valid(email: &str) -> bool {
        if email.chars().count() > EMAIL_MAX_LENGTH || email.chars().any(char::is_whitespace) {
            return false;
        }

        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };

        !local.is_empty()
            && !domain.contains('@')
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Username value object
///
/// # Invariants
/// - 3 to 50 characters
/// - Alphanumeric, plus '_', '-' and '.'
/// - Stored lowercase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    pub fn new(username: impl AsRef<str>) -> Result<Self, ValidationError> {
        let username = username.as_ref().trim();
        let length = username.chars().count();

        if !(USERNAME_MIN_LENGTH..=USERNAME_MAX_LENGTH).contains(&length) {
            return Err(ValidationError::new(format!(
                "Username must be between {} and {} characters",
                USERNAME_MIN_LENGTH, USERNAME_MAX_LENGTH
            )));
        }

        let allowed = |c: char| c.is_alphanumeric() || matches!(c, '_' | '-' | '.');
        if !username.chars().all(allowed) {
            return Err(ValidationError::new(
                "Username must be alphanumeric (can include _, - and .)",
            ));
        }

        Ok(Username(username.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Plaintext password that passed the strength rules
///
/// Never serialized and never stored; it only lives until it is hashed.
#[derive(Clone)]
pub struct Password(String);

impl Password {
    /// Checks length (8 to 100) and requires upper, lower and digit characters
    pub fn new(password: impl Into<String>) -> Result<Self, ValidationError> {
        let password = password.into();
        let length = password.chars().count();

        if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
            return Err(ValidationError::new(format!(
                "Password must be between {} and {} characters",
                PASSWORD_MIN_LENGTH, PASSWORD_MAX_LENGTH
            )));
        }
        if !password.chars().any(char::is_uppercase) {
            return Err(ValidationError::new(
                "Password must contain at least one uppercase letter",
            ));
        }
        if !password.chars().any(char::is_lowercase) {
            return Err(ValidationError::new(
                "Password must contain at least one lowercase letter",
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new("Password must contain at least one digit"));
        }

        Ok(Password(password))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Password(***)")
    }
}
