use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use uuid::Uuid;

static USERNAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap());

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

/// Names the specific rule an input violated, so callers can correct it.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("username must be 3-20 characters and contain only letters, numbers, and underscores")]
    InvalidUsername,
    #[error("invalid email format")]
    InvalidEmail,
    #[error("password must be at least 8 characters long")]
    PasswordTooShort,
    #[error("password must contain at least one uppercase letter")]
    PasswordNeedsUppercase,
    #[error("password must contain at least one lowercase letter")]
    PasswordNeedsLowercase,
    #[error("password must contain at least one number")]
    PasswordNeedsDigit,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(pub Uuid);

/// A validated username. Comparison is case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(pub String);

impl Username {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        if USERNAME_PATTERN.is_match(raw) {
            Ok(Self(raw.to_owned()))
        } else {
            Err(ValidationError::InvalidUsername)
        }
    }
}

/// A validated email address, normalized to lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(pub String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim().to_lowercase();
        if EMAIL_PATTERN.is_match(&raw) {
            Ok(Self(raw))
        } else {
            Err(ValidationError::InvalidEmail)
        }
    }
}

/// The public view of an account. The credential hash never leaves the
/// queries module.
#[derive(Debug)]
pub struct User {
    pub id: Id,
    pub username: Username,
    pub email: Email,
    pub created: DateTime<Utc>,
}

pub(super) fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        return Err(ValidationError::PasswordTooShort);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::PasswordNeedsUppercase);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::PasswordNeedsLowercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordNeedsDigit);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usernames_follow_the_allowed_grammar() {
        assert!(Username::parse("alice").is_ok());
        assert!(Username::parse("alice_99").is_ok());
        assert!(Username::parse("  alice  ").is_ok());
        assert_eq!(
            Username::parse("ab"),
            Err(ValidationError::InvalidUsername)
        );
        assert_eq!(
            Username::parse("this_name_is_way_too_long_to_use"),
            Err(ValidationError::InvalidUsername)
        );
        assert_eq!(
            Username::parse("no spaces"),
            Err(ValidationError::InvalidUsername)
        );
        assert_eq!(
            Username::parse("dash-ed"),
            Err(ValidationError::InvalidUsername)
        );
    }

    #[test]
    fn emails_are_validated_and_lowercased() {
        assert_eq!(
            Email::parse("Alice@Example.COM").unwrap(),
            Email("alice@example.com".to_owned())
        );
        assert_eq!(Email::parse("not-an-email"), Err(ValidationError::InvalidEmail));
        assert_eq!(Email::parse("a@b"), Err(ValidationError::InvalidEmail));
        assert_eq!(Email::parse(""), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn password_rules_name_the_violated_rule() {
        assert_eq!(validate_password("Passw0rd1"), Ok(()));
        assert_eq!(
            validate_password("Pw1"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_password("passw0rd"),
            Err(ValidationError::PasswordNeedsUppercase)
        );
        assert_eq!(
            validate_password("PASSW0RD"),
            Err(ValidationError::PasswordNeedsLowercase)
        );
        assert_eq!(
            validate_password("Password"),
            Err(ValidationError::PasswordNeedsDigit)
        );
    }
}
