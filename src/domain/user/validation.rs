//! User validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Errors that can occur during user validation.
///
/// Each rule has its own variant so callers can match on the failing rule
/// rather than on message text.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    #[error("all params are required, please try again")]
    AllParamsRequired,

    #[error("param: 'first_name' is required, please try again")]
    FirstNameRequired,

    #[error("first name must be at least {0} characters long, please try again")]
    FirstNameTooShort(usize),

    #[error("param: 'last_name' is required, please try again")]
    LastNameRequired,

    #[error("last name must be at least {0} characters long, please try again")]
    LastNameTooShort(usize),

    #[error("param: 'password' is required, please try again")]
    PasswordRequired,

    #[error("password must be at least {0} characters long, please try again")]
    PasswordTooShort(usize),

    #[error("param: 'email' is required, please try again")]
    EmailRequired,

    #[error("invalid email: {0}, please try again with a valid email")]
    InvalidEmail(String),

    #[error("param: 'role' must be 'admin', 'super' or 'user', got '{0}'")]
    InvalidRole(String),

    #[error("at least one param is required, please try again")]
    AtLeastOneParamRequired,
}

impl UserValidationError {
    /// Stable, machine-readable name of the failed rule
    pub fn rule(&self) -> &'static str {
        match self {
            Self::AllParamsRequired => "all_params_required",
            Self::FirstNameRequired => "first_name_required",
            Self::FirstNameTooShort(_) => "first_name_too_short",
            Self::LastNameRequired => "last_name_required",
            Self::LastNameTooShort(_) => "last_name_too_short",
            Self::PasswordRequired => "password_required",
            Self::PasswordTooShort(_) => "password_too_short",
            Self::EmailRequired => "email_required",
            Self::InvalidEmail(_) => "invalid_email",
            Self::InvalidRole(_) => "invalid_role",
            Self::AtLeastOneParamRequired => "at_least_one_param_required",
        }
    }
}

pub const MIN_NAME_LENGTH: usize = 3;
pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Check an email address against the accepted syntax.
///
/// Local part `[A-Za-z0-9._%+-]+`, then `@`, then dot-separated domain labels
/// ending in a TLD of at least two letters.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Validate a first name
///
/// Rules:
/// - Cannot be empty
/// - Minimum 3 bytes
pub fn validate_first_name(first_name: &str) -> Result<(), UserValidationError> {
    if first_name.is_empty() {
        return Err(UserValidationError::FirstNameRequired);
    }

    if first_name.len() < MIN_NAME_LENGTH {
        return Err(UserValidationError::FirstNameTooShort(MIN_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a last name
///
/// Rules:
/// - Cannot be empty
/// - Minimum 3 bytes
pub fn validate_last_name(last_name: &str) -> Result<(), UserValidationError> {
    if last_name.is_empty() {
        return Err(UserValidationError::LastNameRequired);
    }

    if last_name.len() < MIN_NAME_LENGTH {
        return Err(UserValidationError::LastNameTooShort(MIN_NAME_LENGTH));
    }

    Ok(())
}

/// Validate a password
///
/// Rules:
/// - Cannot be empty
/// - Minimum 8 bytes
pub fn validate_password(password: &str) -> Result<(), UserValidationError> {
    if password.is_empty() {
        return Err(UserValidationError::PasswordRequired);
    }

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(UserValidationError::PasswordTooShort(MIN_PASSWORD_LENGTH));
    }

    Ok(())
}

/// Validate an email
///
/// Rules:
/// - Cannot be empty
/// - Must match [`is_valid_email`]
pub fn validate_email(email: &str) -> Result<(), UserValidationError> {
    if email.is_empty() {
        return Err(UserValidationError::EmailRequired);
    }

    if !is_valid_email(email) {
        return Err(UserValidationError::InvalidEmail(email.to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_emails() {
        assert!(is_valid_email("local@domain.tld"));
        assert!(is_valid_email("local@sub.domain.tld"));
        assert!(is_valid_email("john.lennon+beatles@example.com"));
        assert!(is_valid_email("a_b%c-d@mail.example.co"));
    }

    #[test]
    fn test_invalid_emails() {
        assert!(!is_valid_email("localdomain.tld"));
        assert!(!is_valid_email("local@"));
        assert!(!is_valid_email("local@domain"));
        assert!(!is_valid_email("lo cal@domain.tld"));
        assert!(!is_valid_email("lo!cal@domain.tld"));
        assert!(!is_valid_email("local@domain.t"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_first_name_rules() {
        assert_eq!(
            validate_first_name(""),
            Err(UserValidationError::FirstNameRequired)
        );
        assert_eq!(
            validate_first_name("Jo"),
            Err(UserValidationError::FirstNameTooShort(3))
        );
        assert!(validate_first_name("John").is_ok());
    }

    #[test]
    fn test_last_name_rules() {
        assert_eq!(
            validate_last_name(""),
            Err(UserValidationError::LastNameRequired)
        );
        assert_eq!(
            validate_last_name("On"),
            Err(UserValidationError::LastNameTooShort(3))
        );
        assert!(validate_last_name("Ono").is_ok());
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(
            validate_password(""),
            Err(UserValidationError::PasswordRequired)
        );
        assert_eq!(
            validate_password("1234567"),
            Err(UserValidationError::PasswordTooShort(8))
        );
        assert!(validate_password("12345678").is_ok());
    }

    #[test]
    fn test_lengths_are_measured_in_bytes() {
        // "Jõ" is two characters but three bytes
        assert!(validate_first_name("Jõ").is_ok());
        assert!(validate_last_name("Jõ").is_ok());
        // "pässwör" is seven characters but nine bytes
        assert!(validate_password("pässwör").is_ok());
        assert_eq!(
            validate_password("pässw"),
            Err(UserValidationError::PasswordTooShort(8))
        );
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(validate_email(""), Err(UserValidationError::EmailRequired));
        assert_eq!(
            validate_email("nope"),
            Err(UserValidationError::InvalidEmail("nope".to_string()))
        );
        assert!(validate_email("john@example.com").is_ok());
    }

    #[test]
    fn test_rule_names_are_distinct() {
        let errors = [
            UserValidationError::AllParamsRequired,
            UserValidationError::FirstNameRequired,
            UserValidationError::FirstNameTooShort(3),
            UserValidationError::LastNameRequired,
            UserValidationError::LastNameTooShort(3),
            UserValidationError::PasswordRequired,
            UserValidationError::PasswordTooShort(8),
            UserValidationError::EmailRequired,
            UserValidationError::InvalidEmail(String::new()),
            UserValidationError::InvalidRole(String::new()),
            UserValidationError::AtLeastOneParamRequired,
        ];

        let mut rules: Vec<&str> = errors.iter().map(|e| e.rule()).collect();
        rules.sort_unstable();
        rules.dedup();
        assert_eq!(rules.len(), errors.len());
    }
}
