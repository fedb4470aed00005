//! Form validation for the user directory.
//!
//! Each field runs a fixed, ordered pipeline of pure rules
//! (required -> length -> format); the first violated rule wins and its
//! message is reported against the field. Uniqueness is checked last, and
//! only on create, by the store itself.

use std::fmt;

use crate::db::{NewUser, UserChanges};

/// The first violated rule for a single field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

type Rule = fn(&str) -> Result<(), String>;

fn run_rules(field: &'static str, value: &str, rules: &[Rule]) -> Result<(), Violation> {
    for rule in rules {
        rule(value).map_err(|message| Violation::new(field, message))?;
    }
    Ok(())
}

fn required(value: &str) -> Result<(), String> {
    if value.is_empty() {
        return Err("is required".to_string());
    }
    Ok(())
}

fn username_length(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if !(1..=64).contains(&len) {
        return Err("must be between 1 and 64 characters".to_string());
    }
    Ok(())
}

// The original validator only admitted CJK usernames; relaxed here to
// alphanumeric in any script, which still covers those.
fn username_format(value: &str) -> Result<(), String> {
    if !value.chars().all(char::is_alphanumeric) {
        return Err("may only contain letters and digits".to_string());
    }
    Ok(())
}

fn email_length(value: &str) -> Result<(), String> {
    let len = value.chars().count();
    if !(6..=64).contains(&len) {
        return Err("must be between 6 and 64 characters".to_string());
    }
    Ok(())
}

fn email_format(value: &str) -> Result<(), String> {
    if value.chars().any(char::is_whitespace) {
        return Err("is not a valid email address".to_string());
    }

    let Some((local, domain)) = value.split_once('@') else {
        return Err("is not a valid email address".to_string());
    };

    let domain_ok = domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.');
    if local.is_empty() || domain.contains('@') || !domain_ok {
        return Err("is not a valid email address".to_string());
    }

    Ok(())
}

pub fn validate_username(raw: &str) -> Result<String, Violation> {
    let value = raw.trim();
    run_rules(
        "username",
        value,
        &[required, username_length, username_format],
    )?;
    Ok(value.to_string())
}

pub fn validate_email(raw: &str) -> Result<String, Violation> {
    let value = raw.trim();
    run_rules("email", value, &[required, email_length, email_format])?;
    Ok(value.to_string())
}

/// Two-valued choice submitted as `True` / `False`, coerced server-side.
pub fn parse_choice(field: &'static str, raw: &str) -> Result<bool, Violation> {
    match raw.trim() {
        "True" | "true" => Ok(true),
        "False" | "false" => Ok(false),
        _ => Err(Violation::new(field, "must be either True or False")),
    }
}

/// A fully validated create/edit submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub username: String,
    pub email: String,
    pub status: bool,
    pub role: bool,
}

impl From<ValidatedUser> for NewUser {
    fn from(form: ValidatedUser) -> Self {
        Self {
            username: form.username,
            email: form.email,
            status: form.status,
            role: form.role,
        }
    }
}

impl From<ValidatedUser> for UserChanges {
    fn from(form: ValidatedUser) -> Self {
        Self {
            username: form.username,
            email: form.email,
            status: form.status,
            role: form.role,
        }
    }
}

/// Validate one user submission, field by field, in a fixed order. Missing
/// fields are treated as empty so they fail the `required` rule of the field
/// in question.
pub fn validate_user_form(
    username: Option<&str>,
    email: Option<&str>,
    role: Option<&str>,
    status: Option<&str>,
) -> Result<ValidatedUser, Violation> {
    let username = validate_username(username.unwrap_or_default())?;
    let email = validate_email(email.unwrap_or_default())?;
    let role = parse_choice("role", role.unwrap_or_default())?;
    let status = parse_choice("status", status.unwrap_or_default())?;

    Ok(ValidatedUser {
        username,
        email,
        status,
        role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username("alice").unwrap(), "alice");
        assert_eq!(validate_username("  alice  ").unwrap(), "alice");
        assert_eq!(validate_username("用户一").unwrap(), "用户一");
        assert!(validate_username("").is_err());
        assert!(validate_username("   ").is_err());
        assert!(validate_username(&"a".repeat(65)).is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username("semi;colon").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("a@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("a@b.c").is_err()); // below minimum length
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("a@nodomain").is_err());
        assert!(validate_email("a@example.com.").is_err());
        assert!(validate_email("a b@example.com").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(60))).is_err());
    }

    #[test]
    fn test_parse_choice() {
        assert_eq!(parse_choice("role", "True").unwrap(), true);
        assert_eq!(parse_choice("role", "false").unwrap(), false);
        assert!(parse_choice("role", "").is_err());
        assert!(parse_choice("role", "yes").is_err());
    }

    #[test]
    fn test_first_violation_wins() {
        // Empty fails `required` before the length rule gets a say.
        let err = validate_username("").unwrap_err();
        assert_eq!(err.field, "username");
        assert_eq!(err.message, "is required");

        // Too long fails length before format.
        let err = validate_username(&"a b".repeat(40)).unwrap_err();
        assert_eq!(err.message, "must be between 1 and 64 characters");
    }

    #[test]
    fn test_validate_user_form_field_order() {
        // Bad username reported before the also-bad email.
        let err = validate_user_form(Some(""), Some("junk"), Some("True"), Some("True"));
        assert_eq!(err.unwrap_err().field, "username");

        let err = validate_user_form(Some("alice"), Some("junk"), Some("True"), Some("True"));
        assert_eq!(err.unwrap_err().field, "email");

        let form =
            validate_user_form(Some("alice"), Some("a@example.com"), Some("False"), None)
                .map_err(|e| e.field);
        assert_eq!(form, Err("status"));
    }
}
