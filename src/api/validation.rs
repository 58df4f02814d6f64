//! Input validation for API requests.
//!
//! Field checks return `Result<_, String>`; handlers collect the messages
//! with `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::{parse_calendar_date, SessionStatus, UserRole};
use chrono::NaiveDate;

lazy_static! {
    /// Loose email shape check: something@something.tld, no whitespace
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[^\s@]+@[^\s@]+\.[^\s@]+$"
    ).unwrap();
}

/// Longest accepted free-text field
const MAX_TEXT_LEN: usize = 2000;

/// A required string field: present and not blank.
pub fn require(value: Option<String>, field_name: &str) -> Result<String, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("{} is required", field_name)),
    }
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate a free-text field length
pub fn validate_text_len(value: &str, field_name: &str) -> Result<(), String> {
    if value.chars().count() > MAX_TEXT_LEN {
        return Err(format!(
            "{} is too long (max {} characters)",
            field_name, MAX_TEXT_LEN
        ));
    }
    Ok(())
}

/// Parse a requested date (`YYYY-MM-DD` or RFC 3339)
pub fn validate_requested_date(value: &str) -> Result<NaiveDate, String> {
    parse_calendar_date(value)
        .ok_or_else(|| "Invalid requested date. Use the format YYYY-MM-DD".to_string())
}

/// Parse a session status; absent counts as invalid
pub fn validate_status(status: Option<&str>) -> Result<SessionStatus, String> {
    match status {
        Some(s) => s.parse(),
        None => Err("Invalid status".to_string()),
    }
}

/// Parse a role; absent counts as invalid
pub fn validate_role(role: Option<&str>) -> Result<UserRole, String> {
    match role {
        Some(r) => r.parse(),
        None => Err("Invalid role. Must be \"admin\" or \"user\"".to_string()),
    }
}

/// Validate a password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > 1024 {
        return Err("Password is too long (max 1024 characters)".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require() {
        assert_eq!(require(Some("x".to_string()), "title"), Ok("x".to_string()));
        assert_eq!(
            require(Some("   ".to_string()), "title"),
            Err("title is required".to_string())
        );
        assert!(require(None, "title").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("admin@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("with space@example.com").is_err());
    }

    #[test]
    fn test_validate_text_len() {
        assert!(validate_text_len("short", "title").is_ok());
        assert!(validate_text_len(&"x".repeat(MAX_TEXT_LEN + 1), "title").is_err());
    }

    #[test]
    fn test_validate_requested_date() {
        assert!(validate_requested_date("2026-02-28").is_ok());
        assert!(validate_requested_date("2026-02-30").is_err());
        assert!(validate_requested_date("tomorrow").is_err());
    }

    #[test]
    fn test_validate_status() {
        assert_eq!(validate_status(Some("rejected")), Ok(SessionStatus::Rejected));
        assert!(validate_status(Some("cancelled")).is_err());
        assert!(validate_status(Some("")).is_err());
        assert!(validate_status(None).is_err());
    }

    #[test]
    fn test_validate_role() {
        assert_eq!(validate_role(Some("admin")), Ok(UserRole::Admin));
        assert!(validate_role(Some("superuser")).is_err());
        assert!(validate_role(None).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("admin123").is_ok());
        assert!(validate_password("").is_err());
        assert!(validate_password(&"p".repeat(1025)).is_err());
    }
}
