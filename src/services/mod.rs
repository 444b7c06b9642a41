//! Business logic between the handlers and the repository: validation, uniqueness
//! checks, upload orchestration and row → response mapping.

pub mod account;
pub mod announcements;
pub mod articles;
pub mod classes;
pub mod contact;
pub mod extracurriculars;
pub mod galleries;
pub mod media;
pub mod permissions;
pub mod roles;
pub mod systems;
pub mod users;

use crate::error::ValidationErrors;

pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Trimmed value, recording "is required" when missing or blank.
pub(crate) fn required(value: Option<&str>, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => Some(v.to_string()),
        None => {
            errors.add(field, "is required");
            None
        }
    }
}

/// Blank optional text is stored as NULL.
pub(crate) fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Something before and after a single `@`, nothing more.
pub(crate) fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

pub(crate) fn check_password(password: &str, field: &str, errors: &mut ValidationErrors) {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.add(
            field,
            format!("must be at least {} characters", MIN_PASSWORD_LENGTH),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shape() {
        assert!(is_valid_email("staff@school.test"));
        assert!(!is_valid_email("staff"));
        assert!(!is_valid_email("@school.test"));
        assert!(!is_valid_email("staff@"));
        assert!(!is_valid_email("a@b@c"));
    }

    #[test]
    fn required_trims_and_reports() {
        let mut errors = ValidationErrors::new();
        assert_eq!(required(Some("  Jo "), "name", &mut errors).as_deref(), Some("Jo"));
        assert_eq!(required(Some(" "), "email", &mut errors), None);
        assert_eq!(errors.get("email"), Some("is required"));
    }

    #[test]
    fn short_password_is_rejected() {
        let mut errors = ValidationErrors::new();
        check_password("1234567", "password", &mut errors);
        assert!(errors.get("password").is_some());

        let mut errors = ValidationErrors::new();
        check_password("12345678", "password", &mut errors);
        assert!(errors.is_empty());
    }
}
