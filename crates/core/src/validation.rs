//! Field validation shared by the HTTP boundary and maintenance tooling.
//!
//! Lengths are counted in characters, not bytes, after trimming.

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a category or tag name.
pub const MAX_NAME_LENGTH: usize = 50;

/// Maximum length of a template title.
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length of an email subject override.
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// Maximum length of a category description.
pub const MAX_DESCRIPTION_LENGTH: usize = 200;

pub const MIN_USERNAME_LENGTH: usize = 3;
pub const MAX_USERNAME_LENGTH: usize = 30;
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Content fields
// ---------------------------------------------------------------------------

fn validate_required_length(field: &str, value: &str, max: usize) -> Result<(), CoreError> {
    let len = value.trim().chars().count();
    if len == 0 {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    if len > max {
        return Err(CoreError::Validation(format!(
            "{field} must be between 1 and {max} characters"
        )));
    }
    Ok(())
}

/// Validate a category or tag name (1-50 chars).
pub fn validate_name(name: &str) -> Result<(), CoreError> {
    validate_required_length("Name", name, MAX_NAME_LENGTH)
}

/// Validate a template title (1-100 chars).
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    validate_required_length("Title", title, MAX_TITLE_LENGTH)
}

/// Validate an email subject override. Empty is allowed and means "use the title".
pub fn validate_email_subject(subject: &str) -> Result<(), CoreError> {
    if subject.trim().chars().count() > MAX_SUBJECT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Email subject must be at most {MAX_SUBJECT_LENGTH} characters"
        )));
    }
    Ok(())
}

pub fn validate_description(description: &str) -> Result<(), CoreError> {
    if description.trim().chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description must be at most {MAX_DESCRIPTION_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a template body before sanitization.
pub fn validate_html(html: &str) -> Result<(), CoreError> {
    if html.trim().is_empty() {
        return Err(CoreError::Validation("HTML content is required".into()));
    }
    Ok(())
}

/// Validate that a color string is `#RGB`, `#RRGGBB` or `#RRGGBBAA` hex.
pub fn validate_color_hex(color: &str) -> Result<(), CoreError> {
    let Some(hex_part) = color.strip_prefix('#') else {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must start with '#'"
        )));
    };

    if !matches!(hex_part.len(), 3 | 6 | 8) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must be in #RGB, #RRGGBB or #RRGGBBAA hex format"
        )));
    }

    if !hex_part.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(CoreError::Validation(format!(
            "Invalid color '{color}'. Must contain only hex digits after '#'"
        )));
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Validate a username: 3-30 chars of ASCII letters, digits and underscore.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    let len = username.chars().count();
    if !(MIN_USERNAME_LENGTH..=MAX_USERNAME_LENGTH).contains(&len) {
        return Err(CoreError::Validation(format!(
            "Username must be between {MIN_USERNAME_LENGTH} and {MAX_USERNAME_LENGTH} characters"
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(CoreError::Validation(
            "Username may only contain letters, digits and underscores".into(),
        ));
    }
    Ok(())
}

/// Validate password strength: at least 8 chars with a lowercase letter,
/// an uppercase letter and a digit.
pub fn validate_password_strength(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(CoreError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(CoreError::Validation(
            "Password must contain an uppercase letter, a lowercase letter and a digit".into(),
        ));
    }
    Ok(())
}
