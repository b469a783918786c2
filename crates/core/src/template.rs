//! Template field resolution rules.
//!
//! Requests may name the title either `title` or the older `name`, and the
//! email subject falls back to the title. These helpers keep those rules in
//! one place so create and update agree.

use crate::error::CoreError;
use crate::validation::{validate_email_subject, validate_title};

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Pick the title from the `title` field or its `name` alias.
///
/// `title` wins when non-empty; otherwise `name` is used. Returns `None`
/// when neither carries a value.
pub fn resolve_title<'a>(title: Option<&'a str>, name: Option<&'a str>) -> Option<&'a str> {
    non_empty(title).or_else(|| non_empty(name))
}

/// Resolve and validate the title of a new template.
pub fn resolve_new_title(title: Option<&str>, name: Option<&str>) -> Result<String, CoreError> {
    let title = resolve_title(title, name)
        .ok_or_else(|| CoreError::Validation("Title is required".into()))?;
    validate_title(title)?;
    Ok(title.to_string())
}

/// Subject for a new template: the explicit subject when non-empty, else the title.
pub fn resolve_new_subject(explicit: Option<&str>, title: &str) -> Result<String, CoreError> {
    match non_empty(explicit) {
        Some(subject) => {
            validate_email_subject(subject)?;
            Ok(subject.to_string())
        }
        None => Ok(title.to_string()),
    }
}

/// Subject after an update.
///
/// An explicit non-empty subject always wins. Without one, a changed title
/// becomes the subject; with neither, the current subject is kept.
pub fn resolve_updated_subject(
    explicit: Option<&str>,
    new_title: Option<&str>,
    current: Option<&str>,
) -> Result<Option<String>, CoreError> {
    if let Some(subject) = non_empty(explicit) {
        validate_email_subject(subject)?;
        return Ok(Some(subject.to_string()));
    }
    Ok(new_title
        .map(str::to_string)
        .or_else(|| current.map(str::to_string)))
}
