//! Template variable extraction and substitution.
//!
//! Two placeholder spellings are recognised and treated as the same variable:
//! `{{name}}` and the compatibility alias `{{$json.name}}`. Names are limited
//! to ASCII letters, digits and underscore; anything else between braces is
//! left alone as literal text. This is flat substitution only: there are no
//! loops, conditionals or filters.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Matches `{{$json.name}}`, capturing `name`.
static ALIAS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\$json\.([A-Za-z0-9_]+)\}\}").expect("valid regex"));

/// Matches `{{name}}`, capturing `name`.
static PLACEHOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{([A-Za-z0-9_]+)\}\}").expect("valid regex"));

static VARIABLE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid regex"));

/// Values supplied for substitution. `None` renders as an empty string.
pub type VariableValues = HashMap<String, Option<String>>;

/// Rewrite every `{{$json.name}}` to `{{name}}`.
pub fn normalize_aliases(html: &str) -> String {
    ALIAS_RE.replace_all(html, "{{$1}}").into_owned()
}

/// Whether `name` could ever be recognised as a placeholder.
pub fn is_valid_variable_name(name: &str) -> bool {
    VARIABLE_NAME_RE.is_match(name)
}

/// Extract the distinct variable names used in `html`.
///
/// Names are returned in order of first appearance. `{{x}}` and
/// `{{$json.x}}` both contribute `x`, once.
pub fn extract_variables(html: &str) -> Vec<String> {
    let normalized = normalize_aliases(html);
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_RE.captures_iter(&normalized) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Substitute `values` into the placeholders of `html`.
///
/// Aliases are normalised first. Every placeholder whose name is a key of
/// `values` is replaced (all occurrences); a `None` value yields an empty
/// string. Placeholders without a matching key are left intact so partial
/// previews keep showing what is still missing. Substitution is a single
/// pass, so placeholder syntax inside a supplied value is not expanded.
pub fn substitute(html: &str, values: &VariableValues) -> String {
    let normalized = normalize_aliases(html);
    if values.is_empty() {
        return normalized;
    }

    PLACEHOLDER_RE
        .replace_all(&normalized, |caps: &Captures<'_>| match values.get(&caps[1]) {
            Some(Some(value)) => value.clone(),
            Some(None) => String::new(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
