pub mod assets;
pub mod auth;
pub mod categories;
pub mod sending;
pub mod stats;
pub mod tags;
pub mod templates;
pub mod users;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use stencil_core::types::DbId;

use crate::error::AppError;

// ---------------------------------------------------------------------------
// Shared request-body helpers
// ---------------------------------------------------------------------------

/// Deserialize a field so that an explicit `null` is distinguishable from an
/// absent field: absent stays `None` (via `#[serde(default)]`), `null`
/// becomes `Some(Value::Null)`.
pub(crate) fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Interpret a nullable id sent by a browser form.
///
/// `null` and `""` mean "no id"; numbers and numeric strings are ids.
pub(crate) fn parse_nullable_id(field: &str, value: &Value) -> Result<Option<DbId>, AppError> {
    let invalid = || AppError::BadRequest(format!("{field} must be an id or null"));
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n.as_i64().map(Some).ok_or_else(invalid),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s.trim().parse().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn nullable_id_accepts_form_values() {
        assert_eq!(parse_nullable_id("category_id", &json!(null)).unwrap(), None);
        assert_eq!(parse_nullable_id("category_id", &json!("")).unwrap(), None);
        assert_eq!(parse_nullable_id("category_id", &json!(7)).unwrap(), Some(7));
        assert_eq!(parse_nullable_id("category_id", &json!(" 8 ")).unwrap(), Some(8));
        assert!(parse_nullable_id("category_id", &json!("x")).is_err());
        assert!(parse_nullable_id("category_id", &json!(1.5)).is_err());
        assert!(parse_nullable_id("category_id", &json!([1])).is_err());
    }
}
