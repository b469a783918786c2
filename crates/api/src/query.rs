//! Shared query parameter types for API handlers.

use serde::Deserialize;
use stencil_core::types::DbId;
use stencil_db::models::template::TemplateFilter;

use crate::error::AppError;

/// Query parameters for `GET /api/templates` (`?category=<id>&tags=1,2`).
///
/// Both are kept as raw strings so malformed values can be reported as 400
/// with a readable message instead of the extractor's generic rejection.
#[derive(Debug, Default, Deserialize)]
pub struct TemplateListParams {
    pub category: Option<String>,
    pub tags: Option<String>,
}

impl TemplateListParams {
    /// Parse into a repository filter. Empty values mean "no filter".
    pub fn into_filter(self) -> Result<TemplateFilter, AppError> {
        let category_id = match self.category.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(parse_id("category", raw)?),
        };

        let tag_ids = match self.tags.as_deref() {
            None => Vec::new(),
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| parse_id("tags", s))
                .collect::<Result<Vec<_>, _>>()?,
        };

        Ok(TemplateFilter {
            category_id,
            tag_ids,
        })
    }
}

/// Query parameters for `GET /api/tags` (`?category_id=<id>`).
#[derive(Debug, Deserialize)]
pub struct TagListParams {
    pub category_id: Option<DbId>,
}

fn parse_id(field: &str, raw: &str) -> Result<DbId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid {field} id '{raw}'")))
}
