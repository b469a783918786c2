//! Template models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use stencil_core::types::{DbId, Timestamp};

use super::tag::TagInfo;

/// A row from the `templates` table joined with its (optional) category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Template {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub html: String,
    pub email_subject: Option<String>,
    pub category_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
    pub category_icon: Option<String>,
}

/// A template with its tags ordered by name.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateWithTags {
    #[serde(flatten)]
    pub template: Template,
    pub tags: Vec<TagInfo>,
}

/// Fully resolved values for a new template row.
///
/// Title aliasing, subject defaulting and HTML sanitization happen before
/// this reaches the repository.
#[derive(Debug, Clone)]
pub struct NewTemplate {
    pub title: String,
    pub description: String,
    pub html: String,
    pub email_subject: Option<String>,
    pub category_id: Option<DbId>,
}

/// Resolved changes for an existing template. `None` keeps the stored value;
/// `category_id: Some(None)` clears the category.
#[derive(Debug, Clone, Default)]
pub struct TemplateChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    pub email_subject: Option<String>,
    pub category_id: Option<Option<DbId>>,
}

/// Listing filter. Tag matching is OR: any one of `tag_ids` qualifies.
#[derive(Debug, Clone, Default)]
pub struct TemplateFilter {
    pub category_id: Option<DbId>,
    pub tag_ids: Vec<DbId>,
}

/// Aggregate numbers for the dashboard.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateStats {
    pub total: i64,
    pub last_update: Option<Timestamp>,
    pub total_size: i64,
}
