//! Tag models and DTOs.

use serde::Serialize;
use sqlx::FromRow;
use stencil_core::types::{DbId, Timestamp};

/// Color assigned to a tag created without one.
pub const DEFAULT_TAG_COLOR: &str = "#9ca3af";

/// A row from the `tags` table joined with its owning category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Tag {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub category_id: DbId,
    pub order_index: i64,
    pub created_at: Timestamp,
    pub category_name: Option<String>,
    pub category_color: Option<String>,
}

/// Lightweight tag info attached to template listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TagInfo {
    pub id: DbId,
    pub name: String,
    pub color: String,
    pub icon: Option<String>,
    pub category_id: DbId,
}

/// Tag info keyed by the template it is attached to, for batch loading.
#[derive(Debug, Clone, FromRow)]
pub struct TemplateTagInfo {
    pub template_id: DbId,
    #[sqlx(flatten)]
    pub tag: TagInfo,
}

/// DTO for creating a tag. The owning category is passed to
/// [`TagRepo::create`](crate::repositories::TagRepo::create) separately.
#[derive(Debug, Clone)]
pub struct CreateTag {
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// DTO for updating a tag. Omitted fields keep their value.
#[derive(Debug, Clone, Default)]
pub struct UpdateTag {
    pub name: Option<String>,
    pub category_id: Option<DbId>,
    pub color: Option<String>,
    pub icon: Option<String>,
}
