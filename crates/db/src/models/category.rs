//! Category models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stencil_core::types::{DbId, Timestamp};

/// Color assigned to a category created without one.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6366f1";

/// A row from the `categories` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub color: String,
    pub icon: Option<String>,
    pub order_index: i64,
    pub created_at: Timestamp,
}

/// A category together with the number of templates filed under it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryWithCount {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub category: Category,
    pub template_count: i64,
}

/// DTO for creating a category.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateCategory {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// DTO for updating a category. Omitted fields keep their value;
/// `description` and `icon` are cleared by an explicit `null`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateCategory {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub description: Option<Option<String>>,
    pub color: Option<String>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub icon: Option<Option<String>>,
}
