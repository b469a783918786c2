//! Repository for the `categories` table.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use stencil_core::types::DbId;

use crate::models::category::{
    Category, CategoryWithCount, CreateCategory, UpdateCategory, DEFAULT_CATEGORY_COLOR,
};
use crate::models::OrderEntry;

/// Column list for `categories` queries.
const COLUMNS: &str = "id, name, description, color, icon, order_index, created_at";

/// Provides CRUD, ordering and statistics for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// List all categories in display order (ties keep insertion order).
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY order_index, id");
        sqlx::query_as::<_, Category>(&query).fetch_all(pool).await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Category>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = ?");
        sqlx::query_as::<_, Category>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn exists(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    /// Create a category placed after every existing one.
    ///
    /// A duplicate name surfaces as a unique-constraint database error.
    pub async fn create(pool: &SqlitePool, input: &CreateCategory) -> Result<Category, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description, color, icon, order_index, created_at) \
             SELECT ?, ?, ?, ?, COALESCE(MAX(order_index), 0) + 1, ? FROM categories \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.name.trim())
            .bind(input.description.as_deref())
            .bind(input.color.as_deref().unwrap_or(DEFAULT_CATEGORY_COLOR))
            .bind(input.icon.as_deref())
            .bind(Utc::now())
            .fetch_one(pool)
            .await
    }

    /// Update a category. Only non-`None` fields are applied; `Some(None)`
    /// clears `description` or `icon`.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Option<Category>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET \
                name = COALESCE(?, name), \
                description = CASE WHEN ? THEN ? ELSE description END, \
                color = COALESCE(?, color), \
                icon = CASE WHEN ? THEN ? ELSE icon END \
             WHERE id = ? \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Category>(&query)
            .bind(input.name.as_deref().map(str::trim))
            .bind(input.description.is_some())
            .bind(input.description.clone().flatten())
            .bind(input.color.as_deref())
            .bind(input.icon.is_some())
            .bind(input.icon.clone().flatten())
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a category.
    ///
    /// Templates filed under it are detached (not deleted); its tags and their
    /// template links are removed. Returns `true` if the category existed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted = Self::delete_inner(&mut tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    /// Apply a batch of `order_index` changes atomically.
    ///
    /// Unknown IDs are ignored. Returns the number of rows changed.
    pub async fn reorder(pool: &SqlitePool, orders: &[OrderEntry]) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut changed = 0;
        for entry in orders {
            let result = sqlx::query("UPDATE categories SET order_index = ? WHERE id = ?")
                .bind(entry.order_index)
                .bind(entry.id)
                .execute(&mut *tx)
                .await?;
            changed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(changed)
    }

    /// List categories in display order with the number of templates in each.
    pub async fn list_with_template_counts(
        pool: &SqlitePool,
    ) -> Result<Vec<CategoryWithCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryWithCount>(
            "SELECT c.id, c.name, c.description, c.color, c.icon, c.order_index, c.created_at, \
                    COUNT(t.id) AS template_count \
             FROM categories c \
             LEFT JOIN templates t ON t.category_id = c.id \
             GROUP BY c.id \
             ORDER BY c.order_index, c.id",
        )
        .fetch_all(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let detached = sqlx::query("UPDATE templates SET category_id = NULL WHERE category_id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        sqlx::query(
            "DELETE FROM template_tags \
             WHERE tag_id IN (SELECT id FROM tags WHERE category_id = ?)",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;

        let tags_removed = sqlx::query("DELETE FROM tags WHERE category_id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?
            .rows_affected();

        tracing::debug!(category_id = id, detached, tags_removed, "Cleared category dependents");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
