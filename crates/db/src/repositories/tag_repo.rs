//! Repository for the `tags` table.
//!
//! Tags are ordered within their category; reorders never move a tag
//! that belongs to a different category than the one named.

use chrono::Utc;
use sqlx::{Sqlite, SqlitePool};
use stencil_core::types::DbId;

use crate::models::tag::{CreateTag, Tag, UpdateTag, DEFAULT_TAG_COLOR};
use crate::models::OrderEntry;

/// Select list for `tags` joined with the owning category.
const SELECT_TAG: &str = "\
    SELECT t.id, t.name, t.color, t.icon, t.category_id, t.order_index, t.created_at, \
           c.name AS category_name, c.color AS category_color \
    FROM tags t \
    LEFT JOIN categories c ON c.id = t.category_id";

/// Provides CRUD and per-category ordering for tags.
pub struct TagRepo;

impl TagRepo {
    /// List tags, optionally only those of one category.
    pub async fn list(
        pool: &SqlitePool,
        category_id: Option<DbId>,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        match category_id {
            Some(category_id) => {
                let query = format!(
                    "{SELECT_TAG} WHERE t.category_id = ? ORDER BY t.order_index, t.name"
                );
                sqlx::query_as::<_, Tag>(&query)
                    .bind(category_id)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query = format!("{SELECT_TAG} ORDER BY t.order_index, t.name");
                sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
            }
        }
    }

    /// Find a tag by its ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Tag>, sqlx::Error> {
        let query = format!("{SELECT_TAG} WHERE t.id = ?");
        sqlx::query_as::<_, Tag>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a tag at the end of its category's ordering.
    ///
    /// The caller has already checked that `category_id` exists.
    pub async fn create(
        pool: &SqlitePool,
        category_id: DbId,
        input: &CreateTag,
    ) -> Result<Tag, sqlx::Error> {
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO tags (name, color, icon, category_id, order_index, created_at) \
             SELECT ?, ?, ?, ?, COALESCE(MAX(order_index), 0) + 1, ? \
             FROM tags WHERE category_id = ? \
             RETURNING id",
        )
        .bind(input.name.trim())
        .bind(input.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR))
        .bind(input.icon.as_deref())
        .bind(category_id)
        .bind(Utc::now())
        .bind(category_id)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Update a tag. Only non-`None` fields are applied.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateTag,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE tags SET \
                name = COALESCE(?, name), \
                category_id = COALESCE(?, category_id), \
                color = COALESCE(?, color), \
                icon = COALESCE(?, icon) \
             WHERE id = ?",
        )
        .bind(input.name.as_deref().map(str::trim))
        .bind(input.category_id)
        .bind(input.color.as_deref())
        .bind(input.icon.as_deref())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a tag and its template links. Returns `true` if it existed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted = Self::delete_inner(&mut tx, id).await?;
        tx.commit().await?;
        Ok(deleted)
    }

    /// Apply a batch of `order_index` changes within one category atomically.
    ///
    /// Entries naming a tag of another category, or no tag at all, change
    /// nothing. Returns the number of rows changed.
    pub async fn reorder(
        pool: &SqlitePool,
        category_id: DbId,
        orders: &[OrderEntry],
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut changed = 0;
        for entry in orders {
            let result =
                sqlx::query("UPDATE tags SET order_index = ? WHERE id = ? AND category_id = ?")
                    .bind(entry.order_index)
                    .bind(entry.id)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await?;
            changed += result.rows_affected();
        }
        tx.commit().await?;
        Ok(changed)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn delete_inner(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query("DELETE FROM template_tags WHERE tag_id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(id)
            .execute(&mut **tx)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
