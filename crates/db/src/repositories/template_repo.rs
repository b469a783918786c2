//! Repository for the `templates` and `template_tags` tables.
//!
//! Listings are ordered most-recently-touched first: `updated_at` moves on
//! every edit and on every successful send (see [`TemplateRepo::touch_usage`]).

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use stencil_core::types::DbId;

use crate::models::tag::{TagInfo, TemplateTagInfo};
use crate::models::template::{
    NewTemplate, Template, TemplateChanges, TemplateFilter, TemplateStats, TemplateWithTags,
};

/// Select list for `templates` joined with the optional category.
const SELECT_TEMPLATE: &str = "\
    SELECT tp.id, tp.title, tp.description, tp.html, tp.email_subject, tp.category_id, \
           tp.created_at, tp.updated_at, \
           c.name AS category_name, c.color AS category_color, c.icon AS category_icon \
    FROM templates tp \
    LEFT JOIN categories c ON c.id = tp.category_id";

/// Provides CRUD, filtering, tag membership and bulk operations for templates.
pub struct TemplateRepo;

impl TemplateRepo {
    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// List templates matching `filter`, most recently touched first.
    pub async fn list(
        pool: &SqlitePool,
        filter: &TemplateFilter,
    ) -> Result<Vec<Template>, sqlx::Error> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_TEMPLATE);
        qb.push(" WHERE 1 = 1");

        if let Some(category_id) = filter.category_id {
            qb.push(" AND tp.category_id = ").push_bind(category_id);
        }

        if !filter.tag_ids.is_empty() {
            qb.push(" AND tp.id IN (SELECT template_id FROM template_tags WHERE tag_id IN (");
            let mut ids = qb.separated(", ");
            for &tag_id in &filter.tag_ids {
                ids.push_bind(tag_id);
            }
            ids.push_unseparated("))");
        }

        qb.push(" ORDER BY tp.updated_at DESC, tp.id DESC");
        qb.build_query_as::<Template>().fetch_all(pool).await
    }

    /// List templates matching `filter`, each with its tags.
    pub async fn list_with_tags(
        pool: &SqlitePool,
        filter: &TemplateFilter,
    ) -> Result<Vec<TemplateWithTags>, sqlx::Error> {
        let templates = Self::list(pool, filter).await?;
        Self::attach_tags(pool, templates).await
    }

    /// Find a template by its ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Template>, sqlx::Error> {
        let query = format!("{SELECT_TEMPLATE} WHERE tp.id = ?");
        sqlx::query_as::<_, Template>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a template by its ID, with its tags.
    pub async fn find_with_tags(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<TemplateWithTags>, sqlx::Error> {
        let Some(template) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let tags = Self::tags_for(pool, id).await?;
        Ok(Some(TemplateWithTags { template, tags }))
    }

    /// Tags attached to a template, ordered by name.
    pub async fn tags_for(pool: &SqlitePool, template_id: DbId) -> Result<Vec<TagInfo>, sqlx::Error> {
        sqlx::query_as::<_, TagInfo>(
            "SELECT tg.id, tg.name, tg.color, tg.icon, tg.category_id \
             FROM template_tags tt \
             JOIN tags tg ON tg.id = tt.tag_id \
             WHERE tt.template_id = ? \
             ORDER BY tg.name, tg.id",
        )
        .bind(template_id)
        .fetch_all(pool)
        .await
    }

    /// Count, latest `updated_at` and summed HTML size (bytes) over all templates.
    pub async fn stats(pool: &SqlitePool) -> Result<TemplateStats, sqlx::Error> {
        sqlx::query_as::<_, TemplateStats>(
            "SELECT COUNT(*) AS total, \
                    MAX(updated_at) AS last_update, \
                    COALESCE(SUM(LENGTH(CAST(html AS BLOB))), 0) AS total_size \
             FROM templates",
        )
        .fetch_one(pool)
        .await
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Insert a template; `created_at` and `updated_at` are both set to now.
    pub async fn create(pool: &SqlitePool, input: &NewTemplate) -> Result<Template, sqlx::Error> {
        let now = Utc::now();
        let (id,): (DbId,) = sqlx::query_as(
            "INSERT INTO templates \
                (title, description, html, email_subject, category_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(&input.html)
        .bind(input.email_subject.as_deref())
        .bind(input.category_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;

        Self::find_by_id(pool, id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Apply `changes` and refresh `updated_at`. Returns `None` if the
    /// template does not exist.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        changes: &TemplateChanges,
    ) -> Result<Option<Template>, sqlx::Error> {
        let (set_category, category_id) = match changes.category_id {
            Some(category_id) => (true, category_id),
            None => (false, None),
        };

        let result = sqlx::query(
            "UPDATE templates SET \
                title = COALESCE(?, title), \
                description = COALESCE(?, description), \
                html = COALESCE(?, html), \
                email_subject = COALESCE(?, email_subject), \
                category_id = CASE WHEN ? THEN ? ELSE category_id END, \
                updated_at = ? \
             WHERE id = ?",
        )
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.html.as_deref())
        .bind(changes.email_subject.as_deref())
        .bind(set_category)
        .bind(category_id)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::find_by_id(pool, id).await
    }

    /// Delete a template; its tag links cascade. Returns `true` if it existed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM templates WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete each listed template independently. Returns how many existed.
    pub async fn delete_bulk(pool: &SqlitePool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let mut deleted = 0;
        for &id in ids {
            if Self::delete(pool, id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Set (or clear) the category of every listed template that exists.
    ///
    /// Returns the number of templates changed.
    pub async fn assign_category_bulk(
        pool: &SqlitePool,
        ids: &[DbId],
        category_id: Option<DbId>,
    ) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("UPDATE templates SET category_id = ");
        qb.push_bind(category_id);
        qb.push(", updated_at = ").push_bind(Utc::now());
        qb.push(" WHERE id IN (");
        let mut list = qb.separated(", ");
        for &id in ids {
            list.push_bind(id);
        }
        list.push_unseparated(")");

        let result = qb.build().execute(pool).await?;
        Ok(result.rows_affected())
    }

    /// Replace the tag set of a template.
    ///
    /// Runs in one transaction: existing links are dropped and the new set
    /// inserted. Duplicate IDs collapse to one link and IDs that name no tag
    /// are skipped. Returns the resulting tags, or `None` if the template
    /// does not exist.
    pub async fn set_tags(
        pool: &SqlitePool,
        template_id: DbId,
        tag_ids: &[DbId],
    ) -> Result<Option<Vec<TagInfo>>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        if !Self::set_tags_inner(&mut tx, template_id, tag_ids).await? {
            return Ok(None);
        }
        tx.commit().await?;

        Self::tags_for(pool, template_id).await.map(Some)
    }

    /// Mark a template as just used by refreshing `updated_at`.
    ///
    /// This is the only write besides content edits that moves `updated_at`.
    pub async fn touch_usage(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE templates SET updated_at = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn set_tags_inner(
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        template_id: DbId,
        tag_ids: &[DbId],
    ) -> Result<bool, sqlx::Error> {
        let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM templates WHERE id = ?")
            .bind(template_id)
            .fetch_optional(&mut **tx)
            .await?;
        if exists.is_none() {
            return Ok(false);
        }

        sqlx::query("DELETE FROM template_tags WHERE template_id = ?")
            .bind(template_id)
            .execute(&mut **tx)
            .await?;

        let mut seen = HashSet::new();
        for &tag_id in tag_ids.iter().filter(|id| seen.insert(**id)) {
            // Selecting from `tags` skips IDs that do not exist instead of
            // tripping the foreign key.
            sqlx::query(
                "INSERT OR IGNORE INTO template_tags (template_id, tag_id) \
                 SELECT ?, id FROM tags WHERE id = ?",
            )
            .bind(template_id)
            .bind(tag_id)
            .execute(&mut **tx)
            .await?;
        }
        Ok(true)
    }

    /// Load the tags of all `templates` in one query and pair them up.
    async fn attach_tags(
        pool: &SqlitePool,
        templates: Vec<Template>,
    ) -> Result<Vec<TemplateWithTags>, sqlx::Error> {
        if templates.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Sqlite>::new(
            "SELECT tt.template_id, tg.id, tg.name, tg.color, tg.icon, tg.category_id \
             FROM template_tags tt \
             JOIN tags tg ON tg.id = tt.tag_id \
             WHERE tt.template_id IN (",
        );
        let mut ids = qb.separated(", ");
        for template in &templates {
            ids.push_bind(template.id);
        }
        ids.push_unseparated(")");
        qb.push(" ORDER BY tg.name, tg.id");

        let rows = qb.build_query_as::<TemplateTagInfo>().fetch_all(pool).await?;

        let mut by_template: HashMap<DbId, Vec<TagInfo>> = HashMap::new();
        for row in rows {
            by_template.entry(row.template_id).or_default().push(row.tag);
        }

        Ok(templates
            .into_iter()
            .map(|template| {
                let tags = by_template.remove(&template.id).unwrap_or_default();
                TemplateWithTags { template, tags }
            })
            .collect())
    }
}
