//! Handlers for the `/templates` resource.
//!
//! Reads require authentication via [`AuthUser`]; every write requires the
//! `EditContent` capability via [`RequireEditor`]. Template bodies are run
//! through the allow-list sanitizer before they are stored.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stencil_core::error::CoreError;
use stencil_core::sanitize::sanitize_html;
use stencil_core::template::{
    resolve_new_subject, resolve_new_title, resolve_title, resolve_updated_subject,
};
use stencil_core::types::DbId;
use stencil_core::validation::{validate_description, validate_html, validate_title};
use stencil_db::models::tag::TagInfo;
use stencil_db::models::template::{NewTemplate, TemplateChanges, TemplateWithTags};
use stencil_db::repositories::{CategoryRepo, TemplateRepo};

use super::{deserialize_present, parse_nullable_id};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::query::TemplateListParams;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /templates`. `name` is an older alias of `title`.
#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    pub email_subject: Option<String>,
}

/// Request body for `PUT /templates/{id}`. Omitted fields are left unchanged;
/// `category_id: null` detaches the template from its category.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTemplateRequest {
    pub title: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub html: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    pub email_subject: Option<String>,
}

/// Request body for `POST /templates/assign-category`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignCategoryRequest {
    #[serde(default)]
    pub template_ids: Vec<DbId>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct AssignCategoryResponse {
    pub affected: u64,
}

/// Request body for `POST /templates/bulk-delete`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkDeleteRequest {
    #[serde(default)]
    pub template_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub deleted: u64,
}

/// Request body for `POST /templates/{id}/tags`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetTagsRequest {
    #[serde(default)]
    pub tag_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct TagsResponse {
    pub tags: Vec<TagInfo>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn template_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Template",
        id,
    })
}

/// Fail with `NotFound` unless the category exists.
async fn ensure_category(state: &AppState, category_id: DbId) -> AppResult<()> {
    if !CategoryRepo::exists(&state.pool, category_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

/// GET /api/templates?category=&tags=
///
/// List templates, most recently touched first. `tags` is a comma-separated
/// id list matched with OR semantics.
pub async fn list_templates(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TemplateListParams>,
) -> AppResult<Json<Vec<TemplateWithTags>>> {
    let filter = params.into_filter()?;
    let templates = TemplateRepo::list_with_tags(&state.pool, &filter).await?;
    Ok(Json(templates))
}

/// GET /api/templates/{id}
pub async fn get_template(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TemplateWithTags>> {
    let template = TemplateRepo::find_with_tags(&state.pool, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    Ok(Json(template))
}

/// POST /api/templates
///
/// Create a template. The subject defaults to the title.
pub async fn create_template(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<CreateTemplateRequest>,
) -> AppResult<(StatusCode, Json<TemplateWithTags>)> {
    let title = resolve_new_title(input.title.as_deref(), input.name.as_deref())?;
    let email_subject = resolve_new_subject(input.email_subject.as_deref(), &title)?;

    let html = input.html.unwrap_or_default();
    validate_html(&html)?;

    let description = input.description.unwrap_or_default();
    validate_description(&description)?;

    let category_id = match &input.category_id {
        Some(value) => parse_nullable_id("category_id", value)?,
        None => None,
    };
    if let Some(category_id) = category_id {
        ensure_category(&state, category_id).await?;
    }

    let new_template = NewTemplate {
        title,
        description,
        html: sanitize_html(&html),
        email_subject: Some(email_subject),
        category_id,
    };

    let template = TemplateRepo::create(&state.pool, &new_template).await?;

    tracing::info!(template_id = template.id, user_id = auth.user_id, "Template created");

    Ok((
        StatusCode::CREATED,
        Json(TemplateWithTags {
            template,
            tags: Vec::new(),
        }),
    ))
}

/// PUT /api/templates/{id}
///
/// Partially update a template. A changed title also becomes the subject
/// unless an explicit subject is supplied.
pub async fn update_template(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTemplateRequest>,
) -> AppResult<Json<TemplateWithTags>> {
    let title = resolve_title(input.title.as_deref(), input.name.as_deref());
    if let Some(title) = title {
        validate_title(title)?;
    }

    let email_subject = resolve_updated_subject(input.email_subject.as_deref(), title, None)?;

    if let Some(description) = input.description.as_deref() {
        validate_description(description)?;
    }

    let html = match input.html.as_deref() {
        Some(html) => {
            validate_html(html)?;
            Some(sanitize_html(html))
        }
        None => None,
    };

    let category_id = match &input.category_id {
        Some(value) => {
            let category_id = parse_nullable_id("category_id", value)?;
            if let Some(category_id) = category_id {
                ensure_category(&state, category_id).await?;
            }
            Some(category_id)
        }
        None => None,
    };

    let changes = TemplateChanges {
        title: title.map(str::to_string),
        description: input.description,
        html,
        email_subject,
        category_id,
    };

    TemplateRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    tracing::info!(template_id = id, user_id = auth.user_id, "Template updated");

    let template = TemplateRepo::find_with_tags(&state.pool, id)
        .await?
        .ok_or_else(|| template_not_found(id))?;
    Ok(Json(template))
}

/// DELETE /api/templates/{id}
pub async fn delete_template(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TemplateRepo::delete(&state.pool, id).await? {
        return Err(template_not_found(id));
    }

    tracing::info!(template_id = id, user_id = auth.user_id, "Template deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

/// POST /api/templates/assign-category
///
/// Set (or clear, with `categoryId: null`) the category of many templates.
/// Unknown template ids are skipped.
pub async fn assign_category(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<AssignCategoryRequest>,
) -> AppResult<Json<AssignCategoryResponse>> {
    if input.template_ids.is_empty() {
        return Err(AppError::BadRequest("templateIds must not be empty".into()));
    }

    let category_id = match &input.category_id {
        Some(value) => parse_nullable_id("categoryId", value)?,
        None => None,
    };
    if let Some(category_id) = category_id {
        ensure_category(&state, category_id).await?;
    }

    let affected =
        TemplateRepo::assign_category_bulk(&state.pool, &input.template_ids, category_id).await?;

    tracing::info!(
        requested = input.template_ids.len(),
        affected,
        category_id,
        user_id = auth.user_id,
        "Templates assigned to category"
    );

    Ok(Json(AssignCategoryResponse { affected }))
}

/// POST /api/templates/bulk-delete
///
/// Delete many templates; each id is attempted independently.
pub async fn bulk_delete(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<BulkDeleteRequest>,
) -> AppResult<Json<BulkDeleteResponse>> {
    if input.template_ids.is_empty() {
        return Err(AppError::BadRequest("templateIds must not be empty".into()));
    }

    let deleted = TemplateRepo::delete_bulk(&state.pool, &input.template_ids).await?;

    tracing::info!(
        requested = input.template_ids.len(),
        deleted,
        user_id = auth.user_id,
        "Templates bulk deleted"
    );

    Ok(Json(BulkDeleteResponse { deleted }))
}

// ---------------------------------------------------------------------------
// Tag membership
// ---------------------------------------------------------------------------

/// GET /api/templates/{id}/tags
pub async fn get_template_tags(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<TagsResponse>> {
    if TemplateRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(template_not_found(id));
    }
    let tags = TemplateRepo::tags_for(&state.pool, id).await?;
    Ok(Json(TagsResponse { tags }))
}

/// POST /api/templates/{id}/tags
///
/// Replace the template's tags with `tagIds`. Duplicates collapse and ids
/// that name no tag are skipped.
pub async fn set_template_tags(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<SetTagsRequest>,
) -> AppResult<Json<TagsResponse>> {
    let tags = TemplateRepo::set_tags(&state.pool, id, &input.tag_ids)
        .await?
        .ok_or_else(|| template_not_found(id))?;

    tracing::info!(
        template_id = id,
        tag_count = tags.len(),
        user_id = auth.user_id,
        "Template tags replaced"
    );

    Ok(Json(TagsResponse { tags }))
}
