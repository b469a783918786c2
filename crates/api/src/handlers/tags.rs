//! Handlers for the `/tags` resource.
//!
//! Every tag belongs to one category. Reads require authentication; writes
//! require [`RequireEditor`].

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use stencil_core::error::CoreError;
use stencil_core::types::DbId;
use stencil_core::validation::{validate_color_hex, validate_name};
use stencil_db::models::tag::{CreateTag, Tag, UpdateTag};
use stencil_db::models::OrderEntry;
use stencil_db::repositories::{CategoryRepo, TagRepo};

use super::{deserialize_present, parse_nullable_id};
use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::query::TagListParams;
use crate::state::AppState;

const TAG_NAME_TAKEN: &str = "A tag with this name already exists";

/// Request body for `POST /tags`. `category_id` may be a number or a
/// numeric string, as sent by a form `<select>`.
#[derive(Debug, Deserialize)]
pub struct CreateTagRequest {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Request body for `PUT /tags/{id}`. Omitted fields keep their value.
#[derive(Debug, Deserialize)]
pub struct UpdateTagRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

/// Request body for `PUT /tags/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderTagsRequest {
    #[serde(default, deserialize_with = "deserialize_present")]
    pub category_id: Option<Value>,
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// A tag always belongs to a category: absent, `null` and `""` are rejected.
fn required_category_id(value: Option<&Value>) -> AppResult<DbId> {
    let parsed = match value {
        Some(value) => parse_nullable_id("category_id", value)?,
        None => None,
    };
    parsed.ok_or_else(|| AppError::BadRequest("category_id is required".into()))
}

fn tag_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Tag", id })
}

async fn ensure_category(state: &AppState, category_id: DbId) -> AppResult<()> {
    if !CategoryRepo::exists(&state.pool, category_id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Category",
            id: category_id,
        }));
    }
    Ok(())
}

/// GET /api/tags?category_id=
pub async fn list_tags(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(params): Query<TagListParams>,
) -> AppResult<Json<Vec<Tag>>> {
    let tags = TagRepo::list(&state.pool, params.category_id).await?;
    Ok(Json(tags))
}

/// GET /api/tags/{id}
pub async fn get_tag(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Tag>> {
    let tag = TagRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| tag_not_found(id))?;
    Ok(Json(tag))
}

/// POST /api/tags
///
/// The tag is placed last within its category. Names are unique across
/// all categories.
pub async fn create_tag(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<CreateTagRequest>,
) -> AppResult<(StatusCode, Json<Tag>)> {
    validate_name(input.name.trim())?;
    if let Some(color) = input.color.as_deref() {
        validate_color_hex(color)?;
    }

    let category_id = required_category_id(input.category_id.as_ref())?;
    ensure_category(&state, category_id).await?;

    let new_tag = CreateTag {
        name: input.name,
        color: input.color,
        icon: input.icon,
    };
    let tag = TagRepo::create(&state.pool, category_id, &new_tag)
        .await
        .map_err(conflict_on_unique(TAG_NAME_TAKEN))?;

    tracing::info!(
        tag_id = tag.id,
        category_id,
        user_id = auth.user_id,
        "Tag created"
    );

    Ok((StatusCode::CREATED, Json(tag)))
}

/// PUT /api/tags/{id}
pub async fn update_tag(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTagRequest>,
) -> AppResult<Json<Tag>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name.trim())?;
    }
    if let Some(color) = input.color.as_deref() {
        validate_color_hex(color)?;
    }
    let category_id = match input.category_id.as_ref() {
        Some(value) => {
            let category_id = required_category_id(Some(value))?;
            ensure_category(&state, category_id).await?;
            Some(category_id)
        }
        None => None,
    };

    let changes = UpdateTag {
        name: input.name,
        category_id,
        color: input.color,
        icon: input.icon,
    };
    let tag = TagRepo::update(&state.pool, id, &changes)
        .await
        .map_err(conflict_on_unique(TAG_NAME_TAKEN))?
        .ok_or_else(|| tag_not_found(id))?;

    tracing::info!(tag_id = id, user_id = auth.user_id, "Tag updated");

    Ok(Json(tag))
}

/// DELETE /api/tags/{id}
///
/// Removes the tag from every template first.
pub async fn delete_tag(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TagRepo::delete(&state.pool, id).await? {
        return Err(tag_not_found(id));
    }

    tracing::info!(tag_id = id, user_id = auth.user_id, "Tag deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/tags/reorder
///
/// Only tags of `category_id` are moved; entries naming a tag of another
/// category change nothing.
pub async fn reorder_tags(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<ReorderTagsRequest>,
) -> AppResult<Json<SuccessResponse>> {
    let category_id = required_category_id(input.category_id.as_ref())?;

    let changed = TagRepo::reorder(&state.pool, category_id, &input.orders).await?;

    tracing::info!(
        category_id,
        requested = input.orders.len(),
        changed,
        user_id = auth.user_id,
        "Tags reordered"
    );

    Ok(Json(SuccessResponse { success: true }))
}
