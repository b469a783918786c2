//! Handlers for the `/categories` resource.
//!
//! Reads require authentication; writes require [`RequireEditor`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use stencil_core::error::CoreError;
use stencil_core::types::DbId;
use stencil_core::validation::{validate_color_hex, validate_description, validate_name};
use stencil_db::models::category::{Category, CategoryWithCount, CreateCategory, UpdateCategory};
use stencil_db::models::OrderEntry;
use stencil_db::repositories::CategoryRepo;

use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireEditor;
use crate::state::AppState;

const CATEGORY_NAME_TAKEN: &str = "A category with this name already exists";

/// Request body for `PUT /categories/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderCategoriesRequest {
    #[serde(default)]
    pub orders: Vec<OrderEntry>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn category_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Category",
        id,
    })
}

fn validate_optional_fields(
    description: Option<&str>,
    color: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(description) = description {
        validate_description(description)?;
    }
    if let Some(color) = color {
        validate_color_hex(color)?;
    }
    Ok(())
}

/// GET /api/categories
pub async fn list_categories(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<Category>>> {
    let categories = CategoryRepo::list(&state.pool).await?;
    Ok(Json(categories))
}

/// GET /api/categories/stats
///
/// Every category with the number of templates filed under it.
pub async fn category_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<Vec<CategoryWithCount>>> {
    let stats = CategoryRepo::list_with_template_counts(&state.pool).await?;
    Ok(Json(stats))
}

/// GET /api/categories/{id}
pub async fn get_category(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<Category>> {
    let category = CategoryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))?;
    Ok(Json(category))
}

/// POST /api/categories
pub async fn create_category(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<CreateCategory>,
) -> AppResult<(StatusCode, Json<Category>)> {
    validate_name(input.name.trim())?;
    validate_optional_fields(input.description.as_deref(), input.color.as_deref())?;

    let category = CategoryRepo::create(&state.pool, &input)
        .await
        .map_err(conflict_on_unique(CATEGORY_NAME_TAKEN))?;

    tracing::info!(
        category_id = category.id,
        user_id = auth.user_id,
        "Category created"
    );

    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT /api/categories/{id}
pub async fn update_category(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCategory>,
) -> AppResult<Json<Category>> {
    if let Some(name) = input.name.as_deref() {
        validate_name(name.trim())?;
    }
    validate_optional_fields(
        input.description.as_ref().and_then(|d| d.as_deref()),
        input.color.as_deref(),
    )?;

    let category = CategoryRepo::update(&state.pool, id, &input)
        .await
        .map_err(conflict_on_unique(CATEGORY_NAME_TAKEN))?
        .ok_or_else(|| category_not_found(id))?;

    tracing::info!(category_id = id, user_id = auth.user_id, "Category updated");

    Ok(Json(category))
}

/// DELETE /api/categories/{id}
///
/// Templates in the category are kept but detached; its tags are removed.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !CategoryRepo::delete(&state.pool, id).await? {
        return Err(category_not_found(id));
    }

    tracing::info!(category_id = id, user_id = auth.user_id, "Category deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/categories/reorder
///
/// Apply all order changes in one transaction. Unknown ids are ignored.
pub async fn reorder_categories(
    State(state): State<AppState>,
    RequireEditor(auth): RequireEditor,
    Json(input): Json<ReorderCategoriesRequest>,
) -> AppResult<Json<MessageResponse>> {
    let changed = CategoryRepo::reorder(&state.pool, &input.orders).await?;

    tracing::info!(
        requested = input.orders.len(),
        changed,
        user_id = auth.user_id,
        "Categories reordered"
    );

    Ok(Json(MessageResponse {
        message: "Categories reordered successfully".into(),
    }))
}
