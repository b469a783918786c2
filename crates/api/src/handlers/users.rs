//! Handlers for the `/users` resource (user management).
//!
//! All handlers require the `ManageUsers` capability via [`RequireAdmin`].
//! Password hashes never leave this module: responses use [`UserResponse`].

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use stencil_core::error::CoreError;
use stencil_core::roles::{Role, ROLE_ADMIN};
use stencil_core::types::DbId;
use stencil_core::validation::{validate_password_strength, validate_username};
use stencil_db::models::user::{NewUser, UserChanges, UserResponse};
use stencil_db::repositories::UserRepo;

use crate::auth::password::hash_password;
use crate::error::{conflict_on_unique, AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

const USERNAME_TAKEN: &str = "Username already exists";

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request body for `POST /users`.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: Option<String>,
    pub password: String,
    pub role: Option<String>,
}

/// Request body for `PUT /users/{id}`. Omitted fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn user_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "User", id })
}

fn parse_role(role: Option<&str>) -> AppResult<Option<String>> {
    role.map(str::trim)
        .filter(|r| !r.is_empty())
        .map(|r| {
            r.parse::<Role>()
                .map(|role| role.as_str().to_string())
                .map_err(|msg| AppError::Core(CoreError::Validation(msg)))
        })
        .transpose()
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<Vec<UserResponse>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| user_not_found(id))?;
    Ok(Json(user.into()))
}

/// POST /api/users
///
/// Create a user. The role defaults to `admin`.
pub async fn create_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(input): Json<CreateUserRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let username = input.username.trim().to_string();
    validate_username(&username)?;
    validate_password_strength(&input.password)?;
    let role = parse_role(input.role.as_deref())?.unwrap_or_else(|| ROLE_ADMIN.to_string());

    let new_user = NewUser {
        username,
        email: normalize_email(input.email),
        password_hash: hash(&input.password)?,
        role,
    };

    let user = UserRepo::create(&state.pool, &new_user)
        .await
        .map_err(conflict_on_unique(USERNAME_TAKEN))?;

    tracing::info!(user_id = user.id, created_by = admin.user_id, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// PUT /api/users/{id}
///
/// Update username, email, role and/or password.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    let username = input
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(|u| validate_username(u).map(|()| u.to_string()))
        .transpose()?;

    let password_hash = match input.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => {
            validate_password_strength(password)?;
            Some(hash(password)?)
        }
        None => None,
    };

    let changes = UserChanges {
        username,
        email: normalize_email(input.email),
        password_hash,
        role: parse_role(input.role.as_deref())?,
    };

    let user = UserRepo::update(&state.pool, id, &changes)
        .await
        .map_err(conflict_on_unique(USERNAME_TAKEN))?
        .ok_or_else(|| user_not_found(id))?;

    tracing::info!(user_id = id, updated_by = admin.user_id, "User updated");

    Ok(Json(user.into()))
}

/// DELETE /api/users/{id}
///
/// Delete a user. An administrator cannot delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".into(),
        ));
    }

    if !UserRepo::delete(&state.pool, id).await? {
        return Err(user_not_found(id));
    }

    tracing::info!(user_id = id, deleted_by = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}
