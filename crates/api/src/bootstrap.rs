//! First-run and maintenance account provisioning.
//!
//! [`ensure_admin`] runs at server startup; [`reset_admin`] backs the
//! `reset-admin` binary.

use stencil_core::roles::ROLE_ADMIN;
use stencil_core::validation::{validate_password_strength, validate_username};
use stencil_db::models::user::{NewUser, UserChanges};
use stencil_db::repositories::UserRepo;
use stencil_db::DbPool;

use crate::auth::password::{generate_password, hash_password};
use crate::error::{AppError, AppResult};

/// Username of the account created on an empty database.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

/// What [`reset_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminReset {
    Created,
    PasswordReset,
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))
}

/// Create the default admin account if no user exists yet.
///
/// Returns the generated password when an account was created. The password
/// is logged once at `warn` so the operator can sign in.
pub async fn ensure_admin(pool: &DbPool) -> AppResult<Option<String>> {
    if UserRepo::count(pool).await? > 0 {
        return Ok(None);
    }

    let password = generate_password();
    let user = UserRepo::create(
        pool,
        &NewUser {
            username: DEFAULT_ADMIN_USERNAME.to_string(),
            email: None,
            password_hash: hash(&password)?,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::warn!(
        user_id = user.id,
        username = %user.username,
        password = %password,
        "Created initial admin account; change this password after signing in"
    );

    Ok(Some(password))
}

/// Create `username` as an admin, or reset its password if it exists.
///
/// The existing account is also promoted to admin.
pub async fn reset_admin(pool: &DbPool, username: &str, password: &str) -> AppResult<AdminReset> {
    validate_username(username)?;
    validate_password_strength(password)?;
    let password_hash = hash(password)?;

    match UserRepo::find_by_username(pool, username).await? {
        Some(user) => {
            let changes = UserChanges {
                password_hash: Some(password_hash),
                role: Some(ROLE_ADMIN.to_string()),
                ..Default::default()
            };
            UserRepo::update(pool, user.id, &changes).await?;
            tracing::info!(user_id = user.id, "Admin password reset");
            Ok(AdminReset::PasswordReset)
        }
        None => {
            let user = UserRepo::create(
                pool,
                &NewUser {
                    username: username.to_string(),
                    email: None,
                    password_hash,
                    role: ROLE_ADMIN.to_string(),
                },
            )
            .await?;
            tracing::info!(user_id = user.id, "Admin account created");
            Ok(AdminReset::Created)
        }
    }
}
