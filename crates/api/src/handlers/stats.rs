//! Handler for library-wide template statistics.

use axum::extract::State;
use axum::Json;
use stencil_db::models::template::TemplateStats;
use stencil_db::repositories::TemplateRepo;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// GET /api/stats
///
/// Template count, latest `updated_at` and total HTML size in bytes.
pub async fn get_stats(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> AppResult<Json<TemplateStats>> {
    let stats = TemplateRepo::stats(&state.pool).await?;
    Ok(Json(stats))
}
