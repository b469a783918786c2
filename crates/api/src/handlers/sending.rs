//! Handlers for rendering and sending templates.
//!
//! These are thin adapters over [`SendOrchestrator`]: they parse the request
//! body and shape the response.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use stencil_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireSender;
use crate::orchestrator::{values_from_json, Preview, SendOrchestrator, SendRequest};
use crate::state::AppState;

/// Request body for `POST /templates/{id}/preview`.
#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default)]
    pub variables: Map<String, Value>,
}

/// Request body for `POST /templates/{id}/send`.
#[derive(Debug, Default, Deserialize)]
pub struct SendTemplateRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    #[serde(default)]
    pub variables: Map<String, Value>,
}

#[derive(Debug, Serialize)]
pub struct VariablesResponse {
    pub variables: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message_id: String,
    pub accepted: Vec<String>,
}

/// GET /api/templates/{id}/variables
pub async fn get_variables(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<VariablesResponse>> {
    let variables = SendOrchestrator::from_state(&state).variables(id).await?;
    Ok(Json(VariablesResponse { variables }))
}

/// POST /api/templates/{id}/preview
///
/// Placeholders without a supplied value are left in the output.
pub async fn preview_template(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<PreviewRequest>,
) -> AppResult<Json<Preview>> {
    let values = values_from_json(&input.variables);
    let preview = SendOrchestrator::from_state(&state)
        .preview(id, &values)
        .await?;
    Ok(Json(preview))
}

/// POST /api/templates/{id}/send
pub async fn send_template(
    State(state): State<AppState>,
    RequireSender(auth): RequireSender,
    Path(id): Path<DbId>,
    Json(input): Json<SendTemplateRequest>,
) -> AppResult<Json<SendResponse>> {
    let request = SendRequest {
        to: input.to,
        subject: input.subject,
        values: values_from_json(&input.variables),
    };

    tracing::debug!(template_id = id, user_id = auth.user_id, "Send requested");

    let receipt = SendOrchestrator::from_state(&state).send(id, request).await?;

    Ok(Json(SendResponse {
        success: true,
        message_id: receipt.message_id,
        accepted: receipt.accepted,
    }))
}
