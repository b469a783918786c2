//! Template send orchestration.
//!
//! Composes the template store, the variable engine and the mail transport
//! to render a template and deliver it to one recipient. Built per request
//! from [`AppState`](crate::state::AppState); it holds only cheap handles.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::SqlitePool;
use stencil_core::error::CoreError;
use stencil_core::types::DbId;
use stencil_core::variables::{extract_variables, substitute, VariableValues};
use stencil_db::models::template::Template;
use stencil_db::repositories::TemplateRepo;
use stencil_mailer::{DeliveryReceipt, MailError, MailTransport, OutgoingMessage};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Rendered preview of a template.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Preview {
    pub html: String,
    /// Variables found in the stored (unrendered) body.
    pub original_variables: Vec<String>,
}

/// A send request after boundary parsing.
#[derive(Debug, Clone, Default)]
pub struct SendRequest {
    pub to: Option<String>,
    pub subject: Option<String>,
    pub values: VariableValues,
}

/// Convert a JSON object of variable values into substitution values.
///
/// Strings are used as-is; numbers and booleans are rendered in their JSON
/// form (so `0` and `false` stay visible); `null` renders as empty; arrays
/// and objects are rendered as compact JSON.
pub fn values_from_json(map: &Map<String, Value>) -> VariableValues {
    map.iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::Null => None,
                Value::String(s) => Some(s.clone()),
                other => Some(other.to_string()),
            };
            (key.clone(), rendered)
        })
        .collect()
}

/// Renders templates and dispatches them through the mail transport.
///
/// A send runs these steps:
/// 1. Validate that a recipient and a subject are present.
/// 2. Refuse early if the transport has no credentials.
/// 3. Load the template.
/// 4. Substitute the supplied values.
/// 5. Deliver through the transport (no retry).
/// 6. Touch the template's `updated_at` so it sorts as recently used
///    (best effort: a failure is logged, the receipt is still returned).
pub struct SendOrchestrator {
    pool: SqlitePool,
    mailer: Arc<dyn MailTransport>,
}

impl SendOrchestrator {
    pub fn new(pool: SqlitePool, mailer: Arc<dyn MailTransport>) -> Self {
        Self { pool, mailer }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.pool.clone(), Arc::clone(&state.mailer))
    }

    /// Variable names used by a template, in order of first appearance.
    pub async fn variables(&self, template_id: DbId) -> AppResult<Vec<String>> {
        let template = self.load(template_id).await?;
        Ok(extract_variables(&template.html))
    }

    /// Render a template with (possibly partial) values.
    pub async fn preview(&self, template_id: DbId, values: &VariableValues) -> AppResult<Preview> {
        let template = self.load(template_id).await?;
        Ok(Preview {
            html: substitute(&template.html, values),
            original_variables: extract_variables(&template.html),
        })
    }

    /// Render and deliver a template to one recipient.
    pub async fn send(&self, template_id: DbId, request: SendRequest) -> AppResult<DeliveryReceipt> {
        // 1. Validate required fields.
        let to = required(request.to.as_deref(), "Recipient (to) is required")?;
        let subject = required(request.subject.as_deref(), "Subject is required")?;

        // 2. Fail fast without network I/O when credentials are unset.
        if !self.mailer.is_configured() {
            tracing::warn!(template_id, "Send attempted without mail credentials");
            return Err(AppError::Mail(MailError::NotConfigured));
        }

        // 3. Load template.
        let template = self.load(template_id).await?;

        // 4. Render.
        let html = substitute(&template.html, &request.values);

        // 5. Deliver.
        let receipt = self
            .mailer
            .send(OutgoingMessage {
                to: to.to_string(),
                subject: subject.to_string(),
                html,
            })
            .await
            .inspect_err(|e| {
                tracing::error!(template_id, to, error = %e, "Template send failed");
            })?;

        // 6. Mark as recently used. The mail is already out, so a failure
        // here must not turn the send into an error.
        if let Err(e) = TemplateRepo::touch_usage(&self.pool, template_id).await {
            tracing::warn!(template_id, error = %e, "Failed to record template usage");
        }

        tracing::info!(
            template_id,
            to,
            message_id = %receipt.message_id,
            "Template sent"
        );
        Ok(receipt)
    }

    async fn load(&self, template_id: DbId) -> AppResult<Template> {
        TemplateRepo::find_by_id(&self.pool, template_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Template",
                id: template_id,
            }))
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> AppResult<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}
