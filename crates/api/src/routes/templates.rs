//! Route definitions for the `/templates` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{sending, templates};
use crate::state::AppState;

/// Routes mounted at `/templates`.
///
/// ```text
/// GET    /                  -> list_templates (?category=&tags=)
/// POST   /                  -> create_template
/// POST   /assign-category   -> assign_category
/// POST   /bulk-delete       -> bulk_delete
/// GET    /{id}              -> get_template
/// PUT    /{id}              -> update_template
/// DELETE /{id}              -> delete_template
/// GET    /{id}/tags         -> get_template_tags
/// POST   /{id}/tags         -> set_template_tags
/// GET    /{id}/variables    -> get_variables
/// POST   /{id}/preview      -> preview_template
/// POST   /{id}/send         -> send_template
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(templates::list_templates).post(templates::create_template),
        )
        .route("/assign-category", post(templates::assign_category))
        .route("/bulk-delete", post(templates::bulk_delete))
        .route(
            "/{id}",
            get(templates::get_template)
                .put(templates::update_template)
                .delete(templates::delete_template),
        )
        .route(
            "/{id}/tags",
            get(templates::get_template_tags).post(templates::set_template_tags),
        )
        .route("/{id}/variables", get(sending::get_variables))
        .route("/{id}/preview", post(sending::preview_template))
        .route("/{id}/send", post(sending::send_template))
}
