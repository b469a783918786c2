//! Route definitions for the `/tags` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::tags;
use crate::state::AppState;

/// Routes mounted at `/tags`.
///
/// ```text
/// GET    /          -> list_tags (?category_id=)
/// POST   /          -> create_tag
/// PUT    /reorder   -> reorder_tags
/// GET    /{id}      -> get_tag
/// PUT    /{id}      -> update_tag
/// DELETE /{id}      -> delete_tag
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(tags::list_tags).post(tags::create_tag))
        .route("/reorder", put(tags::reorder_tags))
        .route(
            "/{id}",
            get(tags::get_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        )
}
