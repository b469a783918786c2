pub mod assets;
pub mod auth;
pub mod categories;
pub mod health;
pub mod tags;
pub mod templates;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /login                                   login (public)
/// /verify                                  verify current token
///
/// /users                                   list, create (admin only)
/// /users/{id}                              get, update, delete (admin only)
///
/// /templates                               list (?category=&tags=), create
/// /templates/assign-category               bulk category set (POST)
/// /templates/bulk-delete                   bulk delete (POST)
/// /templates/{id}                          get, update, delete
/// /templates/{id}/tags                     get, replace
/// /templates/{id}/variables                extract placeholders (GET)
/// /templates/{id}/preview                  render with values (POST)
/// /templates/{id}/send                     dispatch email (POST)
///
/// /categories                              list, create
/// /categories/stats                        template counts per category
/// /categories/reorder                      bulk order (PUT)
/// /categories/{id}                         get, update, delete
///
/// /tags                                    list (?category_id=), create
/// /tags/reorder                            bulk order within a category (PUT)
/// /tags/{id}                               get, update, delete
///
/// /stats                                   library-wide template statistics
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication (login, verify).
        .merge(auth::router())
        // User management.
        .nest("/users", users::router())
        // Templates, tag membership and sending.
        .nest("/templates", templates::router())
        // Categories.
        .nest("/categories", categories::router())
        // Tags.
        .nest("/tags", tags::router())
        // Statistics.
        .route("/stats", get(handlers::stats::get_stats))
}
