//! Public, dynamically generated assets mounted at the root.

use axum::routing::get;
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// ```text
/// GET /colors.css  -> colors_css (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/colors.css", get(assets::colors_css))
}
