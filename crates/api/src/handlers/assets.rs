//! Dynamically generated public assets.

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use stencil_core::colors::{render_color_stylesheet, CategorySwatch, TagSwatch};
use stencil_db::repositories::{CategoryRepo, TagRepo};

use crate::error::AppResult;
use crate::state::AppState;

/// GET /colors.css
///
/// Color classes for every category and tag, regenerated on each request so
/// edits show up without a rebuild.
pub async fn colors_css(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let categories: Vec<CategorySwatch> = CategoryRepo::list(&state.pool)
        .await?
        .into_iter()
        .map(|c| CategorySwatch {
            id: c.id,
            color: Some(c.color),
        })
        .collect();

    let tags: Vec<TagSwatch> = TagRepo::list(&state.pool, None)
        .await?
        .into_iter()
        .map(|t| TagSwatch {
            id: t.id,
            color: Some(t.color),
            category_id: Some(t.category_id),
        })
        .collect();

    let css = render_color_stylesheet(&categories, &tags);

    Ok((
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        css,
    ))
}
