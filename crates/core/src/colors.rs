//! Dynamic stylesheet with one set of color classes per category and tag.
//!
//! Colors come from user input, so only strict `#rrggbb` values are emitted;
//! anything else is replaced by a neutral fallback before it reaches the CSS.

use std::fmt::Write;

use crate::types::DbId;

/// Fallback for categories without a usable color and for the "none" bucket.
pub const CATEGORY_FALLBACK_COLOR: &str = "#6b7280";

/// Fallback for tags without a usable color.
pub const TAG_FALLBACK_COLOR: &str = "#3B82F6";

/// Color source for a category.
#[derive(Debug, Clone)]
pub struct CategorySwatch {
    pub id: DbId,
    pub color: Option<String>,
}

/// Color source for a tag.
#[derive(Debug, Clone)]
pub struct TagSwatch {
    pub id: DbId,
    pub color: Option<String>,
    pub category_id: Option<DbId>,
}

/// Return the color as `#rrggbb` if it is exactly six hex digits after `#`.
pub fn sanitize_css_color(color: &str) -> Option<String> {
    let hex = color.trim().strip_prefix('#')?;
    (hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit())).then(|| format!("#{hex}"))
}

fn pick(color: Option<&str>, fallback: &str) -> String {
    color
        .and_then(sanitize_css_color)
        .unwrap_or_else(|| fallback.to_string())
}

/// Render the stylesheet served at `/colors.css`.
pub fn render_color_stylesheet(categories: &[CategorySwatch], tags: &[TagSwatch]) -> String {
    let none = CATEGORY_FALLBACK_COLOR;
    let mut css = String::from("/* dynamic colors */\n");

    // Writing into a String cannot fail.
    let _ = writeln!(css, ".cat-border-none{{border-top:3px solid {none} !important;}}");
    let _ = writeln!(
        css,
        ".category-border-none{{background:linear-gradient(180deg,{none},{none}ee);}}"
    );
    let _ = writeln!(css, ".cat-badge-none{{background-color:{none};color:#fff;}}");
    let _ = writeln!(css, ".cat-filter-chip-none{{background-color:{none}20;color:{none};}}");

    for cat in categories {
        let id = cat.id;
        let color = pick(cat.color.as_deref(), CATEGORY_FALLBACK_COLOR);
        let _ = writeln!(css, ".cat-border-{id}{{border-top:3px solid {color} !important;}}");
        let _ = writeln!(
            css,
            ".category-border-{id}{{background:linear-gradient(180deg, {color}, {color}ee);}}"
        );
        let _ = writeln!(css, ".cat-badge-{id}{{background-color:{color};color:#fff;}}");
        let _ = writeln!(css, ".cat-swatch-{id}{{background-color:{color};}}");
        let _ = writeln!(
            css,
            ".cat-filter-chip-{id}{{background-color:{color}20;color:{color};}}"
        );
    }

    for tag in tags {
        let id = tag.id;
        let color = pick(tag.color.as_deref(), TAG_FALLBACK_COLOR);
        let _ = writeln!(css, ".tag-chip-{id}{{background-color:{color};color:#fff;}}");
        let _ = writeln!(
            css,
            ".tag-chip-outline-{id}{{background-color:{color}20;color:{color};}}"
        );
        let _ = writeln!(css, ".tag-swatch-{id}{{background-color:{color};}}");
        if let Some(category_id) = tag.category_id {
            let _ = writeln!(
                css,
                ".tag-cat-filter-{category_id}{{background-color:{color}20;color:{color};}}"
            );
        }
    }

    css
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_six_digit_hex_passes() {
        assert_eq!(sanitize_css_color(" #A1b2C3 "), Some("#A1b2C3".into()));
        assert_eq!(sanitize_css_color("#fff"), None);
        assert_eq!(sanitize_css_color("#abcdef;}body{"), None);
        assert_eq!(sanitize_css_color("red"), None);
    }

    #[test]
    fn stylesheet_contains_entity_classes() {
        let css = render_color_stylesheet(
            &[CategorySwatch { id: 3, color: Some("#112233".into()) }],
            &[TagSwatch { id: 7, color: Some("#445566".into()), category_id: Some(3) }],
        );
        assert!(css.contains(".cat-badge-3{background-color:#112233;color:#fff;}"));
        assert!(css.contains(".tag-chip-7{background-color:#445566;color:#fff;}"));
        assert!(css.contains(".tag-cat-filter-3{background-color:#44556620;color:#445566;}"));
        assert!(css.contains(".cat-border-none"));
    }

    #[test]
    fn invalid_colors_fall_back() {
        let css = render_color_stylesheet(
            &[CategorySwatch { id: 1, color: Some("url(x)".into()) }],
            &[TagSwatch { id: 2, color: None, category_id: None }],
        );
        assert!(css.contains(".cat-swatch-1{background-color:#6b7280;}"));
        assert!(css.contains(".tag-swatch-2{background-color:#3B82F6;}"));
        assert!(!css.contains("url(x)"));
        assert!(!css.contains("tag-cat-filter"));
    }
}
