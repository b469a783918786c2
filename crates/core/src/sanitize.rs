//! Allow-list HTML sanitization for template bodies.
//!
//! Only the tags and attributes below survive; everything else is stripped
//! (the text content of stripped elements is kept, except for `script` and
//! `style` whose content is dropped entirely). Placeholder tokens are plain
//! text and pass through untouched.

use std::collections::HashSet;
use std::sync::LazyLock;

use ammonia::{Builder, UrlRelative};

/// Elements allowed in a stored template.
pub const ALLOWED_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "br", "strong", "em", "u", "a", "ul", "ol", "li",
    "table", "thead", "tbody", "tfoot", "center", "tr", "td", "th", "div", "span", "img",
    "blockquote", "pre", "code", "hr", "button", "label", "input", "select", "option",
    "textarea", "form",
];

/// Attributes allowed on any allowed element.
pub const ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "src", "alt", "class", "id", "style", "target", "rel", "width", "height", "colspan",
    "rowspan", "type", "name", "value", "placeholder", "required", "disabled", "readonly",
    "checked", "align", "valign", "bgcolor", "cellpadding", "cellspacing", "border",
];

/// URL schemes accepted in `href` / `src`.
const ALLOWED_URL_SCHEMES: &[&str] = &["http", "https", "mailto", "tel", "cid"];

/// Elements removed together with their content.
const STRIPPED_CONTENT_TAGS: &[&str] = &["script", "style"];

static SANITIZER: LazyLock<Builder<'static>> = LazyLock::new(|| {
    let mut builder = Builder::empty();
    builder
        .tags(ALLOWED_TAGS.iter().copied().collect::<HashSet<_>>())
        .clean_content_tags(STRIPPED_CONTENT_TAGS.iter().copied().collect::<HashSet<_>>())
        .generic_attributes(ALLOWED_ATTRIBUTES.iter().copied().collect::<HashSet<_>>())
        .url_schemes(ALLOWED_URL_SCHEMES.iter().copied().collect::<HashSet<_>>())
        .url_relative(UrlRelative::PassThrough)
        // `rel` is an allowed attribute, so the builder must not manage it.
        .link_rel(None)
        .strip_comments(true);
    builder
});

/// Sanitize an HTML body against the template allow-list.
pub fn sanitize_html(html: &str) -> String {
    SANITIZER.clean(html).to_string()
}
