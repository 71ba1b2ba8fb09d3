//! Plain-text excerpts from rendered HTML.

use ammonia::Builder as AmmoniaBuilder;
use once_cell::sync::Lazy;

static TAG_STRIPPER: Lazy<AmmoniaBuilder<'static>> = Lazy::new(|| {
    let mut builder = AmmoniaBuilder::empty();
    builder.add_clean_content_tags(&["script", "style"]);
    builder
});

/// Strip every tag from `html` when `raw` is set; otherwise return it as-is.
pub fn excerpt(html: &str, raw: bool) -> String {
    if html.is_empty() {
        return String::new();
    }
    if !raw {
        return html.to_string();
    }
    TAG_STRIPPER.clean(html).to_string()
}
