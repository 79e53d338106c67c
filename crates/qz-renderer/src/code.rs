//! Inline code spans and fenced code blocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::code_image::{CodeImageRenderer, IMAGE_MARKER, lexer_name};
use crate::emoticon::neutralize_emoticons;
use crate::error::RenderError;
use crate::escape::sanitize_entities;
use crate::image::image_tag;

static INLINE_CODE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"`([^`\n]+)`").expect("invalid inline code regex"));

// Opening fence, body, closing fence; each fence on its own line.
static FENCED_CODE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*```([^\n]*)\n((?s:.*?))^[ \t]*```[^\n]*$")
        .expect("invalid fenced code regex")
});

/// Replace `` `code` `` spans with sanitized `<code>` elements.
pub(crate) fn render_inline_code(text: &str) -> String {
    INLINE_CODE_PATTERN
        .replace_all(text, |caps: &Captures| {
            format!("<code>{}</code>", sanitize_code(&caps[1]))
        })
        .into_owned()
}

/// Replace fenced blocks with `<pre><code>` elements, or with images when the
/// language tag carries the image marker.
pub(crate) fn render_fenced_code<C: CodeImageRenderer + ?Sized>(
    text: &str,
    code_images: &mut C,
) -> Result<String, RenderError> {
    let mut result = String::with_capacity(text.len());
    let mut last = 0;
    for caps in FENCED_CODE_PATTERN.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let code = caps.get(2).map_or("", |m| m.as_str());

        result.push_str(&text[last..whole.start()]);
        if tag.contains(IMAGE_MARKER) {
            let lexer = lexer_name(tag);
            tracing::debug!(lexer = %lexer, "Rendering fenced code as image");
            let bytes = code_images.render(&lexer, code)?;
            result.push_str(&image_tag("png", &bytes));
        } else {
            let code = code.strip_suffix('\n').unwrap_or(code);
            result.push_str("<pre><code>");
            result.push_str(&sanitize_code(code));
            result.push_str("</code></pre>");
        }
        last = whole.end();
    }
    result.push_str(&text[last..]);
    Ok(result)
}

/// Sanitized code text. Emoticons are neutralized first: once their
/// parentheses are entities the later emoticon pass no longer sees them.
fn sanitize_code(code: &str) -> String {
    sanitize_entities(&neutralize_emoticons(code))
}
