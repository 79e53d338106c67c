//! `[[[caption ... ]]]` table blocks.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::escape_html;
use crate::markdown::render_markdown;

static TABLE_BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[\[\[([^\n]*)\n((?s:.*?))\]\]\]").expect("invalid table block regex")
});

const BORDER_STYLE: &str = "<style>table, th, td { border: 1px solid black; \
                            border-collapse: collapse; padding: 0.25em; }</style>";

/// Render each table block's body as a markdown table.
///
/// The first line after `[[[` is the caption. With `border`, a style block
/// drawing cell borders precedes the table.
pub(crate) fn render_tables(text: &str, border: bool) -> String {
    TABLE_BLOCK_PATTERN
        .replace_all(text, |caps: &Captures| {
            let caption = caps[1].trim();
            let mut html = render_markdown(&caps[2], false);
            if !caption.is_empty() {
                let with_caption = format!("<table><caption>{}</caption>", escape_html(caption));
                html = html.replacen("<table>", &with_caption, 1);
            }
            let style = if border { BORDER_STYLE } else { "" };
            let separator = if border { "\n" } else { "" };
            format!("\n{style}{separator}{html}\n\n")
        })
        .into_owned()
}
