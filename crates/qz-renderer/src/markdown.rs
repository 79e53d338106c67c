//! Markdown to HTML via pulldown-cmark.

use pulldown_cmark::{Event, Options, Parser, html};

/// Parser options: GitHub-style tables and strikethrough.
#[must_use]
pub(crate) fn parser_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH
}

/// Render markdown to HTML, trailing whitespace removed.
///
/// With `hard_breaks`, every soft line break becomes `<br />`.
pub(crate) fn render_markdown(text: &str, hard_breaks: bool) -> String {
    let parser = Parser::new_ext(text, parser_options()).map(|event| match event {
        Event::SoftBreak if hard_breaks => Event::HardBreak,
        other => other,
    });

    let mut output = String::with_capacity(text.len() + text.len() / 2);
    html::push_html(&mut output, parser);
    output.truncate(output.trim_end().len());
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_paragraph() {
        assert_eq!(render_markdown("**bold** text", false), "<p><strong>bold</strong> text</p>");
    }

    #[test]
    fn test_soft_breaks() {
        assert_eq!(render_markdown("a\nb", false), "<p>a\nb</p>");
        assert_eq!(render_markdown("a\nb", true), "<p>a<br />\nb</p>");
    }

    #[test]
    fn test_entities_survive_as_text() {
        assert_eq!(
            render_markdown("<code>&#42;x&#42; &lt;</code>", false),
            "<p><code>*x* &lt;</code></p>"
        );
    }

    #[test]
    fn test_math_delimiters_lose_one_escape() {
        assert_eq!(render_markdown(r"\\(x\\)", false), r"<p>\(x\)</p>");
    }

    #[test]
    fn test_html_block_passes_through() {
        assert_eq!(
            render_markdown("<pre><code>a\n\nb</code></pre>", true),
            "<pre><code>a\n\nb</code></pre>"
        );
    }
}
