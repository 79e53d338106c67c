//! `$...$` and `$$...$$` math, rewritten to MathJax delimiters.
//!
//! The text still goes through the markdown renderer afterwards. Delimiters
//! carry doubled backslashes, which markdown reduces to one, and math bodies
//! are entity-escaped so markdown leaves them alone.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::escape::escape_math;

static DISPLAY_MATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$((?s:.+?))\$\$").expect("invalid display math regex"));

// An escaped `\$` is consumed on its own so it never opens a span.
static INLINE_MATH_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\\$|\$([^$\n]+)\$").expect("invalid inline math regex"));

/// Replace `$$...$$` blocks with `\\[...\\]`.
pub(crate) fn render_display_math(text: &str) -> String {
    DISPLAY_MATH_PATTERN
        .replace_all(text, |caps: &Captures| {
            format!(r"\\[{}\\]", escape_math(caps[1].trim()))
        })
        .into_owned()
}

/// Replace `$...$` spans with `\\(...\\)`. An escaped `\$` is left alone.
pub(crate) fn render_inline_math(text: &str) -> String {
    INLINE_MATH_PATTERN
        .replace_all(text, |caps: &Captures| match caps.get(1) {
            Some(body) => format!(r"\\({}\\)", escape_math(&scale_parentheses(body.as_str()))),
            None => caps[0].to_owned(),
        })
        .into_owned()
}

/// Rewrite unescaped `(` and `)` to `\left(` and `\right)`.
fn scale_parentheses(math: &str) -> String {
    let mut result = String::with_capacity(math.len() + 8);
    let mut escaped = false;
    for c in math.chars() {
        match c {
            '(' if !escaped => result.push_str(r"\left("),
            ')' if !escaped => result.push_str(r"\right)"),
            _ => result.push(c),
        }
        escaped = c == '\\' && !escaped;
    }
    result
}
