//! Entity escaping for literal text spliced into markdown.

/// Escape HTML special characters.
#[must_use]
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape code so that no later pass, nor the markdown renderer, reinterprets it.
///
/// HTML specials become named entities; characters meaningful to markdown,
/// math, image or emoticon syntax become numeric character references.
#[must_use]
pub fn sanitize_entities(code: &str) -> String {
    escape_with(code, |c| {
        matches!(
            c,
            '*' | '_' | '`' | '\\' | '[' | ']' | '(' | ')' | '$' | '#' | '~' | '|' | '!'
        )
    })
}

/// Escape a math body for the markdown pass.
///
/// Like [`sanitize_entities`], but parentheses stay literal: they carry no
/// markdown meaning outside links, and `\left(` must stay readable.
#[must_use]
pub fn escape_math(math: &str) -> String {
    escape_with(math, |c| {
        matches!(
            c,
            '*' | '_' | '`' | '\\' | '[' | ']' | '$' | '#' | '~' | '|' | '!'
        )
    })
}

fn escape_with(text: &str, numeric: impl Fn(char) -> bool) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            c if numeric(c) => {
                result.push_str("&#");
                result.push_str(&u32::from(c).to_string());
                result.push(';');
            }
            _ => result.push(c),
        }
    }
    result
}
