//! Keeps emoticon glyphs from being turned into images by Moodle's filter.

use std::sync::LazyLock;

use regex::Regex;

/// Marker inserted before the last character of an emoticon.
pub const ZERO_WIDTH_SPACE: char = '\u{200B}';

const EMOTICONS: [&str; 10] = [
    ":-)", ":)", ":-(", ":(", ";-)", ";)", ":-D", ":D", "(y)", "(n)",
];

// Group 1 is an existing marker, group 2 the final glyph character.
static EMOTICON_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    EMOTICONS
        .iter()
        .map(|glyph| {
            let (head, last) = glyph.split_at(glyph.len() - 1);
            let pattern = format!(
                "{}({})?({})",
                regex::escape(head),
                ZERO_WIDTH_SPACE,
                regex::escape(last)
            );
            Regex::new(&pattern).expect("invalid emoticon regex")
        })
        .collect()
});

/// Insert [`ZERO_WIDTH_SPACE`] before the last character of every emoticon.
///
/// Emoticons already carrying the marker are left alone, so the operation is
/// idempotent.
#[must_use]
pub fn neutralize_emoticons(text: &str) -> String {
    let mut result = text.to_owned();
    for pattern in EMOTICON_PATTERNS.iter() {
        let positions: Vec<usize> = pattern
            .captures_iter(&result)
            .filter(|caps| caps.get(1).is_none())
            .filter_map(|caps| caps.get(2).map(|m| m.start()))
            .collect();

        // Each insertion shifts later positions by one marker.
        for (inserted, position) in positions.into_iter().enumerate() {
            result.insert(position + inserted * ZERO_WIDTH_SPACE.len_utf8(), ZERO_WIDTH_SPACE);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_smile() {
        assert_eq!(neutralize_emoticons("hi :)"), "hi :\u{200B})");
        assert_eq!(neutralize_emoticons(":-)"), ":-\u{200B})");
    }

    #[test]
    fn test_thumbs() {
        assert_eq!(neutralize_emoticons("(y) or (n)"), "(y\u{200B}) or (n\u{200B})");
    }

    #[test]
    fn test_multiple_matches() {
        assert_eq!(
            neutralize_emoticons(":) :( ;) :D"),
            ":\u{200B}) :\u{200B}( ;\u{200B}) :\u{200B}D"
        );
    }

    #[test]
    fn test_adjacent_matches() {
        assert_eq!(neutralize_emoticons(":):)"), ":\u{200B}):\u{200B})");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(neutralize_emoticons("f(x) = 2; a: b"), "f(x) = 2; a: b");
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "",
            "no glyphs",
            ":)",
            ":-):-(;-):D",
            ":):):)",
            "(y)(n)(y)",
            ":\u{200B}) and :)",
            "x:-D;)y :((",
        ];
        for input in inputs {
            let once = neutralize_emoticons(input);
            let twice = neutralize_emoticons(&once);
            assert_eq!(once, twice, "not idempotent for {input:?}");
        }
    }

    #[test]
    fn test_existing_marker_not_doubled() {
        assert_eq!(neutralize_emoticons(":\u{200B})"), ":\u{200B})");
    }
}
