//! Line grammar of quiz documents.
//!
//! Every input line maps to exactly one [`LineClass`]. Patterns are tested in a
//! fixed order and [`LineClass::Other`] is the fallback, so classification is
//! total and the classes are mutually exclusive.

use std::sync::LazyLock;

use regex::Regex;

static HEADER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*# (.*)$").expect("invalid header regex"));

static DELIMITER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-{3,}\s*$").expect("invalid delimiter regex"));

static CODE_FENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```.*$").expect("invalid code fence regex"));

// Must be tested before WRONG_ANSWER_PATTERN, which it refines.
static CORRECT_ANSWER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s!(.*)$").expect("invalid correct answer regex"));

static WRONG_ANSWER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-\s(.*)$").expect("invalid wrong answer regex"));

static FEEDBACK_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*>\s?(.*)$").expect("invalid feedback regex"));

/// One line fed to the parser.
///
/// The parser appends a single [`SourceLine::EndOfInput`] after the last real
/// line so end-of-document handling goes through the same transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLine<'a> {
    /// A real input line, stripped of its trailing CR/LF.
    Text(&'a str),
    /// Sentinel following the last real line.
    EndOfInput,
}

impl<'a> SourceLine<'a> {
    /// Raw line text (empty for the sentinel).
    #[must_use]
    pub fn text(&self) -> &'a str {
        match self {
            Self::Text(text) => text,
            Self::EndOfInput => "",
        }
    }

    /// Classify this line.
    #[must_use]
    pub fn classify(&self) -> LineClass<'a> {
        match self {
            Self::Text(text) => classify(text),
            Self::EndOfInput => LineClass::EndOfInput,
        }
    }
}

/// Grammatical class of a single line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// Empty or whitespace-only line.
    Blank,
    /// `# caption`
    Header(&'a str),
    /// Three or more dashes.
    QuestionDelimiter,
    /// `- !text`
    CorrectAnswer(&'a str),
    /// `- text`
    WrongAnswer(&'a str),
    /// `> text`
    Feedback(&'a str),
    /// Triple backtick with optional language tag.
    CodeFenceToggle,
    /// End-of-input sentinel.
    EndOfInput,
    /// Anything else: prose appended to the open question.
    Other(&'a str),
}

impl LineClass<'_> {
    /// Whether this is either kind of answer line.
    #[must_use]
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::CorrectAnswer(_) | Self::WrongAnswer(_))
    }

    /// Short name used in diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Blank => "blank line",
            Self::Header(_) => "header",
            Self::QuestionDelimiter => "question delimiter",
            Self::CorrectAnswer(_) => "correct answer",
            Self::WrongAnswer(_) => "wrong answer",
            Self::Feedback(_) => "feedback",
            Self::CodeFenceToggle => "code fence",
            Self::EndOfInput => "end of input",
            Self::Other(_) => "text",
        }
    }
}

/// Classify one line of input (without its line terminator).
#[must_use]
pub fn classify(line: &str) -> LineClass<'_> {
    if is_blank(line) {
        return LineClass::Blank;
    }
    if CODE_FENCE_PATTERN.is_match(line) {
        return LineClass::CodeFenceToggle;
    }
    if let Some(caps) = HEADER_PATTERN.captures(line) {
        return LineClass::Header(capture(&caps, line).trim());
    }
    if DELIMITER_PATTERN.is_match(line) {
        return LineClass::QuestionDelimiter;
    }
    if let Some(caps) = CORRECT_ANSWER_PATTERN.captures(line) {
        return LineClass::CorrectAnswer(capture(&caps, line).trim());
    }
    if let Some(caps) = WRONG_ANSWER_PATTERN.captures(line) {
        return LineClass::WrongAnswer(capture(&caps, line).trim());
    }
    if let Some(caps) = FEEDBACK_PATTERN.captures(line) {
        return LineClass::Feedback(capture(&caps, line).trim_end());
    }
    LineClass::Other(line)
}

/// Whether the line contains only whitespace.
#[must_use]
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// First capture group, borrowed from the input line.
fn capture<'a>(caps: &regex::Captures<'a>, line: &'a str) -> &'a str {
    caps.get(1).map_or(line, |m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines() {
        assert_eq!(classify(""), LineClass::Blank);
        assert_eq!(classify("   \t "), LineClass::Blank);
    }

    #[test]
    fn test_header() {
        assert_eq!(classify("# Math"), LineClass::Header("Math"));
        assert_eq!(classify("  # Math / Algebra  "), LineClass::Header("Math / Algebra"));
    }

    #[test]
    fn test_header_requires_space() {
        assert_eq!(classify("#Math"), LineClass::Other("#Math"));
        assert_eq!(classify("## Sub"), LineClass::Other("## Sub"));
    }

    #[test]
    fn test_question_delimiter() {
        assert_eq!(classify("---"), LineClass::QuestionDelimiter);
        assert_eq!(classify("----------"), LineClass::QuestionDelimiter);
        assert_eq!(classify("---   "), LineClass::QuestionDelimiter);
    }

    #[test]
    fn test_two_dashes_is_not_delimiter() {
        assert_eq!(classify("--"), LineClass::Other("--"));
        assert_eq!(classify("--- x"), LineClass::Other("--- x"));
    }

    #[test]
    fn test_correct_answer_wins_over_wrong_answer() {
        assert_eq!(classify("- !2"), LineClass::CorrectAnswer("2"));
        assert_eq!(classify("  - !  yes "), LineClass::CorrectAnswer("yes"));
    }

    #[test]
    fn test_wrong_answer() {
        assert_eq!(classify("- 3"), LineClass::WrongAnswer("3"));
        assert_eq!(classify("- a ! b"), LineClass::WrongAnswer("a ! b"));
        assert_eq!(classify("-  "), LineClass::WrongAnswer(""));
    }

    #[test]
    fn test_dash_without_space_is_text() {
        assert_eq!(classify("-3"), LineClass::Other("-3"));
    }

    #[test]
    fn test_feedback() {
        assert_eq!(classify("> well done"), LineClass::Feedback("well done"));
        assert_eq!(classify(">no space"), LineClass::Feedback("no space"));
    }

    #[test]
    fn test_code_fence() {
        assert_eq!(classify("```"), LineClass::CodeFenceToggle);
        assert_eq!(classify("```python"), LineClass::CodeFenceToggle);
        assert_eq!(classify("```python{img}"), LineClass::CodeFenceToggle);
    }

    #[test]
    fn test_other() {
        assert_eq!(classify("What is 1+1?"), LineClass::Other("What is 1+1?"));
        assert_eq!(classify("  indented"), LineClass::Other("  indented"));
    }

    #[test]
    fn test_classification_is_total_and_exclusive() {
        let lines = [
            "", " ", "# h", "---", "- !a", "- a", "> f", "```", "```rs", "text", "-", "#", "!",
            ">", "- ", "- !", "`", "--", "# ", "---- -",
        ];
        for line in lines {
            let class = classify(line);
            let again = classify(line);
            assert_eq!(class, again, "classification of {line:?} is not stable");
            if line.contains("- !") && !is_blank(line) {
                assert!(
                    matches!(class, LineClass::CorrectAnswer(_)),
                    "{line:?} classified as {class:?}"
                );
            }
        }
    }

    #[test]
    fn test_source_line_end_of_input() {
        assert_eq!(SourceLine::EndOfInput.classify(), LineClass::EndOfInput);
        assert_eq!(SourceLine::EndOfInput.text(), "");
        assert_eq!(SourceLine::Text("- !x").classify(), LineClass::CorrectAnswer("x"));
    }

    #[test]
    fn test_is_answer() {
        assert!(classify("- !a").is_answer());
        assert!(classify("- a").is_answer());
        assert!(!classify("> a").is_answer());
    }
}
