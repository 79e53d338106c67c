//! Quiz grammar state machine.
//!
//! [`transition`] is the whole grammar: one table from (state, line class) to
//! an [`Action`] on the document plus the next state. [`QuizParser`] registers
//! one handler per [`QuizState`] on a [`StateMachine`], each of which looks up
//! the table and applies the action.

use std::fmt;
use std::str::FromStr;

use crate::document::QuizDocument;
use crate::error::{BuildError, ParseError, TransitionError, ValidationError};
use crate::line::{LineClass, SourceLine};
use crate::machine::StateMachine;

const MISSING_CORRECT_ANSWER: &str = "expecting at least one correct answer in previous question";

/// Parser states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuizState {
    Start,
    InHeader,
    InQuestion,
    InQuestionCodeBlock,
    InAnswer,
    InFeedback,
    End,
}

impl QuizState {
    /// Every state, in registration order.
    pub const ALL: [Self; 7] = [
        Self::Start,
        Self::InHeader,
        Self::InQuestion,
        Self::InQuestionCodeBlock,
        Self::InAnswer,
        Self::InFeedback,
        Self::End,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::InHeader => "in_header",
            Self::InQuestion => "in_question",
            Self::InQuestionCodeBlock => "in_question_code_block",
            Self::InAnswer => "in_answer",
            Self::InFeedback => "in_feedback",
            Self::End => "end",
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::End
    }
}

impl fmt::Display for QuizState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown state name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown parser state: {0}")]
pub struct UnknownStateError(String);

impl FromStr for QuizState {
    type Err = UnknownStateError;

    /// Parse a state name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|state| state.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownStateError(s.to_owned()))
    }
}

/// Document mutation performed on a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Consume the line without touching the document.
    Skip,
    BeginSection,
    BeginQuestion,
    /// Start a question whose first body line is the current line.
    BeginQuestionWithText,
    /// Append the raw line to the question body.
    AppendText,
    AppendAnswer,
    AttachFeedback,
    /// Score the whole document.
    Validate,
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub action: Action,
    pub next: QuizState,
    /// The current question needs a correct answer before leaving it.
    pub guarded: bool,
}

impl Transition {
    const fn to(action: Action, next: QuizState) -> Self {
        Self {
            action,
            next,
            guarded: false,
        }
    }

    const fn guarded(action: Action, next: QuizState) -> Self {
        Self {
            action,
            next,
            guarded: true,
        }
    }
}

/// The quiz grammar.
///
/// Returns the transition for `class` in `state`, or the reason the line is
/// not acceptable there.
pub fn transition(state: QuizState, class: &LineClass<'_>) -> Result<Transition, &'static str> {
    use Action::{
        AppendAnswer, AppendText, AttachFeedback, BeginQuestion, BeginQuestionWithText,
        BeginSection, Skip, Validate,
    };
    use LineClass as L;
    use QuizState as S;

    match (state, class) {
        (S::Start, L::Blank) => Ok(Transition::to(Skip, S::Start)),
        (S::Start, L::Header(_)) => Ok(Transition::to(BeginSection, S::InHeader)),
        (S::Start, L::QuestionDelimiter) => Ok(Transition::to(BeginQuestion, S::InQuestion)),
        (S::Start, L::Other(_)) => Ok(Transition::to(BeginQuestionWithText, S::InQuestion)),
        (S::Start, _) => Err("expecting a header or a question"),

        (S::InHeader, L::Blank) => Ok(Transition::to(Skip, S::InHeader)),
        (S::InHeader, L::QuestionDelimiter) => Ok(Transition::to(BeginQuestion, S::InQuestion)),
        (S::InHeader, L::Other(_)) => Ok(Transition::to(BeginQuestionWithText, S::InQuestion)),
        (S::InHeader, _) => Err("expecting a question"),

        (S::InQuestion, L::Blank | L::Other(_)) => Ok(Transition::to(AppendText, S::InQuestion)),
        (S::InQuestion, L::CorrectAnswer(_) | L::WrongAnswer(_)) => {
            Ok(Transition::to(AppendAnswer, S::InAnswer))
        }
        (S::InQuestion, L::CodeFenceToggle) => {
            Ok(Transition::to(AppendText, S::InQuestionCodeBlock))
        }
        (S::InQuestion, _) => Err("expecting text, code block or answer"),

        (S::InQuestionCodeBlock, L::CodeFenceToggle) => {
            Ok(Transition::to(AppendText, S::InQuestion))
        }
        (S::InQuestionCodeBlock, L::EndOfInput) => Err("expecting closing code block"),
        (S::InQuestionCodeBlock, _) => Ok(Transition::to(AppendText, S::InQuestionCodeBlock)),

        (S::InAnswer | S::InFeedback, L::Header(_)) => {
            Ok(Transition::guarded(BeginSection, S::InHeader))
        }
        (S::InAnswer | S::InFeedback, L::QuestionDelimiter) => {
            Ok(Transition::guarded(BeginQuestion, S::InQuestion))
        }
        (S::InAnswer | S::InFeedback, L::CorrectAnswer(_) | L::WrongAnswer(_)) => {
            Ok(Transition::to(AppendAnswer, S::InAnswer))
        }
        // Validation reports the offending question itself.
        (S::InAnswer | S::InFeedback, L::EndOfInput) => Ok(Transition::to(Validate, S::End)),

        (S::InAnswer, L::Blank) => Ok(Transition::to(Skip, S::InAnswer)),
        (S::InAnswer, L::Feedback(_)) => Ok(Transition::to(AttachFeedback, S::InFeedback)),
        (S::InAnswer, _) => Err("expecting answer, feedback, question or header"),

        (S::InFeedback, L::Blank) => Ok(Transition::to(Skip, S::InFeedback)),
        (S::InFeedback, _) => Err("expecting answer, question or header"),

        (S::End, _) => Err("no input accepted after end of document"),
    }
}

/// Markdown quiz parser.
///
/// # Example
///
/// ```
/// use qz_core::QuizParser;
///
/// let doc = QuizParser::new()
///     .parse("# Math\n---\nWhat is 1+1?\n- !2\n- 3\n")
///     .unwrap();
///
/// let section = doc.section("Math").unwrap();
/// assert_eq!(section.questions()[0].text(), "What is 1+1?");
/// assert!(doc.is_valid());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct QuizParser {
    penalty: f64,
}

impl QuizParser {
    /// Create a parser with no single-answer penalty.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the single-answer penalty fraction used when scoring.
    #[must_use]
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Parse and validate a whole document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`]; no partial document is returned.
    pub fn parse(&self, text: &str) -> Result<QuizDocument, ParseError> {
        let mut machine = self.machine();
        machine.start(QuizState::Start);

        let mut document = QuizDocument::new();
        let lines = text
            .split('\n')
            .map(|line| SourceLine::Text(line.strip_suffix('\r').unwrap_or(line)))
            .chain(std::iter::once(SourceLine::EndOfInput));

        let mut last_line = 0;
        for (index, line) in lines.enumerate() {
            last_line = index + 1;
            machine.step(&mut document, &line, last_line)?;
        }

        if !machine.is_finished() {
            return Err(TransitionError::new(last_line, "unexpected end of input").into());
        }
        Ok(document)
    }

    fn machine<'a>(&self) -> StateMachine<QuizState, QuizDocument, SourceLine<'a>> {
        let mut machine: StateMachine<QuizState, QuizDocument, SourceLine<'a>> =
            StateMachine::new();
        for state in QuizState::ALL {
            let penalty = self.penalty;
            machine.register(
                state,
                move |doc, line, number| advance(state, doc, line, number, penalty),
                state.is_terminal(),
            );
        }
        machine
    }
}

/// Parse a document with the given single-answer penalty.
///
/// # Errors
///
/// See [`QuizParser::parse`].
pub fn parse_quiz(text: &str, penalty: f64) -> Result<QuizDocument, ParseError> {
    QuizParser::new().with_penalty(penalty).parse(text)
}

/// Handle one line in `state`: look up the table, check the guard, apply the action.
fn advance(
    state: QuizState,
    doc: &mut QuizDocument,
    line: &SourceLine<'_>,
    number: usize,
    penalty: f64,
) -> Result<QuizState, ParseError> {
    let class = line.classify();
    let step = transition(state, &class).map_err(|reason| {
        TransitionError::new(number, format!("{reason}, found {}", class.describe()))
    })?;

    if step.guarded && !doc.current_question_has_correct_answer() {
        return Err(TransitionError::new(number, MISSING_CORRECT_ANSWER).into());
    }

    apply(step.action, doc, line, &class, penalty).map_err(|e| match e {
        Applied::Build(e) => ParseError::from(TransitionError::new(number, e.to_string())),
        Applied::Validation(source) => ParseError::Validation {
            line: number,
            source,
        },
    })?;
    Ok(step.next)
}

enum Applied {
    Build(BuildError),
    Validation(ValidationError),
}

impl From<BuildError> for Applied {
    fn from(e: BuildError) -> Self {
        Self::Build(e)
    }
}

fn apply(
    action: Action,
    doc: &mut QuizDocument,
    line: &SourceLine<'_>,
    class: &LineClass<'_>,
    penalty: f64,
) -> Result<(), Applied> {
    match (action, class) {
        (Action::Skip, _) => {}
        (Action::BeginSection, LineClass::Header(caption)) => doc.begin_section(caption)?,
        (Action::BeginQuestion, _) => doc.begin_question()?,
        (Action::BeginQuestionWithText, _) => {
            doc.begin_question()?;
            doc.append_question_text(line.text())?;
        }
        (Action::AppendText, _) => doc.append_question_text(line.text())?,
        (Action::AppendAnswer, LineClass::CorrectAnswer(text)) => doc.append_answer(text, true)?,
        (Action::AppendAnswer, LineClass::WrongAnswer(text)) => doc.append_answer(text, false)?,
        (Action::AttachFeedback, LineClass::Feedback(text)) => doc.attach_feedback(text)?,
        (Action::Validate, _) => doc.validate(penalty).map_err(Applied::Validation)?,
        (Action::BeginSection | Action::AppendAnswer | Action::AttachFeedback, _) => {
            unreachable!("transition table pairs {action:?} with {class:?}")
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<QuizDocument, ParseError> {
        QuizParser::new().parse(text)
    }

    fn transition_error(result: Result<QuizDocument, ParseError>) -> TransitionError {
        match result {
            Err(ParseError::Transition(e)) => e,
            other => panic!("expected transition error, got {other:?}"),
        }
    }

    #[test]
    fn test_basic_document() {
        let doc = parse("# Math\n---\nWhat is 1+1?\n- !2\n- 3\n").unwrap();
        assert!(doc.is_valid());
        assert_eq!(doc.section_count(), 1);

        let section = doc.section("Math").unwrap();
        assert_eq!(section.questions().len(), 1);
        let question = &section.questions()[0];
        assert_eq!(question.text(), "What is 1+1?");
        assert_eq!(question.correct_count(), 1);
        assert!(question.is_single_correct());

        let answers = question.answers();
        assert_eq!(answers[0].text(), "2");
        assert!(answers[0].is_correct());
        assert_eq!(answers[0].weight(), Some(100.0));
        assert_eq!(answers[1].text(), "3");
        assert_eq!(answers[1].weight(), Some(0.0));
    }

    #[test]
    fn test_penalty_applies_to_wrong_answers() {
        let doc = parse_quiz("# Math\n---\nWhat is 1+1?\n- !2\n- 3\n", 0.25).unwrap();
        let answers = doc.section("Math").unwrap().questions()[0].answers();
        assert_eq!(answers[1].weight(), Some(-25.0));
    }

    #[test]
    fn test_multiple_sections_and_questions_keep_order() {
        let text = "\
# First
---
Q1
- !a
---
Q2
- b
- !c

# Second
---
Q3
- !d
";
        let doc = parse(text).unwrap();
        let captions: Vec<&str> = doc.sections().map(|s| s.caption()).collect();
        assert_eq!(captions, vec!["First", "Second"]);

        let first = doc.section("First").unwrap();
        let texts: Vec<String> = first.questions().iter().map(|q| q.text()).collect();
        assert_eq!(texts, vec!["Q1", "Q2"]);
        let answers: Vec<&str> = first.questions()[1].answers().iter().map(|a| a.text()).collect();
        assert_eq!(answers, vec!["b", "c"]);
    }

    #[test]
    fn test_question_body_keeps_blank_lines() {
        let doc = parse("# S\n---\nline one\n\nline two\n- !a\n").unwrap();
        let question = &doc.section("S").unwrap().questions()[0];
        assert_eq!(question.text(), "line one\n\nline two");
    }

    #[test]
    fn test_header_followed_by_text_starts_question() {
        let doc = parse("# S\n\nImplicit question\n- !a\n").unwrap();
        let question = &doc.section("S").unwrap().questions()[0];
        assert_eq!(question.text(), "Implicit question");
    }

    #[test]
    fn test_question_before_header_goes_to_default_section() {
        let doc = parse("---\nQ\n- !a\n").unwrap();
        assert!(doc.section(crate::DEFAULT_SECTION).is_some());
    }

    #[test]
    fn test_code_block_suppresses_grammar() {
        let text = "# S\n---\nLook:\n```python\n# not a header\n---\n- !not an answer\n> nor feedback\n```\n- !ok\n";
        let doc = parse(text).unwrap();
        let question = &doc.section("S").unwrap().questions()[0];
        assert_eq!(
            question.text(),
            "Look:\n```python\n# not a header\n---\n- !not an answer\n> nor feedback\n```"
        );
        assert_eq!(question.answers().len(), 1);
    }

    #[test]
    fn test_unterminated_code_block() {
        let err = transition_error(parse("# S\n---\nQ\n```"));
        assert_eq!(err.line, 5);
        assert!(err.reason.contains("expecting closing code block"));
    }

    #[test]
    fn test_unterminated_code_block_with_content() {
        let err = transition_error(parse("# S\n---\n```\ncode\n- !a\n"));
        assert_eq!(err.line, 7);
    }

    #[test]
    fn test_missing_correct_answer_before_next_question() {
        let err = transition_error(parse("# S\n---\nQ1\n- a\n---\nQ2\n- !b\n"));
        assert_eq!(err.line, 5);
        assert_eq!(err.reason, MISSING_CORRECT_ANSWER);
    }

    #[test]
    fn test_missing_correct_answer_before_header() {
        let err = transition_error(parse("# S\n---\nQ1\n- a\n> f\n# T\n"));
        assert_eq!(err.line, 6);
        assert_eq!(err.reason, MISSING_CORRECT_ANSWER);
    }

    #[test]
    fn test_missing_correct_answer_at_end_is_validation_error() {
        let err = parse("# S\n---\nWhich one?\n- a\n- b\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::Validation {
                line: 7,
                source: ValidationError {
                    question: "Which one?".to_owned(),
                },
            }
        );
    }

    #[test]
    fn test_feedback_attaches_to_preceding_answer() {
        let doc = parse("# S\n---\nQ\n- !a\n> about a\n- b\n- c\n> about c\n").unwrap();
        let answers = doc.section("S").unwrap().questions()[0].answers();
        assert_eq!(answers[0].feedback(), Some("about a"));
        assert_eq!(answers[1].feedback(), None);
        assert_eq!(answers[2].feedback(), Some("about c"));
    }

    #[test]
    fn test_second_feedback_line_is_error() {
        let err = transition_error(parse("# S\n---\nQ\n- !a\n> one\n> two\n"));
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_question_without_answers_at_end() {
        let err = transition_error(parse("# S\n---\nQ\n"));
        assert_eq!(err.line, 5);
        assert!(err.reason.contains("expecting text, code block or answer"));
    }

    #[test]
    fn test_text_after_answers_is_error() {
        let err = transition_error(parse("# S\n---\nQ\n- !a\nstray text\n"));
        assert_eq!(err.line, 5);
        assert!(err.reason.contains("found text"));
    }

    #[test]
    fn test_answer_directly_after_header_is_error() {
        let err = transition_error(parse("# S\n- !a\n"));
        assert_eq!(err.line, 2);
        assert!(err.reason.starts_with("expecting a question"));
    }

    #[test]
    fn test_header_in_question_body_is_error() {
        let err = transition_error(parse("# S\n---\nQ\n# T\n"));
        assert_eq!(err.line, 4);
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = transition_error(parse(""));
        assert_eq!(err.line, 2);
        assert!(err.reason.starts_with("expecting a header or a question"));
    }

    #[test]
    fn test_header_only_is_error() {
        let err = transition_error(parse("# S\n"));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_crlf_line_endings() {
        let doc = parse("# S\r\n---\r\nQ\r\n- !a\r\n- b\r\n").unwrap();
        let question = &doc.section("S").unwrap().questions()[0];
        assert_eq!(question.text(), "Q");
        assert_eq!(question.answers()[1].text(), "b");
    }

    #[test]
    fn test_state_names_case_insensitive() {
        assert_eq!("IN_ANSWER".parse::<QuizState>().unwrap(), QuizState::InAnswer);
        assert_eq!("End".parse::<QuizState>().unwrap(), QuizState::End);
        assert!("nowhere".parse::<QuizState>().is_err());
    }

    #[test]
    fn test_end_state_accepts_nothing() {
        for class in [LineClass::Blank, LineClass::EndOfInput, LineClass::Other("x")] {
            assert!(transition(QuizState::End, &class).is_err());
        }
    }

    #[test]
    fn test_transition_table_is_total() {
        let classes = [
            LineClass::Blank,
            LineClass::Header("h"),
            LineClass::QuestionDelimiter,
            LineClass::CorrectAnswer("a"),
            LineClass::WrongAnswer("a"),
            LineClass::Feedback("f"),
            LineClass::CodeFenceToggle,
            LineClass::EndOfInput,
            LineClass::Other("t"),
        ];
        let mut accepted = 0;
        for state in QuizState::ALL {
            for class in &classes {
                if let Ok(step) = transition(state, class) {
                    accepted += 1;
                    if step.guarded {
                        assert!(matches!(state, QuizState::InAnswer | QuizState::InFeedback));
                    }
                }
            }
        }
        assert_eq!(accepted, 33);
    }

    #[test]
    fn test_code_block_swallows_everything_but_fence_and_end() {
        let classes = [
            LineClass::Blank,
            LineClass::Header("h"),
            LineClass::QuestionDelimiter,
            LineClass::CorrectAnswer("a"),
            LineClass::WrongAnswer("a"),
            LineClass::Feedback("f"),
            LineClass::Other("t"),
        ];
        for class in &classes {
            assert_eq!(
                transition(QuizState::InQuestionCodeBlock, class),
                Ok(Transition::to(Action::AppendText, QuizState::InQuestionCodeBlock))
            );
        }
    }
}
