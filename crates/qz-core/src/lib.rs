//! Markdown quiz grammar, parser and scoring model.
//!
//! Quiz documents are plain text: `# caption` headers open sections, `---`
//! opens a question, `- !text` and `- text` list correct and wrong answers,
//! and `> text` attaches feedback to the preceding answer.
//!
//! # Architecture
//!
//! - [`classify`] maps each line to a [`LineClass`].
//! - [`transition`] is the grammar: (state, class) to an [`Action`] and the
//!   next [`QuizState`].
//! - [`StateMachine`] drives per-state handlers over the input lines.
//! - [`QuizParser`] wires the three together and builds a [`QuizDocument`],
//!   which is scored once the end of input is reached.
//!
//! # Example
//!
//! ```
//! use qz_core::parse_quiz;
//!
//! let doc = parse_quiz("# Capitals\n---\nCapital of France?\n- !Paris\n- Lyon\n", 0.0).unwrap();
//! let question = &doc.section("Capitals").unwrap().questions()[0];
//! assert_eq!(question.answers()[0].weight(), Some(100.0));
//! ```

mod document;
mod error;
mod line;
mod machine;
mod parser;

pub use document::{Answer, DEFAULT_SECTION, Question, QuizDocument, Section};
pub use error::{BuildError, InitializationError, ParseError, TransitionError, ValidationError};
pub use line::{LineClass, SourceLine, classify, is_blank};
pub use machine::{Handler, StateMachine};
pub use parser::{
    Action, QuizParser, QuizState, Transition, UnknownStateError, parse_quiz, transition,
};
