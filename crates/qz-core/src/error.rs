//! Error types for quiz parsing and validation.

/// The state machine was run before it was fully configured.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum InitializationError {
    /// `start()` was never called.
    #[error("start state must be set before running")]
    NoStartState,

    /// No registered state is terminal.
    #[error("at least one state must be terminal")]
    NoTerminalState,

    /// The current state has no handler.
    #[error("no handler registered for state {0}")]
    UnknownState(String),
}

/// The current line is not acceptable in the current parser state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Error at line {line}: {reason}")]
pub struct TransitionError {
    /// 1-based line number.
    pub line: usize,
    /// Human-readable reason.
    pub reason: String,
}

impl TransitionError {
    pub(crate) fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// A question has no correct answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("No correct answer(s) for {question}")]
pub struct ValidationError {
    /// Raw text of the offending question.
    pub question: String,
}

/// A document mutator was called out of order.
///
/// The parser only calls mutators on legal transitions, so these surface as
/// transition errors carrying the offending line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("no question is open")]
    NoCurrentQuestion,

    #[error("no answer to attach feedback to")]
    NoCurrentAnswer,

    #[error("answer already has feedback")]
    FeedbackAlreadyAttached,

    #[error("document is already validated")]
    AlreadyValidated,
}

/// Error from parsing a quiz document.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// Parser state machine misconfiguration.
    #[error("state machine not initialized: {0}")]
    Initialization(#[from] InitializationError),

    /// Line not acceptable in the current state.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// Scoring failed when the end of input was reached.
    #[error("Error at line {line}: {source}")]
    Validation {
        /// Line number of the end-of-input sentinel.
        line: usize,
        /// Underlying validation failure.
        #[source]
        source: ValidationError,
    },
}

impl ParseError {
    /// Line number the error refers to, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Initialization(_) => None,
            Self::Transition(e) => Some(e.line),
            Self::Validation { line, .. } => Some(*line),
        }
    }
}
