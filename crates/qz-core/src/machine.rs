//! Generic finite-state driver.
//!
//! [`StateMachine`] maps states to handlers and runs one handler per input
//! step. It enforces no transition table of its own: each handler inspects the
//! input, mutates the target and returns the next state, or fails.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use crate::error::{InitializationError, ParseError};

/// Handler invoked for one input step in a given state.
pub type Handler<S, D, I> = Box<dyn Fn(&mut D, &I, usize) -> Result<S, ParseError>>;

/// Finite-state driver over states `S`, mutating a target `D` with inputs `I`.
pub struct StateMachine<S, D, I> {
    handlers: HashMap<S, Handler<S, D, I>>,
    terminal: HashSet<S>,
    current: Option<S>,
}

impl<S, D, I> StateMachine<S, D, I>
where
    S: Copy + Eq + Hash + fmt::Display,
{
    /// Create an empty machine with no states.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            terminal: HashSet::new(),
            current: None,
        }
    }

    /// Register `handler` for `state`. Registering a state twice replaces its handler.
    pub fn register<F>(&mut self, state: S, handler: F, terminal: bool)
    where
        F: Fn(&mut D, &I, usize) -> Result<S, ParseError> + 'static,
    {
        self.handlers.insert(state, Box::new(handler));
        if terminal {
            self.terminal.insert(state);
        } else {
            self.terminal.remove(&state);
        }
    }

    /// Set the initial state.
    pub fn start(&mut self, state: S) {
        self.current = Some(state);
    }

    /// Current state, if started.
    #[must_use]
    pub fn current(&self) -> Option<S> {
        self.current
    }

    /// Whether the current state is terminal.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current.is_some_and(|s| self.terminal.contains(&s))
    }

    /// Run the handler of the current state on one input and move to the
    /// state it returns.
    ///
    /// # Errors
    ///
    /// Returns [`InitializationError`] when no start state was set, no
    /// terminal state is registered, or the current state has no handler.
    /// Handler errors are passed through and leave the current state unchanged.
    pub fn step(&mut self, target: &mut D, input: &I, line_number: usize) -> Result<S, ParseError> {
        let state = self.current.ok_or(InitializationError::NoStartState)?;
        if self.terminal.is_empty() {
            return Err(InitializationError::NoTerminalState.into());
        }
        let handler = self
            .handlers
            .get(&state)
            .ok_or_else(|| InitializationError::UnknownState(state.to_string()))?;

        tracing::trace!(state = %state, line = line_number, "Processing line");
        let next = handler(target, input, line_number)?;
        self.current = Some(next);

        if self.terminal.contains(&next) {
            tracing::debug!(state = %next, line = line_number, "Reached end state");
        }
        Ok(next)
    }
}

impl<S, D, I> Default for StateMachine<S, D, I>
where
    S: Copy + Eq + Hash + fmt::Display,
{
    fn default() -> Self {
        Self::new()
    }
}
