//! Pure transition functions for the flows.
//!
//! Each flow has a `transition(state, event) -> Transition<State>` free of
//! I/O. Unexpected (state, event) pairs leave the state unchanged and emit
//! a warning log effect rather than panicking, since user input and API
//! responses can race.

pub mod checkout;
pub mod review;
pub mod sale;

use super::effect::{Effect, LogLevel};
use super::event::FlowEvent;

/// Result of a transition: the next state plus effects to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub state: S,
    pub effects: Vec<Effect>,
}

impl<S> Transition<S> {
    pub fn new(state: S, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    /// A transition that changes state without effects.
    pub fn state_only(state: S) -> Self {
        Self {
            state,
            effects: Vec::new(),
        }
    }

    /// State unchanged, event ignored with a warning.
    pub fn unexpected(state: S, event: &FlowEvent) -> Self {
        Self {
            state,
            effects: vec![Effect::Log {
                level: LogLevel::Warn,
                message: format!("Ignoring unexpected event: {}", event.log_summary()),
            }],
        }
    }
}
