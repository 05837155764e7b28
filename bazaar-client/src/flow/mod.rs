//! Explicit state machines for the user-facing flows.
//!
//! Three flows are modelled: mark-as-sold, review submission, and the
//! checkout wizard. The design separates:
//! - **State**: what the flow knows (one enum per flow)
//! - **Events**: what happened (`FlowEvent`)
//! - **Effects**: what to do (`Effect`)
//! - **Transition**: pure function `(State, Event) -> (State, Vec<Effect>)`
//!
//! The interpreter executes effects against the API clients and returns
//! result events; `runner::pump` loops a transition function and the
//! interpreter until the event queue drains.

pub mod effect;
pub mod event;
pub mod interpreter;
pub mod runner;
pub mod state;
pub mod transition;

pub use effect::*;
pub use event::*;
pub use interpreter::*;
pub use runner::*;
pub use state::*;
pub use transition::*;
