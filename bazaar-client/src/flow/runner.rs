//! Drives a flow: applies an event, executes the resulting effects, and
//! feeds follow-up events back in until the flow settles.

use tracing::debug;

use super::event::FlowEvent;
use super::interpreter::{execute_effects, InterpreterContext};
use super::transition::Transition;

/// Apply `event` to `state` and keep pumping until no effect produces a
/// follow-up event. Events are processed in FIFO order, so effects of an
/// earlier event are fully handled before a later event's.
pub async fn pump<S, F>(
    ctx: &InterpreterContext,
    mut state: S,
    event: FlowEvent,
    transition: F,
) -> S
where
    F: Fn(S, FlowEvent) -> Transition<S>,
{
    let mut queue = std::collections::VecDeque::new();
    queue.push_back(event);
    while let Some(event) = queue.pop_front() {
        debug!("Applying event: {}", event.log_summary());
        let result = transition(state, event);
        state = result.state;
        for follow_up in execute_effects(ctx, result.effects).await {
            queue.push_back(follow_up);
        }
    }
    state
}
