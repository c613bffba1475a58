//! Turn controller: the three-phase state machine of one chat turn.
//!
//! A turn starts in `AwaitingModel`. After the model answers, the turn is either
//! `Done` (no tool calls) or `AwaitingTools`; once every pending call has a tool
//! message the turn goes back to `AwaitingModel`. The phase is always derived from
//! the message log, so the controller holds no state the log does not.
//!
//! `tools_condition` is the conditional edge the chat graphs use after `chatbot`.

use tracing::debug;

use crate::error::AgentError;
use crate::graph::END;
use crate::message::{pending_tool_calls, Message, Role};
use crate::prebuilt::TOOLS_NODE;
use crate::state::ChatState;

/// Phase of the current turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TurnPhase {
    /// The next step is a model call (after user input or tool results).
    AwaitingModel,
    /// The latest assistant message has unanswered tool calls.
    AwaitingTools,
    /// The latest assistant message is final.
    Done,
}

impl TurnPhase {
    /// Phase implied by the log.
    pub fn of(messages: &[Message]) -> Self {
        if !pending_tool_calls(messages).is_empty() {
            return TurnPhase::AwaitingTools;
        }
        match messages.last() {
            Some(m) if m.role == Role::Assistant => TurnPhase::Done,
            _ => TurnPhase::AwaitingModel,
        }
    }

    /// Whether `self -> next` is one of the turn's transitions.
    pub fn can_transition_to(self, next: TurnPhase) -> bool {
        matches!(
            (self, next),
            (TurnPhase::AwaitingModel, TurnPhase::Done)
                | (TurnPhase::AwaitingModel, TurnPhase::AwaitingTools)
                | (TurnPhase::AwaitingTools, TurnPhase::AwaitingModel)
        )
    }
}

/// Router for the edge leaving `chatbot`: `"tools"` while tool calls are pending,
/// otherwise END.
pub fn tools_condition(state: &ChatState) -> String {
    match TurnPhase::of(&state.messages) {
        TurnPhase::AwaitingTools => TOOLS_NODE.to_string(),
        TurnPhase::AwaitingModel | TurnPhase::Done => END.to_string(),
    }
}

/// Follows one turn as node updates arrive and rejects illegal transitions.
///
/// Starts in `AwaitingModel`; call `observe` with the log after every node.
#[derive(Debug, Clone)]
pub struct TurnController {
    phase: TurnPhase,
    model_calls: usize,
    tool_rounds: usize,
}

impl Default for TurnController {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnController {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::AwaitingModel,
            model_calls: 0,
            tool_rounds: 0,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    /// Number of model answers seen this turn.
    pub fn model_calls(&self) -> usize {
        self.model_calls
    }

    /// Number of completed tool dispatch rounds this turn.
    pub fn tool_rounds(&self) -> usize {
        self.tool_rounds
    }

    /// Advances to the phase implied by `messages`. An unchanged phase is a no-op.
    pub fn observe(&mut self, messages: &[Message]) -> Result<TurnPhase, AgentError> {
        let next = TurnPhase::of(messages);
        if next == self.phase {
            return Ok(next);
        }
        if !self.phase.can_transition_to(next) {
            return Err(AgentError::InvalidState(format!(
                "turn cannot move from {:?} to {:?}",
                self.phase, next
            )));
        }
        match (self.phase, next) {
            (TurnPhase::AwaitingModel, _) => self.model_calls += 1,
            (TurnPhase::AwaitingTools, TurnPhase::AwaitingModel) => self.tool_rounds += 1,
            _ => {}
        }
        debug!(from = ?self.phase, to = ?next, "turn phase");
        self.phase = next;
        Ok(next)
    }
}
