//! Per-user session state.

use serde::{Deserialize, Serialize};

use crate::plan::ReasoningLevel;
use crate::{Timestamp, now};

/// Record of the outcome of a user's immediately preceding turn.
///
/// Overwritten in full on every turn. Session state is ephemeral: it lives
/// only for the process lifetime and carries no persistence guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Agent that produced the last response.
    pub last_agent_id: String,
    /// Text of the last response handed to the user.
    pub last_response: String,
    /// Reasoning depth the last response was rendered at.
    pub last_reasoning_level: ReasoningLevel,
    /// Carry-over context for continuation turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuation_context: Option<String>,
    /// When this state was recorded.
    pub updated_at: Timestamp,
}

impl SessionState {
    /// Record the outcome of a turn.
    pub fn new(
        agent_id: impl Into<String>,
        response: impl Into<String>,
        reasoning_level: ReasoningLevel,
    ) -> Self {
        Self {
            last_agent_id: agent_id.into(),
            last_response: response.into(),
            last_reasoning_level: reasoning_level,
            continuation_context: None,
            updated_at: now(),
        }
    }

    /// Attach continuation context.
    pub fn with_continuation(mut self, context: impl Into<String>) -> Self {
        self.continuation_context = Some(context.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_overwrite_semantics() {
        let first = SessionState::new("tutor", "first answer", ReasoningLevel::Basic);
        let second = SessionState::new("tutor", "second answer", ReasoningLevel::Advanced)
            .with_continuation("covering lifetimes next");

        assert_ne!(first, second);
        assert_eq!(second.last_response, "second answer");
        assert_eq!(
            second.continuation_context.as_deref(),
            Some("covering lifetimes next")
        );
    }
}
