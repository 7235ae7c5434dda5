//! Pure predicates over [`ConversationState`] used by conditional edges.
//!
//! These never mutate state; they only pick routing outcomes.

use tracing::debug;

use crate::state::ConversationState;

pub fn has_valid_query(state: &ConversationState) -> bool {
    debug!(valid = state.valid_query, "Checking if query is valid");
    state.valid_query
}

pub fn has_extracted_info(state: &ConversationState) -> bool {
    let has_all_info = state.extraction_complete();
    debug!(has_all_info, "Checking if all info extracted");
    has_all_info
}

/// True when the last message carries at least one tool-call request.
pub fn has_pending_tool_calls(state: &ConversationState) -> bool {
    state
        .last_message()
        .map_or(false, |m| m.has_tool_calls())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::StateUpdate;
    use itinera_core::types::{ChatMessage, ToolCall};

    #[test]
    fn test_has_valid_query() {
        let mut state = ConversationState::seed("q");
        assert!(!has_valid_query(&state));
        state.valid_query = true;
        assert!(has_valid_query(&state));
    }

    #[test]
    fn test_pending_tool_calls_exclusive() {
        let mut state = ConversationState::seed("q");
        // Seed human message carries no tool calls.
        assert!(!has_pending_tool_calls(&state));

        state.apply(StateUpdate::messages(vec![ChatMessage::ai_with_tool_calls(
            "",
            vec![ToolCall {
                id: "call_1".into(),
                name: "location_search".into(),
                arguments: serde_json::json!({"city": "Paris"}),
            }],
        )]));
        assert!(has_pending_tool_calls(&state));

        state.apply(StateUpdate::messages(vec![ChatMessage::tool_result(
            "call_1", "[]",
        )]));
        assert!(!has_pending_tool_calls(&state));
    }
}
