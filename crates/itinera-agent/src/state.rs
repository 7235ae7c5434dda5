use serde::{Deserialize, Serialize};

use itinera_core::types::ChatMessage;

/// The mutable record threaded through every node of one conversation.
///
/// Created once per inbound query, mutated by sequential node executions,
/// and discarded when the engine reaches the terminal marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub user_query: String,
    pub valid_query: bool,
    pub budget: Option<f64>,
    pub origin: String,
    pub origin_code: String,
    pub destination: String,
    pub destination_code: String,
    pub start_date: String,
    pub end_date: String,
    pub flight_results: String,
    pub messages: Vec<ChatMessage>,
}

impl ConversationState {
    /// Seed a fresh state: all fields zero-valued except the query and
    /// a single human message carrying it.
    pub fn seed(user_query: impl Into<String>) -> Self {
        let user_query = user_query.into();
        Self {
            messages: vec![ChatMessage::human(user_query.clone())],
            user_query,
            ..Default::default()
        }
    }

    /// Merge a node's partial update: `messages` concatenate, every other
    /// field overwrites only if the update carries it. Node executors never
    /// hand-merge; this is the single reducer.
    pub fn apply(&mut self, update: StateUpdate) {
        if let Some(valid_query) = update.valid_query {
            self.valid_query = valid_query;
        }
        if let Some(budget) = update.budget {
            self.budget = Some(budget);
        }
        if let Some(origin) = update.origin {
            self.origin = origin;
        }
        if let Some(origin_code) = update.origin_code {
            self.origin_code = origin_code;
        }
        if let Some(destination) = update.destination {
            self.destination = destination;
        }
        if let Some(destination_code) = update.destination_code {
            self.destination_code = destination_code;
        }
        if let Some(start_date) = update.start_date {
            self.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            self.end_date = end_date;
        }
        if let Some(flight_results) = update.flight_results {
            self.flight_results = flight_results;
        }
        self.messages.extend(update.messages);
    }

    /// True once origin, destination and both dates are all non-empty.
    pub fn extraction_complete(&self) -> bool {
        !self.origin.is_empty()
            && !self.destination.is_empty()
            && !self.start_date.is_empty()
            && !self.end_date.is_empty()
    }

    pub fn last_message(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }
}

/// A node's partial state update.
#[derive(Debug, Clone, Default)]
pub struct StateUpdate {
    pub valid_query: Option<bool>,
    pub budget: Option<f64>,
    pub origin: Option<String>,
    pub origin_code: Option<String>,
    pub destination: Option<String>,
    pub destination_code: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub flight_results: Option<String>,
    pub messages: Vec<ChatMessage>,
}

impl StateUpdate {
    /// An update carrying only messages.
    pub fn messages(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed() {
        let state = ConversationState::seed("Flight from NYC to Paris");
        assert_eq!(state.user_query, "Flight from NYC to Paris");
        assert!(!state.valid_query);
        assert_eq!(state.messages.len(), 1);
        assert_eq!(state.messages[0].content, "Flight from NYC to Paris");
    }

    #[test]
    fn test_apply_overwrites_only_present_fields() {
        let mut state = ConversationState::seed("q");
        state.apply(StateUpdate {
            origin: Some("NYC".into()),
            budget: Some(1000.0),
            ..Default::default()
        });
        state.apply(StateUpdate {
            destination: Some("Paris".into()),
            ..Default::default()
        });

        assert_eq!(state.origin, "NYC");
        assert_eq!(state.destination, "Paris");
        assert_eq!(state.budget, Some(1000.0));
    }

    #[test]
    fn test_message_merge_is_order_preserving() {
        // Concatenating successive updates reproduces the full transcript
        // regardless of how execution is chunked.
        let chunks = vec![
            vec![ChatMessage::ai("a"), ChatMessage::ai("b")],
            vec![ChatMessage::ai("c")],
            vec![],
            vec![ChatMessage::ai("d"), ChatMessage::ai("e")],
        ];

        let mut one_by_one = ConversationState::seed("q");
        for chunk in &chunks {
            for msg in chunk {
                one_by_one.apply(StateUpdate::messages(vec![msg.clone()]));
            }
        }

        let mut chunked = ConversationState::seed("q");
        for chunk in &chunks {
            chunked.apply(StateUpdate::messages(chunk.clone()));
        }

        let contents: Vec<&str> = chunked.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q", "a", "b", "c", "d", "e"]);
        assert_eq!(
            one_by_one.messages.len(),
            chunked.messages.len(),
        );
    }

    #[test]
    fn test_extraction_complete_requires_all_four() {
        let mut state = ConversationState::seed("q");
        state.apply(StateUpdate {
            origin: Some("NYC".into()),
            destination: Some("Paris".into()),
            start_date: Some("2024-06-01".into()),
            end_date: Some("2024-06-10".into()),
            ..Default::default()
        });
        assert!(state.extraction_complete());

        // Blank out exactly one field at a time.
        for field in 0..4 {
            let mut missing = state.clone();
            match field {
                0 => missing.origin.clear(),
                1 => missing.destination.clear(),
                2 => missing.start_date.clear(),
                _ => missing.end_date.clear(),
            }
            assert!(!missing.extraction_complete());
        }
    }
}
