//! Entry point for one conversation turn.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use itinera_core::config::AppConfig;
use itinera_core::traits::ChainProvider;
use itinera_core::types::ConversationId;
use itinera_tools::ToolRegistry;

use crate::graph::GraphEngine;
use crate::state::ConversationState;
use crate::workflow::{build_graph, AgentContext};

/// What one conversation turn produced.
#[derive(Debug, Clone)]
pub struct AgentResponse {
    /// The text surfaced to the user (the final transcript message, or
    /// an error summary).
    pub response: String,
    /// The full terminal state, for inspection and logging.
    pub state: ConversationState,
}

/// The travel agent facade: owns the workflow graph and runs queries
/// through it.
pub struct TravelAgent {
    graph: GraphEngine,
}

impl TravelAgent {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn ChainProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let ctx = Arc::new(AgentContext::new(config, provider, tools));
        Self {
            graph: build_graph(ctx),
        }
    }

    /// Run one user query through the workflow.
    ///
    /// Never panics and never returns `Err`: workflow failures are folded
    /// into the response text so the caller always has something to show.
    pub async fn execute(&self, user_query: &str, cancel: &CancellationToken) -> AgentResponse {
        let conversation_id = ConversationId::new();
        let preview: String = user_query.chars().take(80).collect();
        info!(conversation_id = %conversation_id, query = %preview, "Processing travel query");

        match self
            .graph
            .execute(ConversationState::seed(user_query), cancel)
            .await
        {
            Ok(state) => {
                let response = state
                    .last_message()
                    .map(|m| m.content.clone())
                    .unwrap_or_default();
                info!(
                    conversation_id = %conversation_id,
                    messages = state.messages.len(),
                    "Travel query completed"
                );
                AgentResponse { response, state }
            }
            Err(e) => {
                error!(conversation_id = %conversation_id, error = %e, "Travel query failed");
                AgentResponse {
                    response: format!("Error processing request: {e}"),
                    state: ConversationState::default(),
                }
            }
        }
    }
}
