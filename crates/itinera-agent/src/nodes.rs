//! The concrete node executors of the travel workflow.
//!
//! Every model-calling node follows the same shape: build a chain request
//! naming a prompt template, optional bound tools and an optional output
//! schema; acquire the rate limiter under the node's name; invoke the chain
//! with the transcript plus node-specific variables; map the response into
//! a partial state update. The engine owns merging and the soft-fail policy.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use itinera_core::error::{ItineraError, Result};
use itinera_core::traits::{ChainRequest, ChainResponse};
use itinera_core::types::{ChatMessage, ToolCall};

use crate::entities::{FlightResultsSummary, IsValid, LocationCodes, QueryExtractedInfo};
use crate::graph::{NodeExecutor, NodeId};
use crate::prompts;
use crate::state::{ConversationState, StateUpdate};
use crate::workflow::AgentContext;

/// Rate-limit, build, and invoke a chain for one node.
async fn invoke_chain(
    ctx: &AgentContext,
    node: NodeId,
    request: ChainRequest,
    messages: Vec<ChatMessage>,
    variables: HashMap<String, String>,
    cancel: &CancellationToken,
) -> Result<ChainResponse> {
    ctx.limiter.acquire(node.name(), cancel).await?;
    let chain = ctx.provider.get_chain(request).await?;
    tokio::select! {
        response = chain.invoke(messages, variables) => response,
        _ = cancel.cancelled() => Err(ItineraError::Cancelled),
    }
}

fn vars<const N: usize>(pairs: [(&str, String); N]) -> HashMap<String, String> {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

/// Validates that the query carries origin, destination and both dates.
///
/// Not resilient: a collaborator failure here aborts the run and surfaces
/// at the handler boundary instead of being absorbed into the transcript.
pub struct CheckUserQueryNode {
    ctx: Arc<AgentContext>,
}

impl CheckUserQueryNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for CheckUserQueryNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let user_query = state.user_query.clone();
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(user_query = %user_query, "Starting check_user_query node");
            let request = ChainRequest::new(prompts::CHECK_USER_QUERY_PROMPT)
                .with_schema(IsValid::schema())
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([("user_query", user_query)]);

            let response = invoke_chain(
                &self.ctx,
                NodeId::CheckUserQuery,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?;
            let verdict: IsValid = response.into_structured()?;

            info!(valid = verdict.verdict(), "Query validation completed");
            Ok(StateUpdate {
                valid_query: Some(verdict.verdict()),
                messages: vec![ChatMessage::ai(verdict.reason.unwrap_or_default())],
                ..Default::default()
            })
        })
    }

    fn resilient(&self) -> bool {
        false
    }
}

/// Extracts budget, origin, destination and dates from the transcript.
pub struct ExtractorNode {
    ctx: Arc<AgentContext>,
}

impl ExtractorNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for ExtractorNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let user_query = state.user_query.clone();
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(messages_count = messages.len(), "Starting extractor node");
            let request = ChainRequest::new(prompts::EXTRACT_QUERY_INFO_PROMPT)
                .with_schema(QueryExtractedInfo::schema())
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([("user_query", user_query)]);

            let response = invoke_chain(
                &self.ctx,
                NodeId::Extractor,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?;
            let info: QueryExtractedInfo = response.into_structured()?;

            info!(
                origin = %info.origin,
                destination = %info.destination,
                "Query extraction completed"
            );
            let summary = format!(
                "Extracted: {} -> {} ({} to {})",
                info.origin, info.destination, info.start_date, info.end_date
            );
            Ok(StateUpdate {
                budget: info.budget,
                origin: Some(info.origin),
                destination: Some(info.destination),
                start_date: Some(info.start_date),
                end_date: Some(info.end_date),
                messages: vec![ChatMessage::ai(summary)],
                ..Default::default()
            })
        })
    }
}

/// Asks the model to resolve city codes, with the location tool bound.
pub struct LocationSearchNode {
    ctx: Arc<AgentContext>,
}

impl LocationSearchNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for LocationSearchNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let origin = state.origin.clone();
        let destination = state.destination.clone();
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(origin = %origin, destination = %destination, "Starting location_search node");
            let request = ChainRequest::new(prompts::LOCATION_SEARCH_PROMPT)
                .with_tools(self.ctx.tools.definitions_for(&["location_search"]))
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([("origin", origin), ("destination", destination)]);

            let message = invoke_chain(
                &self.ctx,
                NodeId::LocationSearch,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?
            .into_message()?;

            info!(
                has_tool_calls = message.has_tool_calls(),
                "Location search node completed"
            );
            Ok(StateUpdate::messages(vec![message]))
        })
    }
}

/// Copies the resolved IATA codes into the state.
pub struct ProcessLocationResultsNode {
    ctx: Arc<AgentContext>,
}

impl ProcessLocationResultsNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for ProcessLocationResultsNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let origin_code = state.origin_code.clone();
        let destination_code = state.destination_code.clone();
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(messages_count = messages.len(), "Starting process_location_results");
            let request = ChainRequest::new(prompts::PROCESS_LOCATION_RESULTS_PROMPT)
                .with_schema(LocationCodes::schema())
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([
                ("origin_code", origin_code),
                ("destination_code", destination_code),
            ]);

            let response = invoke_chain(
                &self.ctx,
                NodeId::ProcessLocationResults,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?;
            let codes: LocationCodes = response.into_structured()?;

            info!(
                origin_code = %codes.origin_code,
                destination_code = %codes.destination_code,
                "Location results processed"
            );
            Ok(StateUpdate {
                origin_code: Some(codes.origin_code.clone()),
                destination_code: Some(codes.destination_code.clone()),
                messages: vec![ChatMessage::ai(codes.to_string())],
                ..Default::default()
            })
        })
    }
}

/// Asks the model to search flights, with the flight tool bound.
pub struct FlightSearchNode {
    ctx: Arc<AgentContext>,
}

impl FlightSearchNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for FlightSearchNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let origin_code = state.origin_code.clone();
        let destination_code = state.destination_code.clone();
        let start_date = state.start_date.clone();
        let end_date = state.end_date.clone();
        let budget = state.budget;
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(
                origin_code = %origin_code,
                destination_code = %destination_code,
                start_date = %start_date,
                end_date = %end_date,
                "Starting flight_search node"
            );
            let request = ChainRequest::new(prompts::FLIGHT_SEARCH_PROMPT)
                .with_tools(self.ctx.tools.definitions_for(&["flight_search"]))
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([
                ("origin_code", origin_code),
                ("destination_code", destination_code),
                ("start_date", start_date),
                ("end_date", end_date),
                (
                    "budget",
                    budget.map_or_else(|| "none".to_string(), |b| b.to_string()),
                ),
            ]);

            let message = invoke_chain(
                &self.ctx,
                NodeId::FlightSearch,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?
            .into_message()?;

            info!(
                has_tool_calls = message.has_tool_calls(),
                "Flight search node completed"
            );
            Ok(StateUpdate::messages(vec![message]))
        })
    }
}

/// Condenses the flight search into the serialized results summary.
pub struct ProcessFlightResultsNode {
    ctx: Arc<AgentContext>,
}

impl ProcessFlightResultsNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for ProcessFlightResultsNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let flight_results = state.flight_results.clone();
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(messages_count = messages.len(), "Starting process_flight_results");
            let request = ChainRequest::new(prompts::PROCESS_FLIGHT_RESULTS_PROMPT)
                .with_schema(FlightResultsSummary::schema())
                .with_temperature(self.ctx.config.model.temperature);
            let variables = vars([("flight_results", flight_results)]);

            let response = invoke_chain(
                &self.ctx,
                NodeId::ProcessFlightResults,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?;
            let summary: FlightResultsSummary = response.into_structured()?;

            info!("Flight results processed");
            Ok(StateUpdate {
                flight_results: Some(summary.flight_results.clone()),
                messages: vec![ChatMessage::ai(summary.flight_results)],
                ..Default::default()
            })
        })
    }
}

/// Composes the final travel proposal returned to the caller.
pub struct ProposalNode {
    ctx: Arc<AgentContext>,
}

impl ProposalNode {
    pub fn new(ctx: Arc<AgentContext>) -> Self {
        Self { ctx }
    }
}

impl NodeExecutor for ProposalNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let variables = vars([
            ("origin", state.origin.clone()),
            ("destination", state.destination.clone()),
            ("start_date", state.start_date.clone()),
            ("end_date", state.end_date.clone()),
            (
                "budget",
                state
                    .budget
                    .map_or_else(|| "none".to_string(), |b| b.to_string()),
            ),
            ("flight_results", state.flight_results.clone()),
        ]);
        let messages = state.messages.clone();
        let cancel = cancel.clone();
        Box::pin(async move {
            info!(messages_count = messages.len(), "Starting proposal node");
            let request = ChainRequest::new(prompts::PROPOSE_TRAVEL_PLAN_PROMPT)
                .with_temperature(self.ctx.config.model.temperature);

            let message = invoke_chain(
                &self.ctx,
                NodeId::Proposal,
                request,
                messages,
                variables,
                &cancel,
            )
            .await?
            .into_message()?;

            info!("Travel proposal generation completed");
            Ok(StateUpdate::messages(vec![ChatMessage::ai(message.content)]))
        })
    }
}

/// Services the tool calls requested by the preceding model node.
///
/// One executor serves both tool-invocation nodes; the node id only
/// names the rate-limiter-free position in the graph. Per-call failures
/// are answered with an `Error: <cause>` tool message so the model node
/// can react on the next pass.
pub struct ToolNode {
    ctx: Arc<AgentContext>,
    id: NodeId,
}

impl ToolNode {
    pub fn new(ctx: Arc<AgentContext>, id: NodeId) -> Self {
        Self { ctx, id }
    }
}

impl NodeExecutor for ToolNode {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>> {
        let calls: Vec<ToolCall> = state
            .last_message()
            .map(|m| m.tool_calls.clone())
            .unwrap_or_default();
        let cancel = cancel.clone();
        Box::pin(async move {
            let mut messages = Vec::with_capacity(calls.len());
            for call in calls {
                if cancel.is_cancelled() {
                    return Err(ItineraError::Cancelled);
                }

                info!(node = %self.id, tool = %call.name, call_id = %call.id, "Dispatching tool call");
                let content = match self.ctx.tools.execute(&call.name, call.arguments).await {
                    Ok(result) if result.is_error => {
                        debug!(tool = %call.name, "Tool reported an error result");
                        format!("Error: {}", result.content)
                    }
                    Ok(result) => result.content,
                    Err(e) => {
                        error!(tool = %call.name, error = %e, "Tool execution failed");
                        format!("Error: {e}")
                    }
                };
                messages.push(ChatMessage::tool_result(call.id, content));
            }
            Ok(StateUpdate::messages(messages))
        })
    }
}
