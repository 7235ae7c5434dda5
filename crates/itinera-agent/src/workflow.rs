//! Assembles the travel workflow graph from its nodes and routing rules.

use std::sync::Arc;

use tracing::info;

use itinera_core::config::AppConfig;
use itinera_core::limiter::RateLimiter;
use itinera_core::traits::ChainProvider;
use itinera_tools::ToolRegistry;

use crate::graph::{Edge, GraphEngine, LoopKind, NodeId, Target};
use crate::nodes::{
    CheckUserQueryNode, ExtractorNode, FlightSearchNode, LocationSearchNode,
    ProcessFlightResultsNode, ProcessLocationResultsNode, ProposalNode, ToolNode,
};

/// Shared collaborators every node executor draws from.
pub struct AgentContext {
    pub config: AppConfig,
    pub provider: Arc<dyn ChainProvider>,
    pub tools: Arc<ToolRegistry>,
    pub limiter: Arc<RateLimiter>,
}

impl AgentContext {
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn ChainProvider>,
        tools: Arc<ToolRegistry>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new(&config.rate_limit));
        Self {
            config,
            provider,
            tools,
            limiter,
        }
    }
}

/// Wire the full travel workflow: validation, extraction, the two
/// tool-search loops, and the final proposal.
pub fn build_graph(ctx: Arc<AgentContext>) -> GraphEngine {
    let mut graph = GraphEngine::new(NodeId::CheckUserQuery);

    graph.add_node(
        NodeId::CheckUserQuery,
        Arc::new(CheckUserQueryNode::new(ctx.clone())),
    );
    graph.add_node(NodeId::Extractor, Arc::new(ExtractorNode::new(ctx.clone())));
    graph.add_node(
        NodeId::LocationSearch,
        Arc::new(LocationSearchNode::new(ctx.clone())),
    );
    graph.add_node(
        NodeId::LocationSearchTools,
        Arc::new(ToolNode::new(ctx.clone(), NodeId::LocationSearchTools)),
    );
    graph.add_node(
        NodeId::ProcessLocationResults,
        Arc::new(ProcessLocationResultsNode::new(ctx.clone())),
    );
    graph.add_node(
        NodeId::FlightSearch,
        Arc::new(FlightSearchNode::new(ctx.clone())),
    );
    graph.add_node(
        NodeId::FlightSearchTools,
        Arc::new(ToolNode::new(ctx.clone(), NodeId::FlightSearchTools)),
    );
    graph.add_node(
        NodeId::ProcessFlightResults,
        Arc::new(ProcessFlightResultsNode::new(ctx.clone())),
    );
    graph.add_node(NodeId::Proposal, Arc::new(ProposalNode::new(ctx.clone())));

    graph.add_edge(
        NodeId::CheckUserQuery,
        Edge::OnValidQuery {
            valid: Target::Node(NodeId::Extractor),
            invalid: Target::End,
        },
    );
    graph.add_edge(
        NodeId::Extractor,
        Edge::OnExtractionComplete {
            complete: Target::Node(NodeId::LocationSearch),
            incomplete: Target::Node(NodeId::Extractor),
        },
    );
    graph.add_edge(
        NodeId::LocationSearch,
        Edge::OnPendingToolCalls {
            tools: Target::Node(NodeId::LocationSearchTools),
            done: Target::Node(NodeId::ProcessLocationResults),
        },
    );
    graph.add_edge(
        NodeId::LocationSearchTools,
        Edge::Direct(Target::Node(NodeId::LocationSearch)),
    );
    graph.add_edge(
        NodeId::ProcessLocationResults,
        Edge::Direct(Target::Node(NodeId::FlightSearch)),
    );
    graph.add_edge(
        NodeId::FlightSearch,
        Edge::OnPendingToolCalls {
            tools: Target::Node(NodeId::FlightSearchTools),
            done: Target::Node(NodeId::ProcessFlightResults),
        },
    );
    graph.add_edge(
        NodeId::FlightSearchTools,
        Edge::Direct(Target::Node(NodeId::FlightSearch)),
    );
    graph.add_edge(
        NodeId::ProcessFlightResults,
        Edge::Direct(Target::Node(NodeId::Proposal)),
    );
    graph.add_edge(NodeId::Proposal, Edge::Direct(Target::End));

    graph.cap_visits(
        NodeId::Extractor,
        ctx.config.agent.max_extraction_attempts,
        LoopKind::Extraction,
    );
    graph.cap_visits(
        NodeId::LocationSearch,
        ctx.config.agent.max_tool_loop_iterations,
        LoopKind::ToolLoop,
    );
    graph.cap_visits(
        NodeId::FlightSearch,
        ctx.config.agent.max_tool_loop_iterations,
        LoopKind::ToolLoop,
    );

    info!("Travel agent workflow graph created");
    graph
}
