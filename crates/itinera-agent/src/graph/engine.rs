use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use itinera_core::error::{ItineraError, Result};
use itinera_core::types::ChatMessage;

use super::edge::{Edge, Target};
use super::node::{NodeExecutor, NodeId};
use crate::state::{ConversationState, StateUpdate};

/// Which guard an over-visited node trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopKind {
    Extraction,
    ToolLoop,
}

#[derive(Clone, Copy)]
struct VisitCap {
    max_visits: usize,
    kind: LoopKind,
}

/// Drives a workflow graph from the entry node to the terminal marker.
///
/// Holds the node and edge maps; `execute` walks the graph, merging each
/// node's partial update into the state and resolving the next node via
/// the outgoing edge. The engine holds no per-run state and is safe to
/// invoke re-entrantly from concurrent conversations.
pub struct GraphEngine {
    nodes: HashMap<NodeId, Arc<dyn NodeExecutor>>,
    edges: HashMap<NodeId, Edge>,
    entry: NodeId,
    visit_caps: HashMap<NodeId, VisitCap>,
}

impl GraphEngine {
    pub fn new(entry: NodeId) -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry,
            visit_caps: HashMap::new(),
        }
    }

    /// Register a node executor.
    pub fn add_node(&mut self, id: NodeId, executor: Arc<dyn NodeExecutor>) {
        self.nodes.insert(id, executor);
    }

    /// Register the outgoing edge of a node.
    pub fn add_edge(&mut self, from: NodeId, edge: Edge) {
        self.edges.insert(from, edge);
    }

    /// Bound how often a node may run within one execution.
    ///
    /// Cycles are structurally permitted; only capped nodes are limited.
    pub fn cap_visits(&mut self, id: NodeId, max_visits: usize, kind: LoopKind) {
        self.visit_caps.insert(id, VisitCap { max_visits, kind });
    }

    /// Walk the graph from the entry node, returning the final state.
    ///
    /// Fails on a missing node or edge, a tripped loop guard, cancellation,
    /// or a non-resilient node error. Resilient node errors are absorbed as
    /// an `Error: <cause>` AI message and routing continues.
    pub async fn execute(
        &self,
        initial: ConversationState,
        cancel: &CancellationToken,
    ) -> Result<ConversationState> {
        let start = Instant::now();
        let mut state = initial;
        let mut current = self.entry;
        let mut visits: HashMap<NodeId, usize> = HashMap::new();

        loop {
            if cancel.is_cancelled() {
                return Err(ItineraError::Cancelled);
            }

            let count = visits.entry(current).or_insert(0);
            *count += 1;
            if let Some(cap) = self.visit_caps.get(&current) {
                if *count > cap.max_visits {
                    error!(node = %current, visits = *count, "Loop guard tripped");
                    return Err(match cap.kind {
                        LoopKind::Extraction => {
                            ItineraError::ExtractionExhausted(cap.max_visits)
                        }
                        LoopKind::ToolLoop => ItineraError::ToolLoopExhausted(cap.max_visits),
                    });
                }
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| ItineraError::NodeNotFound(current.name().to_string()))?;

            info!(node = %current, "Executing graph node");
            let node_start = Instant::now();
            match node.run(&state, cancel).await {
                Ok(update) => {
                    debug!(
                        node = %current,
                        elapsed_ms = node_start.elapsed().as_millis() as u64,
                        new_messages = update.messages.len(),
                        "Node execution complete"
                    );
                    state.apply(update);
                }
                Err(ItineraError::Cancelled) => return Err(ItineraError::Cancelled),
                Err(e) if node.resilient() => {
                    error!(node = %current, error = %e, "Node failed, continuing");
                    state.apply(StateUpdate::messages(vec![ChatMessage::ai(format!(
                        "Error: {e}"
                    ))]));
                }
                Err(e) => {
                    error!(node = %current, error = %e, "Node failed");
                    return Err(e);
                }
            }

            let edge = self
                .edges
                .get(&current)
                .ok_or_else(|| ItineraError::RouteMissing(current.name().to_string()))?;

            match edge.resolve(&state) {
                Target::Node(next) => {
                    debug!(from = %current, to = %next, "Following edge");
                    current = next;
                }
                Target::End => {
                    info!(
                        total_elapsed_ms = start.elapsed().as_millis() as u64,
                        messages = state.messages.len(),
                        "Graph execution complete"
                    );
                    return Ok(state);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Test executor: returns a fixed update, or a chain error.
    struct Probe {
        update: StateUpdate,
        fail: Option<String>,
        resilient: bool,
        calls: AtomicUsize,
    }

    impl Probe {
        fn returning(update: StateUpdate) -> Self {
            Self {
                update,
                fail: None,
                resilient: true,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(message: &str, resilient: bool) -> Self {
            Self {
                update: StateUpdate::default(),
                fail: Some(message.to_string()),
                resilient,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl NodeExecutor for Probe {
        fn run(
            &self,
            _state: &ConversationState,
            _cancel: &CancellationToken,
        ) -> BoxFuture<'_, Result<StateUpdate>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move {
                match &self.fail {
                    Some(message) => Err(ItineraError::ChainRequest(message.clone())),
                    None => Ok(self.update.clone()),
                }
            })
        }

        fn resilient(&self) -> bool {
            self.resilient
        }
    }

    fn two_node_engine(first: Probe, second: Probe) -> GraphEngine {
        let mut engine = GraphEngine::new(NodeId::CheckUserQuery);
        engine.add_node(NodeId::CheckUserQuery, Arc::new(first));
        engine.add_node(NodeId::Proposal, Arc::new(second));
        engine.add_edge(
            NodeId::CheckUserQuery,
            Edge::Direct(Target::Node(NodeId::Proposal)),
        );
        engine.add_edge(NodeId::Proposal, Edge::Direct(Target::End));
        engine
    }

    #[tokio::test]
    async fn test_merges_updates_in_execution_order() {
        let first = Probe::returning(StateUpdate {
            origin: Some("NYC".into()),
            messages: vec![ChatMessage::ai("first")],
            ..Default::default()
        });
        let second = Probe::returning(StateUpdate {
            origin: Some("New York".into()),
            messages: vec![ChatMessage::ai("second")],
            ..Default::default()
        });
        let engine = two_node_engine(first, second);

        let state = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap();

        // Last write wins for scalars, messages concatenate in order.
        assert_eq!(state.origin, "New York");
        let contents: Vec<&str> = state.messages.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q", "first", "second"]);
    }

    #[tokio::test]
    async fn test_resilient_failure_becomes_error_message() {
        let first = Probe::failing("upstream 503", true);
        let second = Probe::returning(StateUpdate::messages(vec![ChatMessage::ai("done")]));
        let engine = two_node_engine(first, second);

        let state = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap();

        assert!(state.messages[1].content.starts_with("Error: "));
        assert_eq!(state.messages[2].content, "done");
    }

    #[tokio::test]
    async fn test_non_resilient_failure_propagates() {
        let first = Probe::failing("bad auth", false);
        let second = Probe::returning(StateUpdate::default());
        let engine = two_node_engine(first, second);

        let err = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::ChainRequest(_)));
    }

    #[tokio::test]
    async fn test_self_loop_cap_trips() {
        // Extractor that never completes extraction: routes back to itself.
        let mut engine = GraphEngine::new(NodeId::Extractor);
        engine.add_node(
            NodeId::Extractor,
            Arc::new(Probe::returning(StateUpdate::default())),
        );
        engine.add_edge(
            NodeId::Extractor,
            Edge::OnExtractionComplete {
                complete: Target::End,
                incomplete: Target::Node(NodeId::Extractor),
            },
        );
        engine.cap_visits(NodeId::Extractor, 3, LoopKind::Extraction);

        let err = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::ExtractionExhausted(3)));
    }

    #[tokio::test]
    async fn test_tool_loop_cap_trips() {
        use itinera_core::types::ToolCall;

        // Search node that requests another tool call on every pass, so the
        // loop with its tool node never settles.
        let searcher = Probe::returning(StateUpdate::messages(vec![
            ChatMessage::ai_with_tool_calls(
                "",
                vec![ToolCall {
                    id: "call_1".into(),
                    name: "location_search".into(),
                    arguments: serde_json::json!({"city": "Paris"}),
                }],
            ),
        ]));
        let tools = Probe::returning(StateUpdate::messages(vec![ChatMessage::tool_result(
            "call_1", "[]",
        )]));

        let mut engine = GraphEngine::new(NodeId::LocationSearch);
        engine.add_node(NodeId::LocationSearch, Arc::new(searcher));
        engine.add_node(NodeId::LocationSearchTools, Arc::new(tools));
        engine.add_edge(
            NodeId::LocationSearch,
            Edge::OnPendingToolCalls {
                tools: Target::Node(NodeId::LocationSearchTools),
                done: Target::End,
            },
        );
        engine.add_edge(
            NodeId::LocationSearchTools,
            Edge::Direct(Target::Node(NodeId::LocationSearch)),
        );
        engine.cap_visits(NodeId::LocationSearch, 5, LoopKind::ToolLoop);

        let err = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::ToolLoopExhausted(5)));
    }

    #[tokio::test]
    async fn test_missing_edge_is_an_error() {
        let mut engine = GraphEngine::new(NodeId::Proposal);
        engine.add_node(
            NodeId::Proposal,
            Arc::new(Probe::returning(StateUpdate::default())),
        );

        let err = engine
            .execute(ConversationState::seed("q"), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::RouteMissing(_)));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_node() {
        let engine = two_node_engine(
            Probe::returning(StateUpdate::default()),
            Probe::returning(StateUpdate::default()),
        );
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = engine
            .execute(ConversationState::seed("q"), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::Cancelled));
    }
}
