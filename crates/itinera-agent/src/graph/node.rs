use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;

use itinera_core::error::Result;

use crate::state::{ConversationState, StateUpdate};

/// Identifier of a node in the travel workflow graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    CheckUserQuery,
    Extractor,
    LocationSearch,
    LocationSearchTools,
    ProcessLocationResults,
    FlightSearch,
    FlightSearchTools,
    ProcessFlightResults,
    Proposal,
}

impl NodeId {
    /// Stable name, used as the rate-limiter key and in logs.
    pub fn name(&self) -> &'static str {
        match self {
            NodeId::CheckUserQuery => "check_user_query",
            NodeId::Extractor => "extractor",
            NodeId::LocationSearch => "location_search",
            NodeId::LocationSearchTools => "location_search_tools",
            NodeId::ProcessLocationResults => "process_location_results",
            NodeId::FlightSearch => "flight_search",
            NodeId::FlightSearchTools => "flight_search_tools",
            NodeId::ProcessFlightResults => "process_flight_results",
            NodeId::Proposal => "proposal",
        }
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A unit of work executed by the engine.
///
/// Executors read the state and produce a partial update; the engine owns
/// the merge. A resilient executor's failure is absorbed as an AI error
/// message and routing continues; a non-resilient failure aborts the run.
pub trait NodeExecutor: Send + Sync + 'static {
    fn run(
        &self,
        state: &ConversationState,
        cancel: &CancellationToken,
    ) -> BoxFuture<'_, Result<StateUpdate>>;

    /// Whether failures are soft-failed into the transcript.
    fn resilient(&self) -> bool {
        true
    }
}
