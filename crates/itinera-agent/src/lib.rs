pub mod conditions;
pub mod entities;
pub mod graph;
pub mod handler;
pub mod nodes;
pub mod prompts;
pub mod state;
pub mod workflow;

pub use graph::{Edge, GraphEngine, LoopKind, NodeExecutor, NodeId, Target};
pub use handler::{AgentResponse, TravelAgent};
pub use state::{ConversationState, StateUpdate};
pub use workflow::{build_graph, AgentContext};
