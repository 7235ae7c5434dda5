//! The workflow graph: nodes, edges, and the drive loop.

pub mod edge;
pub mod engine;
pub mod node;

pub use edge::{Edge, Target};
pub use engine::{GraphEngine, LoopKind};
pub use node::{NodeExecutor, NodeId};
