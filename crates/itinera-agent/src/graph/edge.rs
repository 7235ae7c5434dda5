use crate::conditions::{has_extracted_info, has_pending_tool_calls, has_valid_query};
use crate::state::ConversationState;

use super::node::NodeId;

/// Where an edge leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Node(NodeId),
    /// The terminal marker: execution stops and the state is returned.
    End,
}

/// A transition rule out of a node.
///
/// Conditional variants name every routing outcome exhaustively, so an
/// unmapped label cannot exist at runtime.
#[derive(Debug, Clone, Copy)]
pub enum Edge {
    /// Unconditional transition.
    Direct(Target),
    /// Routes on the validator's verdict.
    OnValidQuery { valid: Target, invalid: Target },
    /// Routes on whether all four trip fields are extracted.
    OnExtractionComplete { complete: Target, incomplete: Target },
    /// Routes on whether the last message requests tool calls.
    OnPendingToolCalls { tools: Target, done: Target },
}

impl Edge {
    /// Pick this edge's target for the given state.
    pub fn resolve(&self, state: &ConversationState) -> Target {
        match *self {
            Edge::Direct(target) => target,
            Edge::OnValidQuery { valid, invalid } => {
                if has_valid_query(state) {
                    valid
                } else {
                    invalid
                }
            }
            Edge::OnExtractionComplete {
                complete,
                incomplete,
            } => {
                if has_extracted_info(state) {
                    complete
                } else {
                    incomplete
                }
            }
            Edge::OnPendingToolCalls { tools, done } => {
                if has_pending_tool_calls(state) {
                    tools
                } else {
                    done
                }
            }
        }
    }
}
