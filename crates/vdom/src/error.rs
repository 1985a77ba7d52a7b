//! Error types for mirror-tree mutations and diff sessions.

use crate::node::NodeId;
use thiserror::Error;

/// Mutation-sink failure. Fatal to the calling operation, never to the
/// session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum TreeError {
    /// The referenced child is neither realized under the parent nor
    /// queued in any of its pending-insert queues.
    #[error("node {} has no child {}", parent.0, child.0)]
    ChildNotFound { parent: NodeId, child: NodeId },
    /// Structural operation against a text leaf.
    #[error("node {} cannot hold children", node.0)]
    NotAParent { node: NodeId },
}

/// Diff-session state precondition violation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `compare` was called before `init`.
    #[error("nothing to compare; call init first")]
    NotRendered,
}
