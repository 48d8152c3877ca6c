//! # Scene Error Types
//!
//! All errors that can occur while editing the scene graph.

use thiserror::Error;

use crate::node::NodeId;

/// Errors that can occur in scene graph operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneError {
    /// The child already has a parent.
    #[error("node {child} is already attached to {parent}")]
    AlreadyAttached {
        /// Node that was being attached.
        child: NodeId,
        /// Its current parent.
        parent: NodeId,
    },

    /// The node is not a child of the given parent.
    #[error("node {child} is not a child of {parent}")]
    NotAChild {
        /// Supposed parent.
        parent: NodeId,
        /// Supposed child.
        child: NodeId,
    },

    /// The node has no parent to be removed from.
    #[error("node {0} has no parent")]
    NoParent(NodeId),

    /// The identifier refers to a despawned node.
    #[error("stale node id {0}")]
    StaleNode(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child} under {parent} would create a cycle")]
    CycleDetected {
        /// Intended parent.
        parent: NodeId,
        /// Intended child.
        child: NodeId,
    },

    /// The operation needs a renderable node.
    #[error("node {0} is not renderable")]
    NotRenderable(NodeId),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
