//! Scene graph
//!
//! A [`Scene`] owns its nodes in a slot map and hands out [`NodeId`] keys.
//! Parents hold their children's ids, and each child keeps a non-owning id
//! back to its parent that is checked for liveness on every lookup.

mod node;
#[allow(clippy::module_inception)]
mod scene;

pub use node::{Node, NodeType};
pub use scene::Scene;

use thiserror::Error;

slotmap::new_key_type! {
    /// Key of a node inside its [`Scene`]
    pub struct NodeId;
}

/// Scene graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Parent id does not refer to a live node
    #[error("Parent node {0:?} does not exist")]
    InvalidParent(NodeId),

    /// Node id does not refer to a live node
    #[error("Node {0:?} does not exist")]
    NodeNotFound(NodeId),

    /// A node with this name already exists
    #[error("A node named '{0}' already exists in this scene")]
    DuplicateName(String),

    /// Operation requires a different node type
    #[error("Expected a {expected:?} node, found {found:?}")]
    NodeTypeMismatch {
        /// Required type
        expected: NodeType,
        /// Actual type
        found: NodeType,
    },

    /// The root is only reachable through traversal
    #[error("The scene root cannot be modified or removed")]
    RootImmutable,
}

/// Result type for scene operations
pub type SceneResult<T> = Result<T, SceneError>;
