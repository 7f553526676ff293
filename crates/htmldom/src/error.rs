//! Error types for DOM operations
//!
//! Flat hierarchy. Lookups and attribute reads never fail; only structural
//! mutations and the input adapters return these.

use crate::types::NodeId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DomError>;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Invalid node type: expected {expected}, got {actual}")]
    InvalidNodeType {
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Node {child} is not a child of node {parent}")]
    NotAChild { parent: NodeId, child: NodeId },

    #[error("Inserting node {child} under node {parent} would create a cycle")]
    HierarchyRequest { parent: NodeId, child: NodeId },

    #[error("Corrupt tree at node {node}: {reason}")]
    CorruptTree { node: NodeId, reason: &'static str },

    #[error("Import error: {0}")]
    Import(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
