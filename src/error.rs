//! Error types for reachforest.
//!
//! Recoverable failures (bad input, unknown ids, configuration problems) are
//! reported through [`ForestError`]. Broken forest structure is a defect and
//! panics instead.

use reachforest_types::{EdgeId, NodeId};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ForestError>;

#[derive(Debug, Error)]
pub enum ForestError {
    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found")]
    EdgeNotFound(EdgeId),

    #[error("duplicate node id {0}")]
    DuplicateNode(NodeId),

    #[error("duplicate edge {id} ({from} -> {to})")]
    DuplicateEdge {
        id: EdgeId,
        from: NodeId,
        to: NodeId,
    },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "toml")]
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[cfg(feature = "toml")]
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}
