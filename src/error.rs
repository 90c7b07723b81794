// Error types for the node (transport, console and start-up)

use crate::consensus::{ChainReplacementError, ValidationError};
use std::fmt;

#[derive(Debug)]
pub enum NodeError {
    Io(std::io::Error),
    Codec(serde_json::Error),
    Protocol(String),
    Validation(ValidationError),
    Replacement(ChainReplacementError),
    Mining(String),
    Config(String),
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeError::Io(err) => write!(f, "IO error: {}", err),
            NodeError::Codec(err) => write!(f, "Codec error: {}", err),
            NodeError::Protocol(msg) => write!(f, "Protocol error: {}", msg),
            NodeError::Validation(err) => write!(f, "Block rejected: {}", err),
            NodeError::Replacement(err) => write!(f, "Chain rejected: {}", err),
            NodeError::Mining(msg) => write!(f, "Mining error: {}", msg),
            NodeError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for NodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NodeError::Io(err) => Some(err),
            NodeError::Codec(err) => Some(err),
            NodeError::Validation(err) => Some(err),
            NodeError::Replacement(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for NodeError {
    fn from(err: std::io::Error) -> Self {
        NodeError::Io(err)
    }
}

impl From<serde_json::Error> for NodeError {
    fn from(err: serde_json::Error) -> Self {
        NodeError::Codec(err)
    }
}

impl From<ValidationError> for NodeError {
    fn from(err: ValidationError) -> Self {
        NodeError::Validation(err)
    }
}

impl From<ChainReplacementError> for NodeError {
    fn from(err: ChainReplacementError) -> Self {
        NodeError::Replacement(err)
    }
}

impl From<tokio::task::JoinError> for NodeError {
    fn from(err: tokio::task::JoinError) -> Self {
        NodeError::Mining(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, NodeError>;
