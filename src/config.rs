// Node configuration

use crate::error::{NodeError, Result};
use std::net::SocketAddr;

/// Longest possible run of leading zeros in a SHA-256 hex fingerprint
pub const MAX_DIFFICULTY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeConfig {
    /// Name attached to every outgoing message
    pub name: String,
    /// Address the node accepts peer connections on
    pub listen_addr: SocketAddr,
    /// Peer to request chains from and broadcast blocks to
    pub peer: Option<SocketAddr>,
    /// Leading zero hex characters required of locally mined blocks
    pub difficulty: usize,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            name: "Node".to_string(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            peer: None,
            difficulty: 2,
        }
    }
}

impl NodeConfig {
    /// Reject values the protocol or the miner cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(NodeError::Config("name must not be empty".to_string()));
        }
        if self.name.contains([':', '\n', '\r']) {
            return Err(NodeError::Config(format!(
                "name {:?} must not contain ':' or line breaks",
                self.name
            )));
        }
        if self.difficulty > MAX_DIFFICULTY {
            return Err(NodeError::Config(format!(
                "difficulty {} exceeds the maximum of {}",
                self.difficulty, MAX_DIFFICULTY
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = NodeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.listen_addr.port(), 3000);
        assert_eq!(config.difficulty, 2);
    }

    #[test]
    fn test_rejects_bad_names() {
        for name in ["", "a:b", "a\nb"] {
            let config = NodeConfig { name: name.to_string(), ..NodeConfig::default() };
            assert!(matches!(config.validate(), Err(NodeError::Config(_))), "{:?}", name);
        }
    }

    #[test]
    fn test_rejects_unreachable_difficulty() {
        let config = NodeConfig { difficulty: MAX_DIFFICULTY + 1, ..NodeConfig::default() };
        assert!(config.validate().is_err());

        let config = NodeConfig { difficulty: MAX_DIFFICULTY, ..NodeConfig::default() };
        assert!(config.validate().is_ok());
    }
}
