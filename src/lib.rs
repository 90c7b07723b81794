// Educational proof-of-work ledger
// Hash-linked blocks, nonce mining and longest-valid-chain replication

pub mod core;
pub mod consensus;
pub mod ledger;
pub mod network;
pub mod config;
pub mod error;
pub mod cli;

// Re-exports for convenience
pub use crate::core::{Block, Transaction, GENESIS_FINGERPRINT};
pub use crate::consensus::{is_valid_chain, Miner, MiningResult, ValidationError, ChainReplacementError};
pub use crate::ledger::{Ledger, LedgerState, SharedLedger, SnapshotEntry};
pub use crate::network::{Envelope, Message, Node, Peer};
pub use crate::config::NodeConfig;
pub use crate::error::NodeError;
pub use crate::cli::{Cli, Command, Console};
