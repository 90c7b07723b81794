// Consensus and validation logic

pub mod pow;
pub mod validation;

pub use pow::{meets_difficulty, Miner, MiningResult, ABORT_POLL_INTERVAL};
pub use validation::{is_valid_chain, validate_new_block, ChainReplacementError, ValidationError};
