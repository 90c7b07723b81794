// Ledger - owns the block sequence and applies the fork-choice rule

mod shared;

pub use shared::SharedLedger;

use crate::consensus::{is_valid_chain, validate_new_block, ChainReplacementError, Miner, ValidationError};
use crate::core::{Block, Transaction, GENESIS_FINGERPRINT};
use std::fmt;

/// Lifecycle state of a ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerState {
    /// Only the genesis block is present
    Bootstrapped,
    /// At least one real block has been accepted
    Growing,
}

/// Display row for one non-genesis block
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotEntry {
    pub sender: String,
    pub recipient: String,
    pub amount: f64,
    pub nonce: u64,
}

impl fmt::Display for SnapshotEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Transaction: {} -> {}: {}, Nonce: {}",
            self.sender, self.recipient, self.amount, self.nonce
        )
    }
}

/// Append-only chain of blocks
#[derive(Debug, Clone)]
pub struct Ledger {
    chain: Vec<Block>,
    difficulty: usize,
}

impl Ledger {
    /// Create a ledger holding only the default genesis block
    pub fn new(difficulty: usize) -> Self {
        Self::with_genesis_fingerprint(difficulty, GENESIS_FINGERPRINT)
    }

    /// Create a ledger whose genesis carries the given constant fingerprint
    pub fn with_genesis_fingerprint(difficulty: usize, fingerprint: impl Into<String>) -> Self {
        Self {
            chain: vec![Block::genesis(fingerprint)],
            difficulty,
        }
    }

    /// Difficulty used for local mining
    pub fn difficulty(&self) -> usize {
        self.difficulty
    }

    /// All blocks, genesis first
    pub fn blocks(&self) -> &[Block] {
        &self.chain
    }

    /// Most recent block
    pub fn tip(&self) -> &Block {
        // The chain always holds at least the genesis block
        &self.chain[self.chain.len() - 1]
    }

    /// Number of blocks, genesis included, so never zero
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn state(&self) -> LedgerState {
        if self.chain.len() > 1 {
            LedgerState::Growing
        } else {
            LedgerState::Bootstrapped
        }
    }

    /// Mine a new block for the transfer and append it
    ///
    /// Runs the proof-of-work search on the calling thread.
    pub fn add_block(&mut self, from: &str, to: &str, amount: f64) -> &Block {
        let mut block = self.candidate(Transaction::new(from, to, amount));
        let result = Miner::new(self.difficulty).mine(&mut block);
        log::debug!("Mined block with nonce {} in {} attempts", result.nonce, result.attempts);

        self.chain.push(block);
        self.tip()
    }

    /// Build an unmined block on top of the current tip
    pub fn candidate(&self, data: Transaction) -> Block {
        Block::new(data, self.tip().fingerprint.clone())
    }

    /// Append a block mined from [`Ledger::candidate`]
    ///
    /// The parent is re-checked against the tip at append time, so a
    /// block mined on a tip that has since moved is rejected as stale.
    pub fn append_mined(&mut self, block: Block) -> Result<(), ValidationError> {
        self.receive_block(block)
    }

    /// Validate a peer's block against the tip and append it
    pub fn receive_block(&mut self, block: Block) -> Result<(), ValidationError> {
        validate_new_block(&block, self.tip())?;
        self.chain.push(block);
        Ok(())
    }

    /// Check the whole local chain
    pub fn is_valid(&self) -> bool {
        is_valid_chain(&self.chain)
    }

    /// Replace the local chain with a longer valid one
    pub fn replace_chain(&mut self, candidate: Vec<Block>) -> Result<(), ChainReplacementError> {
        if candidate.len() <= self.chain.len() {
            return Err(ChainReplacementError::NotLonger {
                candidate: candidate.len(),
                local: self.chain.len(),
            });
        }

        if !is_valid_chain(&candidate) {
            return Err(ChainReplacementError::InvalidChain);
        }

        self.chain = candidate;
        Ok(())
    }

    /// Transfers and nonces of every non-genesis block, in chain order
    pub fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.chain
            .iter()
            .skip(1)
            .map(|block| SnapshotEntry {
                sender: block.data.from.clone(),
                recipient: block.data.to.clone(),
                amount: block.data.amount,
                nonce: block.nonce,
            })
            .collect()
    }

    #[cfg(test)]
    pub(crate) fn blocks_mut(&mut self) -> &mut Vec<Block> {
        &mut self.chain
    }
}
