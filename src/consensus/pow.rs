// Proof of Work implementation

use crate::core::Block;
use std::time::{Duration, Instant};

/// How many attempts pass between checks of the abort condition
pub const ABORT_POLL_INTERVAL: u64 = 1_000;

/// Check whether a hex fingerprint has at least `difficulty` leading '0' characters
///
/// This is a prefix test on the hex string, not a leading-zero-bits test.
pub fn meets_difficulty(fingerprint: &str, difficulty: usize) -> bool {
    fingerprint.len() >= difficulty && fingerprint.bytes().take(difficulty).all(|b| b == b'0')
}

/// Proof of Work miner
#[derive(Debug, Clone, Copy)]
pub struct Miner {
    /// Required count of leading zero hex characters
    pub difficulty: usize,
}

impl Miner {
    /// Create a new miner with fixed difficulty
    pub fn new(difficulty: usize) -> Self {
        Self { difficulty }
    }

    /// Mine a block by searching for a nonce that satisfies the difficulty
    ///
    /// Blocks the calling thread until a nonce is found. Only `nonce` and
    /// `fingerprint` of the block are modified.
    pub fn mine(&self, block: &mut Block) -> MiningResult {
        self.search(block, || false)
            .unwrap_or_else(|| unreachable!("search without abort always completes"))
    }

    /// Mine a block, giving up once `abort` returns true
    ///
    /// `abort` is polled every [`ABORT_POLL_INTERVAL`] attempts. Returns
    /// `None` when aborted; the block is then left mid-search.
    pub fn mine_until<F>(&self, block: &mut Block, abort: F) -> Option<MiningResult>
    where
        F: Fn() -> bool,
    {
        self.search(block, abort)
    }

    fn search<F>(&self, block: &mut Block, abort: F) -> Option<MiningResult>
    where
        F: Fn() -> bool,
    {
        let start_time = Instant::now();
        let mut attempts = 0u64;

        loop {
            block.nonce = block.nonce.wrapping_add(1);
            block.fingerprint = block.compute_fingerprint();
            attempts += 1;

            if meets_difficulty(&block.fingerprint, self.difficulty) {
                return Some(MiningResult {
                    nonce: block.nonce,
                    fingerprint: block.fingerprint.clone(),
                    attempts,
                    duration: start_time.elapsed(),
                });
            }

            if attempts % ABORT_POLL_INTERVAL == 0 && abort() {
                log::debug!("Mining aborted after {} attempts", attempts);
                return None;
            }

            // Progress indicator every 100k attempts
            if attempts % 100_000 == 0 {
                let elapsed = start_time.elapsed();
                log::debug!("Mining attempts: {} ({:.1} KH/s)",
                    attempts,
                    attempts as f64 / elapsed.as_secs_f64() / 1000.0
                );
            }
        }
    }
}

/// Mining result
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The nonce that was found
    pub nonce: u64,
    /// The resulting fingerprint
    pub fingerprint: String,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64()
    }
}
