// Shared ledger handle - single writer, concurrent readers

use crate::consensus::{ChainReplacementError, Miner, ValidationError};
use crate::core::{Block, Transaction};
use crate::error::Result;
use crate::ledger::{Ledger, SnapshotEntry};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Cloneable handle serializing all mutations of one [`Ledger`]
///
/// Every accepted mutation bumps a tip epoch, which in-flight local
/// mining watches to abandon work on a tip that no longer exists.
#[derive(Clone)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
    epoch: Arc<AtomicU64>,
    mining: Arc<AtomicUsize>,
    restarts: Arc<AtomicU64>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(RwLock::new(ledger)),
            epoch: Arc::new(AtomicU64::new(0)),
            mining: Arc::new(AtomicUsize::new(0)),
            restarts: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of accepted mutations so far
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Whether a local nonce search is running right now
    pub fn is_mining(&self) -> bool {
        self.mining.load(Ordering::Acquire) > 0
    }

    /// How many times local mining was thrown away and restarted on a newer tip
    pub fn restarts(&self) -> u64 {
        self.restarts.load(Ordering::Acquire)
    }

    /// Mine a block for the transfer and append it
    ///
    /// Mining runs on the blocking pool without holding the lock. If the
    /// tip moves in the meantime the block is rebuilt on the new tip and
    /// mined again, so the result is never a stale fork.
    pub async fn add_block(&self, data: Transaction) -> Result<Block> {
        loop {
            let (mut candidate, miner, started_at) = {
                let ledger = self.inner.read().await;
                (
                    ledger.candidate(data.clone()),
                    Miner::new(ledger.difficulty()),
                    self.epoch(),
                )
            };

            let epoch = Arc::clone(&self.epoch);
            self.mining.fetch_add(1, Ordering::AcqRel);
            let mined = tokio::task::spawn_blocking(move || {
                miner
                    .mine_until(&mut candidate, || epoch.load(Ordering::Acquire) != started_at)
                    .map(|result| (candidate, result))
            })
            .await;
            self.mining.fetch_sub(1, Ordering::AcqRel);

            let Some((block, result)) = mined? else {
                self.restarts.fetch_add(1, Ordering::AcqRel);
                log::info!("Chain tip advanced while mining, re-mining on the new tip");
                continue;
            };

            let mut ledger = self.inner.write().await;
            match ledger.append_mined(block.clone()) {
                Ok(()) => {
                    self.epoch.fetch_add(1, Ordering::AcqRel);
                    log::info!(
                        "Mined block {} ({} attempts, {:.1} H/s)",
                        block.fingerprint,
                        result.attempts,
                        result.hash_rate()
                    );
                    return Ok(block);
                }
                Err(err) => {
                    self.restarts.fetch_add(1, Ordering::AcqRel);
                    log::info!("Mined block went stale ({}), re-mining", err);
                }
            }
        }
    }

    /// Validate a peer's block against the tip and append it
    pub async fn receive_block(&self, block: Block) -> std::result::Result<(), ValidationError> {
        let mut ledger = self.inner.write().await;
        ledger.receive_block(block)?;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    /// Adopt a peer's chain if it is longer and valid
    pub async fn replace_chain(
        &self,
        candidate: Vec<Block>,
    ) -> std::result::Result<(), ChainReplacementError> {
        let mut ledger = self.inner.write().await;
        ledger.replace_chain(candidate)?;
        self.epoch.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    pub async fn snapshot(&self) -> Vec<SnapshotEntry> {
        self.inner.read().await.snapshot()
    }

    /// Copy of every block, genesis first
    pub async fn blocks(&self) -> Vec<Block> {
        self.inner.read().await.blocks().to_vec()
    }

    pub async fn tip(&self) -> Block {
        self.inner.read().await.tip().clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_valid(&self) -> bool {
        self.inner.read().await.is_valid()
    }
}
