// Block data structures

use crate::core::{fingerprint, now, Transaction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Agreed fingerprint of the genesis block (not computed, not mined)
pub const GENESIS_FINGERPRINT: &str = "0 Hello Mel";

/// Block - one value transfer linked to its parent by fingerprint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Transfer recorded in this block
    pub data: Transaction,
    /// Hex digest over data, parent fingerprint, timestamp and nonce
    pub fingerprint: String,
    /// Fingerprint of the preceding block
    pub parent_fingerprint: String,
    /// Creation time (microsecond precision)
    #[serde(with = "crate::core::timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Nonce for proof-of-work
    pub nonce: u64,
}

impl Block {
    /// Create an unmined block on top of `parent_fingerprint`
    /// The fingerprint stays empty until the block is mined
    pub fn new(data: Transaction, parent_fingerprint: impl Into<String>) -> Self {
        Self {
            data,
            fingerprint: String::new(),
            parent_fingerprint: parent_fingerprint.into(),
            timestamp: now(),
            nonce: 0,
        }
    }

    /// Create the genesis block with the given constant fingerprint
    pub fn genesis(fingerprint: impl Into<String>) -> Self {
        Self {
            data: Transaction::default(),
            fingerprint: fingerprint.into(),
            parent_fingerprint: String::new(),
            timestamp: DateTime::<Utc>::UNIX_EPOCH,
            nonce: 0,
        }
    }

    /// Recompute the fingerprint from the block's current fields
    pub fn compute_fingerprint(&self) -> String {
        fingerprint(&self.data, &self.parent_fingerprint, &self.timestamp, self.nonce)
    }

    /// Check that the stored fingerprint matches the block's contents
    pub fn has_valid_fingerprint(&self) -> bool {
        self.fingerprint == self.compute_fingerprint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_block_links_parent() {
        let block = Block::new(Transaction::new("A", "B", 1.0), "abc");
        assert_eq!(block.parent_fingerprint, "abc");
        assert_eq!(block.nonce, 0);
        assert!(block.fingerprint.is_empty());
    }

    #[test]
    fn test_genesis_block() {
        let genesis = Block::genesis(GENESIS_FINGERPRINT);
        assert_eq!(genesis.fingerprint, GENESIS_FINGERPRINT);
        assert!(genesis.parent_fingerprint.is_empty());
        assert_eq!(genesis.data, Transaction::default());

        // Genesis is deterministic across nodes
        assert_eq!(genesis, Block::genesis(GENESIS_FINGERPRINT));
    }

    #[test]
    fn test_tampering_breaks_fingerprint() {
        let mut block = Block::new(Transaction::new("A", "B", 1.0), "abc");
        block.fingerprint = block.compute_fingerprint();
        assert!(block.has_valid_fingerprint());

        block.data.amount = 2.0;
        assert!(!block.has_valid_fingerprint());
    }

    #[test]
    fn test_wire_format() {
        let mut block = Block::new(Transaction::new("A", "B", 5.0), "GEN");
        block.fingerprint = block.compute_fingerprint();

        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["data"]["from"], "A");
        assert_eq!(json["data"]["to"], "B");
        assert_eq!(json["parentFingerprint"], "GEN");
        assert_eq!(json["fingerprint"], block.fingerprint.as_str());
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));

        // Fingerprint survives the trip through JSON
        let decoded: Block = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, block);
        assert!(decoded.has_valid_fingerprint());
    }

    #[test]
    fn test_non_canonical_timestamps_rejected() {
        let mut block = Block::new(Transaction::new("A", "B", 5.0), "GEN");
        block.fingerprint = block.compute_fingerprint();
        let json = serde_json::to_value(&block).unwrap();

        // Nanoseconds would be dropped by the fingerprint, offsets would change the wire form
        for raw in [
            "2025-03-04T10:11:16.268535999Z",
            "2025-03-04T10:11:16.268535+00:00",
            "2025-03-04T10:11:16Z",
        ] {
            let mut tampered = json.clone();
            tampered["timestamp"] = serde_json::Value::from(raw);
            assert!(serde_json::from_value::<Block>(tampered).is_err(), "{} accepted", raw);
        }

        let mut canonical = json.clone();
        canonical["timestamp"] = serde_json::Value::from("2025-03-04T10:11:16.268535Z");
        let decoded: Block = serde_json::from_value(canonical).unwrap();
        assert_eq!(decoded.timestamp.timestamp_subsec_micros(), 268_535);
    }
}
