// Block and chain validation

use crate::core::Block;

/// Single-block validation error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Parent fingerprint doesn't match the previous block's fingerprint
    ParentMismatch { expected: String, found: String },
    /// Stored fingerprint doesn't match the recomputed one
    /// (covers both tampered fields and an unmet proof of work)
    FingerprintMismatch { expected: String, found: String },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ValidationError::ParentMismatch { expected, found } => {
                write!(f, "Parent fingerprint mismatch: expected {}, found {}", expected, found)
            }
            ValidationError::FingerprintMismatch { expected, found } => {
                write!(f, "Fingerprint mismatch: computed {}, stored {}", expected, found)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Fork-choice rejection reasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainReplacementError {
    /// Candidate is not strictly longer than the local chain
    NotLonger { candidate: usize, local: usize },
    /// Candidate fails the whole-chain validity check
    InvalidChain,
}

impl std::fmt::Display for ChainReplacementError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChainReplacementError::NotLonger { candidate, local } => write!(
                f,
                "Chain not longer than local chain ({} <= {} blocks)",
                candidate, local
            ),
            ChainReplacementError::InvalidChain => write!(f, "Received invalid chain"),
        }
    }
}

impl std::error::Error for ChainReplacementError {}

/// Validate a candidate block against the block it claims to follow
pub fn validate_new_block(candidate: &Block, previous: &Block) -> Result<(), ValidationError> {
    if previous.fingerprint != candidate.parent_fingerprint {
        return Err(ValidationError::ParentMismatch {
            expected: previous.fingerprint.clone(),
            found: candidate.parent_fingerprint.clone(),
        });
    }

    let computed = candidate.compute_fingerprint();
    if computed != candidate.fingerprint {
        return Err(ValidationError::FingerprintMismatch {
            expected: computed,
            found: candidate.fingerprint.clone(),
        });
    }

    Ok(())
}

/// Check that every non-genesis block is correctly fingerprinted and linked
///
/// The block at index 0 is exempt. A single violation fails the whole chain.
pub fn is_valid_chain(chain: &[Block]) -> bool {
    chain
        .windows(2)
        .all(|pair| validate_new_block(&pair[1], &pair[0]).is_ok())
}
