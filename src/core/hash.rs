// Hashing utilities for block fingerprints

use sha2::{Digest, Sha256};
use crate::core::{canonical_timestamp, Transaction};
use chrono::{DateTime, Utc};

/// Single SHA256 hash rendered as lowercase hex
fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Block fingerprint
/// fingerprint = SHA256(parent || canonical(data) || canonical(timestamp) || nonce)
pub fn fingerprint(
    data: &Transaction,
    parent_fingerprint: &str,
    timestamp: &DateTime<Utc>,
    nonce: u64,
) -> String {
    let preimage = format!(
        "{}{}{}{}",
        parent_fingerprint,
        data.canonical(),
        canonical_timestamp(timestamp),
        nonce
    );
    sha256_hex(preimage.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_matches_preimage() {
        let tx = Transaction::new("A", "B", 5.0);
        let preimage = format!(
            "GEN{}{}7",
            r#"{"amount":5,"from":"A","to":"B"}"#,
            "2024-05-01T12:00:00.000000Z"
        );
        let expected = hex::encode(Sha256::digest(preimage.as_bytes()));
        assert_eq!(fingerprint(&tx, "GEN", &at(), 7), expected);
    }

    #[test]
    fn test_fingerprint_deterministic() {
        let tx = Transaction::new("A", "B", 5.0);
        let first = fingerprint(&tx, "GEN", &at(), 1);
        let second = fingerprint(&tx, "GEN", &at(), 1);
        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_sensitive_to_every_input() {
        let tx = Transaction::new("A", "B", 5.0);
        let base = fingerprint(&tx, "GEN", &at(), 1);

        assert_ne!(base, fingerprint(&Transaction::new("A", "B", 6.0), "GEN", &at(), 1));
        assert_ne!(base, fingerprint(&Transaction::new("X", "B", 5.0), "GEN", &at(), 1));
        assert_ne!(base, fingerprint(&tx, "GEM", &at(), 1));
        assert_ne!(base, fingerprint(&tx, "GEN", &(at() + chrono::Duration::microseconds(1)), 1));
        assert_ne!(base, fingerprint(&tx, "GEN", &at(), 2));
    }
}
