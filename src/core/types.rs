// Basic types for the ledger

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Value transfer recorded in a block
///
/// Unauthenticated: sender and recipient are free-form identifiers and
/// the amount is not checked against any balance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    pub from: String,
    pub to: String,
    pub amount: f64,
}

impl Transaction {
    /// Create a new transaction
    pub fn new(from: impl Into<String>, to: impl Into<String>, amount: f64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            amount,
        }
    }

    /// Canonical encoding used as fingerprint input
    /// Keys are always emitted in sorted order: amount, from, to
    pub fn canonical(&self) -> String {
        format!(
            "{{\"amount\":{},\"from\":{},\"to\":{}}}",
            self.amount,
            json_string(&self.from),
            json_string(&self.to),
        )
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.amount)
    }
}

fn json_string(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

/// Current time at the precision carried on the wire
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Canonical timestamp encoding: RFC 3339, UTC, six fractional digits
pub fn canonical_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Serde adapter keeping timestamps in their canonical form on the wire
pub mod timestamp {
    use super::canonical_timestamp;
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&canonical_timestamp(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        let timestamp = DateTime::parse_from_rfc3339(&raw)
            .map(|t| t.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)?;

        // Only the canonical spelling is accepted, so the hashed form and the decoded value agree
        if canonical_timestamp(&timestamp) != raw {
            return Err(serde::de::Error::custom(format!(
                "timestamp {} is not RFC 3339 UTC with six fractional digits",
                raw
            )));
        }
        Ok(timestamp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_canonical_sorted_keys() {
        let tx = Transaction::new("alice", "bob", 5.0);
        assert_eq!(tx.canonical(), r#"{"amount":5,"from":"alice","to":"bob"}"#);
    }

    #[test]
    fn test_canonical_escapes_strings() {
        let tx = Transaction::new("a\"b", "c\nd", 0.25);
        assert_eq!(tx.canonical(), r#"{"amount":0.25,"from":"a\"b","to":"c\nd"}"#);
    }

    #[test]
    fn test_canonical_timestamp_fixed_precision() {
        let t = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(canonical_timestamp(&t), "2024-01-02T03:04:05.000000Z");
    }

    #[test]
    fn test_now_is_truncated_to_micros() {
        let t = now();
        assert_eq!(t.timestamp_subsec_nanos() % 1_000, 0);
    }

    #[test]
    fn test_transaction_json_field_names() {
        let tx = Transaction::new("A", "B", 2.5);
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["from"], "A");
        assert_eq!(json["to"], "B");
        assert_eq!(json["amount"], 2.5);
    }
}
