//! Domain types for the aggregator facade.

use std::fmt;
use std::str::FromStr;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use crate::error::FeedError;

// ─── ContributorId ────────────────────────────────────────────────────────────

/// Opaque identifier of one contributor's submission inside the aggregator.
///
/// Carried on the wire as a single 32-byte ABI word. Short hex input and
/// integers are left-padded with zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributorId(pub B256);

impl ContributorId {
    pub fn as_word(&self) -> &B256 {
        &self.0
    }
}

impl From<u64> for ContributorId {
    fn from(n: u64) -> Self {
        Self(B256::from(U256::from(n).to_be_bytes::<32>()))
    }
}

impl From<B256> for ContributorId {
    fn from(word: B256) -> Self {
        Self(word)
    }
}

impl FromStr for ContributorId {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        if digits.is_empty() || digits.len() > 64 {
            return Err(FeedError::Config(format!("invalid contributor id: {s:?}")));
        }
        let value = U256::from_str_radix(digits, 16)
            .map_err(|_| FeedError::Config(format!("invalid contributor id: {s:?}")))?;
        Ok(Self(B256::from(value.to_be_bytes::<32>())))
    }
}

impl fmt::Display for ContributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── ContributorRecord ────────────────────────────────────────────────────────

/// Point-in-time view of one contributor, assembled by `inspect`.
///
/// Each field comes from a separate read; the record is a best-effort
/// snapshot, not a transactional one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContributorRecord {
    pub id: ContributorId,
    pub owner: Address,
    /// Label with every NUL byte removed.
    pub label: String,
    pub minimum_valid: U256,
    pub value: U256,
    pub available: bool,
}

// ─── UpdateEvent ──────────────────────────────────────────────────────────────

/// A value-update notification decoded from a contract log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub value: U256,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_from_integer_is_left_padded() {
        let id = ContributorId::from(0x2a_u64);
        assert_eq!(id.as_word()[31], 0x2a);
        assert!(id.as_word()[..31].iter().all(|b| *b == 0));
    }

    #[test]
    fn id_parses_short_and_full_hex() {
        let short: ContributorId = "0x2a".parse().unwrap();
        assert_eq!(short, ContributorId::from(42u64));

        let full = format!("0x{}", "ab".repeat(32));
        let parsed: ContributorId = full.parse().unwrap();
        assert_eq!(parsed.to_string(), full);
    }

    #[test]
    fn id_rejects_garbage() {
        assert!("0x".parse::<ContributorId>().is_err());
        assert!("0xzz".parse::<ContributorId>().is_err());
        assert!(format!("0x{}", "1".repeat(65))
            .parse::<ContributorId>()
            .is_err());
    }
}
