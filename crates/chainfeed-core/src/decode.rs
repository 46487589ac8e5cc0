//! Decoding of the loosely-typed payloads the node hands back.

use alloy_primitives::U256;
use serde_json::Value;

use crate::error::FeedError;
use crate::types::UpdateEvent;

/// Index of the topic carrying the updated value in an update log.
pub const VALUE_TOPIC_INDEX: usize = 1;

/// Decode a fixed-width label, dropping every NUL byte (padding and embedded).
pub fn decode_label(raw: &[u8]) -> String {
    let bytes: Vec<u8> = raw.iter().copied().filter(|b| *b != 0).collect();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Parse a hex quantity or 32-byte topic (`0x`-prefixed or bare) into a `U256`.
///
/// `"0x"` is read as zero.
pub fn parse_quantity(s: &str) -> Option<U256> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    if digits.len() > 64 {
        return None;
    }
    U256::from_str_radix(digits, 16).ok()
}

/// Decode one delivered log entry into an [`UpdateEvent`].
///
/// `Value::Null` stands for a missing entry. Anything without a usable
/// value topic is reported as [`FeedError::MalformedEvent`].
pub fn decode_update(entry: &Value) -> Result<UpdateEvent, FeedError> {
    let topics = match entry.get("topics") {
        Some(Value::Array(topics)) if !topics.is_empty() => topics,
        _ => return Err(FeedError::MalformedEvent(describe(entry))),
    };

    let value = topics
        .get(VALUE_TOPIC_INDEX)
        .and_then(Value::as_str)
        .and_then(parse_quantity)
        .ok_or_else(|| FeedError::MalformedEvent(describe(entry)))?;

    Ok(UpdateEvent { value })
}

fn describe(entry: &Value) -> String {
    match entry {
        Value::Null => "undefined".to_string(),
        other => other.to_string(),
    }
}
