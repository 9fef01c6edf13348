//! Raw oracle payloads and their text decoding.
//!
//! Oracle output reaches us in one of three shapes depending on the client
//! path: an already-decoded string, a byte array, or a `0x`-prefixed hex
//! string that still needs hex→UTF-8 decoding. `RawValue` names the shape
//! explicitly so decoding never sniffs types at runtime.

use crate::error::{MemlaneError, MemlaneResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Text(String),
    Bytes(Vec<u8>),
    Hex(String),
}

impl RawValue {
    /// Classify a plain string: `0x` followed by even-length hex is `Hex`.
    pub fn from_str_value(value: &str) -> Self {
        if looks_like_hex(value) {
            RawValue::Hex(value.trim().to_string())
        } else {
            RawValue::Text(value.to_string())
        }
    }

    /// Classify a `bytes` return. Oracles that hex-encode their output
    /// before storing it produce ASCII `0x…`; that is `Hex`.
    pub fn from_payload(payload: &[u8]) -> Self {
        match std::str::from_utf8(payload) {
            Ok(text) if looks_like_hex(text) => RawValue::Hex(text.trim().to_string()),
            _ => RawValue::Bytes(payload.to_vec()),
        }
    }

    /// Decode to text. Invalid UTF-8 sequences become U+FFFD.
    pub fn decode_text(&self) -> MemlaneResult<String> {
        match self {
            RawValue::Text(text) => Ok(text.clone()),
            RawValue::Bytes(bytes) => Ok(String::from_utf8_lossy(bytes).into_owned()),
            RawValue::Hex(hex_str) => {
                let digits = strip_hex_prefix(hex_str);
                let bytes = hex::decode(digits)
                    .map_err(|e| MemlaneError::decode(format!("invalid hex payload: {e}")))?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}

fn strip_hex_prefix(value: &str) -> &str {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value)
}

fn looks_like_hex(value: &str) -> bool {
    let trimmed = value.trim();
    if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
        return false;
    }
    let digits = strip_hex_prefix(trimmed);
    digits.len() % 2 == 0 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}
