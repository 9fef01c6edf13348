//! Error taxonomy for the Memory Lane reader.
//!
//! Every fallible operation returns `MemlaneResult<T>`. Variants are split by
//! granularity: single-round and single-artifact failures are swallowed by the
//! scanners, aggregate failures (profile load, first discovery page) reach the
//! caller.

use thiserror::Error;

/// The unified error type for the Memory Lane crates.
#[derive(Debug, Error)]
pub enum MemlaneError {
    /// Every candidate RPC endpoint failed or timed out.
    #[error("transport error: {reason}")]
    Transport { reason: String },

    /// The node answered, but with a JSON-RPC error (typically a revert).
    ///
    /// This says nothing about endpoint health and is never retried.
    #[error("call reverted: {reason}")]
    CallReverted { reason: String },

    /// A response did not match the expected shape.
    #[error("decode error: {reason}")]
    Decode { reason: String },

    /// The first explorer page could not be fetched.
    #[error("agent discovery failed: {reason}")]
    Discovery { reason: String },

    /// A round or slot probe found nothing. Expected, not exceptional.
    #[error("nothing found for {what}")]
    ResolutionGap { what: String },

    /// Dereferencing off-chain content failed.
    #[error("content fetch failed: {reason}")]
    ContentFetch { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    Config { reason: String },

    /// The reconciliation store was used out of order or its lock is poisoned.
    #[error("store error: {reason}")]
    State { reason: String },
}

impl MemlaneError {
    /// True for failures where another attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            MemlaneError::Transport { .. } | MemlaneError::ContentFetch { .. }
        )
    }

    pub fn decode(reason: impl Into<String>) -> Self {
        MemlaneError::Decode {
            reason: reason.into(),
        }
    }

    pub fn gap(what: impl Into<String>) -> Self {
        MemlaneError::ResolutionGap { what: what.into() }
    }

    /// True when a probe found nothing at its position.
    pub fn is_gap(&self) -> bool {
        matches!(self, MemlaneError::ResolutionGap { .. })
    }
}

/// Convenience alias used throughout the Memory Lane crates.
pub type MemlaneResult<T> = Result<T, MemlaneError>;
