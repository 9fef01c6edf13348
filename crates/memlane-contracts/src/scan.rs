//! Round-scan parameters, cursors, and pages.
//!
//! A scan walks rounds `1..=current_round_bound` in fixed-size batches. The
//! cursor returned with each page is an immutable value; continuing a scan
//! means passing the previous page's cursor back in.

use serde::{Deserialize, Serialize};

/// Knobs for one bounded search over rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Rounds probed per batch.
    pub batch_size: u64,
    /// Stop after the batch in which this many results have accumulated.
    pub target: usize,
    /// Maximum number of batches per scan call.
    pub max_batches: u32,
    /// Hard cap on slots probed within a single round.
    pub max_slots_per_round: u64,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            batch_size: 10,
            target: 10,
            max_batches: 3,
            max_slots_per_round: 64,
        }
    }
}

/// Position of a scan within `1..=current_round_bound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanCursor {
    pub start_round: u64,
    /// Last round probed; `start_round - 1` when nothing was probed.
    pub end_round: u64,
    pub current_round_bound: u64,
}

impl ScanCursor {
    /// True while rounds above `end_round` remain under the bound.
    pub fn has_more(&self) -> bool {
        self.end_round < self.current_round_bound
    }

    /// First round a continuation would probe.
    pub fn next_round(&self) -> u64 {
        self.end_round.saturating_add(1).max(1)
    }
}

/// Results of one scan call plus the cursor to continue from.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanPage<T> {
    pub items: Vec<T>,
    pub cursor: ScanCursor,
}

/// What a single `(round, slot)` probe found.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotOutcome<T> {
    Found(T),
    /// The slot exists but could not be turned into a result; keep scanning.
    Hole,
    /// Sentinel: no slots at or after this index in the round.
    Exhausted,
}
