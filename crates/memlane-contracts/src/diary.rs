//! Diary entries.
//!
//! An entry is keyed by its round. Entries only ever improve: a resolved body
//! replaces a placeholder, never the other way round.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse sentiment label from bag-of-words counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

/// How far an entry's body got through resolution.
///
/// Ordered: a later variant dominates an earlier one during merges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContentStatus {
    /// Off-chain dereference failed; the body is a placeholder naming the reason.
    Unresolved,
    /// The body is the final text, inline or fetched.
    Resolved,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub round: u64,
    pub content: String,
    pub status: ContentStatus,
    pub timestamp: DateTime<Utc>,
    pub sentiment: Sentiment,
    /// Continuous score in [-1, 1].
    pub sentiment_score: f64,
    pub decisions: Vec<String>,
    /// Content-addressed reference (Arweave transaction id), when one was used.
    pub content_ref: Option<String>,
}

impl DiaryEntry {
    /// Rank used by merges: blank bodies rank below everything else.
    pub fn completeness(&self) -> u8 {
        if self.content.trim().is_empty() {
            return 0;
        }
        match self.status {
            ContentStatus::Unresolved => 1,
            ContentStatus::Resolved => 2,
        }
    }

    /// True when `self` should replace `other` for the same round.
    pub fn dominates(&self, other: &DiaryEntry) -> bool {
        self.completeness() > other.completeness()
    }
}
