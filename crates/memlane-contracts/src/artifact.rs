//! Artifacts and marketplace listings.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Unlisted,
    Listed,
    Sold,
}

impl ListingStatus {
    /// Map the marketplace's `ArtifactStatus` enum; unknown codes are unlisted.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => ListingStatus::Listed,
            2 => ListingStatus::Sold,
            _ => ListingStatus::Unlisted,
        }
    }
}

/// The marketplace's record for one artifact, as returned by `getListing`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub created_at: u64,
    pub listing_fee: U256,
    pub price: U256,
    pub seller: Address,
    pub agent: Address,
    pub round: u64,
    pub status: ListingStatus,
}

/// An artifact, deduplicated by `address` across every fetch that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub address: Address,
    pub round: u64,
    pub name: String,
    pub symbol: String,
    pub description: String,
    /// Price in wei.
    pub price: U256,
    pub created_at: Option<DateTime<Utc>>,
    pub status: ListingStatus,
    pub seller: Address,
}

impl Artifact {
    pub fn completeness(&self) -> u8 {
        u8::from(!self.name.is_empty()) + u8::from(!self.description.is_empty())
    }
}
