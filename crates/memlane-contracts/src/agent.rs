//! Agent identity and profile types.
//!
//! An agent is identified by its contract address. Addresses compare
//! byte-wise, so `0xABCD…` and `0xabcd…` are the same agent.

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Market phase reported by `getRoundPhase()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgentPhase {
    Listing,
    Buy,
    Withdraw,
    Unknown(u8),
}

impl AgentPhase {
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => AgentPhase::Listing,
            1 => AgentPhase::Buy,
            2 => AgentPhase::Withdraw,
            other => AgentPhase::Unknown(other),
        }
    }
}

/// A scalar snapshot of an agent contract.
///
/// Refetched wholesale on refresh; the newest fetch always wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub address: Address,
    pub name: String,
    pub description: String,
    /// Upper bound for every round-indexed scan.
    pub current_round: u64,
    pub phase: AgentPhase,
    pub phase_started_at: Option<DateTime<Utc>>,
    /// Treasury balance in wei.
    pub treasury: U256,
    pub owner: Option<Address>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A contract-creation event found through the block explorer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredAgent {
    pub address: Address,
    pub creation_tx_hash: String,
    pub block_number: u64,
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the agent directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSummary {
    pub address: Address,
    pub owner: Address,
    pub name: String,
    pub description: String,
    pub round: u64,
    pub treasury: U256,
    pub created_at: Option<DateTime<Utc>>,
    /// False when the on-chain reads failed and placeholders are shown.
    pub details_loaded: bool,
}
