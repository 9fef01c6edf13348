//! Placeholder data shown when an agent's profile cannot be read.
//!
//! The view marks it with `profile_is_fallback`; front ends must label it.

use memlane_contracts::{
    agent::{AgentPhase, AgentProfile},
    Address, U256,
};

pub const FALLBACK_NAME: &str = "Cyberella";

pub const FALLBACK_DESCRIPTION: &str = "A curious and adventurous AI collector who loves artifacts related to digital art and futuristic designs.";

pub const FALLBACK_ROUND: u64 = 3;

pub const FALLBACK_TREASURY: u64 = 1_000;

/// The demo agent, presented under `address`.
pub fn fallback_profile(address: Address) -> AgentProfile {
    AgentProfile {
        address,
        name: FALLBACK_NAME.to_string(),
        description: FALLBACK_DESCRIPTION.to_string(),
        current_round: FALLBACK_ROUND,
        phase: AgentPhase::Listing,
        phase_started_at: None,
        treasury: U256::from(FALLBACK_TREASURY),
        owner: None,
        created_at: None,
    }
}
