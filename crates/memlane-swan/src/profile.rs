//! Agent profile reads.

use chrono::{DateTime, Utc};
use futures::try_join;
use tracing::debug;

use memlane_contracts::{
    agent::{AgentPhase, AgentProfile},
    error::MemlaneResult,
    swan::{to_u64, SwanAgent},
    Address, SolCall,
};
use memlane_core::traits::{ContractCall, ContractReader};

/// `(round, phase, phase timestamp)` from `getRoundPhase()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundPhase {
    pub round: u64,
    pub phase: AgentPhase,
    pub started_at: Option<DateTime<Utc>>,
}

/// Read the four required profile fields concurrently, plus `owner` and
/// `createdAt` best-effort.
///
/// Any required read failing fails the whole profile.
pub async fn fetch_profile(reader: &dyn ContractReader, address: Address) -> MemlaneResult<AgentProfile> {
    let (name, description, round_phase, treasury) = try_join!(
        reader.read(address, SwanAgent::nameCall {}),
        reader.read(address, SwanAgent::descriptionCall {}),
        read_round_phase(reader, address),
        reader.read(address, SwanAgent::treasuryCall {}),
    )?;

    let (owner, created_at) = futures::join!(
        optional_read(reader, address, SwanAgent::ownerCall {}),
        optional_read(reader, address, SwanAgent::createdAtCall {}),
    );

    let profile = AgentProfile {
        address,
        name: name._0,
        description: description._0,
        current_round: round_phase.round,
        phase: round_phase.phase,
        phase_started_at: round_phase.started_at,
        treasury: treasury._0,
        owner: owner.map(|r| r._0).filter(|a| !a.is_zero()),
        created_at: created_at
            .and_then(|r| to_u64(r._0, "createdAt").ok())
            .and_then(unix_time),
    };
    debug!(agent = %address, round = profile.current_round, "profile loaded");
    Ok(profile)
}

pub async fn read_round_phase(reader: &dyn ContractReader, address: Address) -> MemlaneResult<RoundPhase> {
    let SwanAgent::getRoundPhaseReturn { round, phase, timestamp } =
        reader.read(address, SwanAgent::getRoundPhaseCall {}).await?;

    Ok(RoundPhase {
        round: to_u64(round, "round")?,
        phase: AgentPhase::from_code(phase),
        started_at: unix_time(to_u64(timestamp, "phase timestamp")?),
    })
}

async fn optional_read<C>(reader: &dyn ContractReader, address: Address, call: C) -> Option<C::Return>
where
    C: SolCall + Send + Sync,
{
    match reader.read(address, call).await {
        Ok(value) => Some(value),
        Err(e) => {
            debug!(agent = %address, function = C::SIGNATURE, error = %e, "optional read failed");
            None
        }
    }
}

/// Seconds since the epoch; zero means unset.
pub(crate) fn unix_time(seconds: u64) -> Option<DateTime<Utc>> {
    if seconds == 0 {
        return None;
    }
    DateTime::from_timestamp(i64::try_from(seconds).ok()?, 0)
}
