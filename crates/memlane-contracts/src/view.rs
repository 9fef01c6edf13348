//! Read-only snapshots of the reconciliation store.

use alloy_primitives::Address;
use serde::Serialize;

use crate::{agent::AgentProfile, artifact::Artifact, diary::DiaryEntry};

/// Load lifecycle for the selected agent.
///
/// `Idle → ProfileLoading → ProfileReady → Settled`, with `Failed` reachable
/// from `ProfileLoading`. Refresh re-enters `ProfileLoading` from `Settled`
/// or `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadPhase {
    Idle,
    ProfileLoading,
    ProfileReady,
    Settled,
    Failed,
}

/// What a front end should render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViewStatus {
    NoAgentSelected,
    Loading,
    Ready,
    /// Loading failed; any profile shown is the fallback or the last good one.
    FailedWithFallback,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadingFlags {
    pub profile: bool,
    pub diary: bool,
    pub artifacts: bool,
    pub diary_more: bool,
    pub artifacts_more: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentView {
    pub address: Option<Address>,
    pub phase: LoadPhase,
    pub status: ViewStatus,
    pub profile: Option<AgentProfile>,
    /// True when `profile` is placeholder data rather than a chain read.
    pub profile_is_fallback: bool,
    /// Sorted by round, ascending.
    pub diary_entries: Vec<DiaryEntry>,
    /// Sorted by round, then address.
    pub artifacts: Vec<Artifact>,
    pub loading: LoadingFlags,
    pub last_error: Option<String>,
    pub diary_has_more: bool,
    pub artifacts_has_more: bool,
}
