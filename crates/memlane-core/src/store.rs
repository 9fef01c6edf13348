//! The reconciliation store: the single mutable view of the selected agent.
//!
//! Async loads complete in any order. Every load is issued against a
//! [`LoadTicket`] taken from the store, and every completion hands the ticket
//! back. A completion whose ticket no longer matches the current selection is
//! discarded on arrival, so switching agents never lets the previous agent's
//! data leak into the new view.
//!
//! Profile loads are also numbered. Overlapping loads for the same selection
//! (a refresh while the first load is still running) complete in any order,
//! and a completion older than the newest one already applied is dropped.
//!
//! Collections only grow through the pure merges in [`crate::merge`], which
//! makes the final state independent of completion order.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use memlane_contracts::{
    agent::AgentProfile,
    artifact::Artifact,
    diary::DiaryEntry,
    error::{MemlaneError, MemlaneResult},
    scan::{ScanCursor, ScanPage},
    view::{AgentView, LoadPhase, LoadingFlags, ViewStatus},
    Address,
};

use crate::merge::{merge_artifacts, merge_diary_entries};

/// Identifies the selection a load was issued for.
///
/// `generation` increments on every real selection change, so `A → B → A`
/// still invalidates loads issued for the first `A`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub address: Address,
    pub generation: u64,
}

/// A [`LoadTicket`] for one profile load, numbered in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProfileTicket {
    pub load: LoadTicket,
    pub seq: u64,
}

/// The two round-indexed collections the store accumulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Diary,
    Artifacts,
}

/// Whether a page came from the first scan or a continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    Initial,
    LoadMore,
}

/// Result of `select_agent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub ticket: LoadTicket,
    /// False when the address was already selected and nothing was reset.
    pub changed: bool,
}

// ── Internal mutable state ────────────────────────────────────────────────────

#[derive(Default)]
struct StoreState {
    address: Option<Address>,
    generation: u64,
    /// Last profile load issued.
    profile_issued: u64,
    /// Newest profile load whose completion was applied.
    profile_applied: u64,
    phase: Option<LoadPhase>,
    profile: Option<AgentProfile>,
    profile_is_fallback: bool,
    diary: Vec<DiaryEntry>,
    artifacts: Vec<Artifact>,
    diary_cursor: Option<ScanCursor>,
    artifact_cursor: Option<ScanCursor>,
    loading: LoadingFlags,
    last_error: Option<String>,
}

impl StoreState {
    fn ticket(&self) -> Option<LoadTicket> {
        self.address.map(|address| LoadTicket {
            address,
            generation: self.generation,
        })
    }

    fn is_current(&self, ticket: &LoadTicket) -> bool {
        self.address == Some(ticket.address) && self.generation == ticket.generation
    }

    /// Accept a profile completion unless the selection moved on or a newer
    /// load already completed.
    fn accept_profile(&mut self, ticket: &ProfileTicket) -> bool {
        if !self.is_current(&ticket.load) || ticket.seq <= self.profile_applied {
            return false;
        }
        self.profile_applied = ticket.seq;
        if ticket.seq == self.profile_issued {
            self.loading.profile = false;
        }
        true
    }

    fn cursor_mut(&mut self, collection: Collection) -> &mut Option<ScanCursor> {
        match collection {
            Collection::Diary => &mut self.diary_cursor,
            Collection::Artifacts => &mut self.artifact_cursor,
        }
    }

    fn set_loading(&mut self, collection: Collection, origin: PageOrigin, value: bool) {
        let flag = match (collection, origin) {
            (Collection::Diary, PageOrigin::Initial) => &mut self.loading.diary,
            (Collection::Diary, PageOrigin::LoadMore) => &mut self.loading.diary_more,
            (Collection::Artifacts, PageOrigin::Initial) => &mut self.loading.artifacts,
            (Collection::Artifacts, PageOrigin::LoadMore) => &mut self.loading.artifacts_more,
        };
        *flag = value;
    }

    fn absorb_cursor(&mut self, collection: Collection, incoming: ScanCursor) {
        let slot = self.cursor_mut(collection);
        *slot = Some(match *slot {
            Some(current) => ScanCursor {
                start_round: current.start_round.min(incoming.start_round),
                end_round: current.end_round.max(incoming.end_round),
                current_round_bound: current.current_round_bound.max(incoming.current_round_bound),
            },
            None => incoming,
        });
    }

    fn settle_if_done(&mut self) {
        if self.phase == Some(LoadPhase::ProfileReady)
            && !self.loading.diary
            && !self.loading.artifacts
        {
            self.phase = Some(LoadPhase::Settled);
        }
    }
}

// ── Public store ──────────────────────────────────────────────────────────────

/// A cloneable handle to one UI session's store.
///
/// Clones share state. Construct one per session and pass it to whatever
/// drives loads.
#[derive(Clone, Default)]
pub struct ReconciliationStore {
    state: Arc<Mutex<StoreState>>,
}

impl ReconciliationStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MemlaneResult<MutexGuard<'_, StoreState>> {
        self.state.lock().map_err(|e| MemlaneError::State {
            reason: format!("store lock poisoned: {}", e),
        })
    }

    /// Select `address`. Re-selecting the current address is a no-op;
    /// any other address resets every collection and invalidates in-flight
    /// loads.
    pub fn select_agent(&self, address: Address) -> MemlaneResult<Selection> {
        let mut state = self.lock()?;
        if let (Some(ticket), true) = (state.ticket(), state.address == Some(address)) {
            debug!(agent = %address, "agent already selected");
            return Ok(Selection {
                ticket,
                changed: false,
            });
        }

        let generation = state.generation + 1;
        *state = StoreState {
            address: Some(address),
            generation,
            phase: Some(LoadPhase::Idle),
            ..StoreState::default()
        };
        info!(agent = %address, generation, "agent selected");

        Ok(Selection {
            ticket: LoadTicket { address, generation },
            changed: true,
        })
    }

    /// The ticket for the current selection, if any.
    pub fn current_ticket(&self) -> MemlaneResult<Option<LoadTicket>> {
        Ok(self.lock()?.ticket())
    }

    /// Enter `ProfileLoading`. Used for the first load and for refresh;
    /// accumulated diary and artifact data are left in place.
    pub fn begin_profile_load(&self) -> MemlaneResult<ProfileTicket> {
        let mut state = self.lock()?;
        let load = state.ticket().ok_or_else(|| MemlaneError::State {
            reason: "no agent selected".into(),
        })?;
        state.profile_issued += 1;
        state.phase = Some(LoadPhase::ProfileLoading);
        state.loading.profile = true;
        Ok(ProfileTicket {
            load,
            seq: state.profile_issued,
        })
    }

    /// Store a freshly read profile. Returns false if the ticket is stale.
    ///
    /// A larger `current_round` extends existing scan cursors so that
    /// load-more can reach rounds that did not exist at the first load.
    pub fn apply_profile(&self, ticket: &ProfileTicket, profile: AgentProfile) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.accept_profile(ticket) {
            debug!(agent = %ticket.load.address, seq = ticket.seq, "discarding stale profile");
            return Ok(false);
        }

        let bound = profile.current_round;
        for collection in [Collection::Diary, Collection::Artifacts] {
            if let Some(cursor) = state.cursor_mut(collection) {
                cursor.current_round_bound = cursor.current_round_bound.max(bound);
            }
        }

        state.profile = Some(profile);
        state.profile_is_fallback = false;
        state.last_error = None;
        state.phase = Some(LoadPhase::ProfileReady);
        Ok(true)
    }

    /// Record a failed profile load.
    ///
    /// `fallback` is shown only when no real profile has been loaded yet; a
    /// failed refresh keeps the last good profile. Continuations already
    /// claimed through [`Self::begin_load_more`] keep their flags.
    pub fn fail_profile(
        &self,
        ticket: &ProfileTicket,
        reason: impl Into<String>,
        fallback: AgentProfile,
    ) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.accept_profile(ticket) {
            debug!(agent = %ticket.load.address, seq = ticket.seq, "discarding stale profile failure");
            return Ok(false);
        }

        if state.profile.is_none() || state.profile_is_fallback {
            state.profile = Some(fallback);
            state.profile_is_fallback = true;
        }
        state.last_error = Some(reason.into());
        state.loading.diary = false;
        state.loading.artifacts = false;
        state.phase = Some(LoadPhase::Failed);
        Ok(true)
    }

    /// Flag an initial collection load as in flight.
    pub fn mark_loading(&self, ticket: &LoadTicket, collection: Collection) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            return Ok(false);
        }
        state.set_loading(collection, PageOrigin::Initial, true);
        Ok(true)
    }

    /// Merge a scanned diary page and advance its cursor.
    pub fn apply_diary_page(
        &self,
        ticket: &LoadTicket,
        origin: PageOrigin,
        page: ScanPage<DiaryEntry>,
    ) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            debug!(agent = %ticket.address, "discarding stale diary page");
            return Ok(false);
        }
        state.diary = merge_diary_entries(&state.diary, &page.items);
        state.absorb_cursor(Collection::Diary, page.cursor);
        state.set_loading(Collection::Diary, origin, false);
        state.settle_if_done();
        Ok(true)
    }

    /// Merge a scanned artifact page and advance its cursor.
    pub fn apply_artifact_page(
        &self,
        ticket: &LoadTicket,
        origin: PageOrigin,
        page: ScanPage<Artifact>,
    ) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            debug!(agent = %ticket.address, "discarding stale artifact page");
            return Ok(false);
        }
        state.artifacts = merge_artifacts(&state.artifacts, &page.items);
        state.absorb_cursor(Collection::Artifacts, page.cursor);
        state.set_loading(Collection::Artifacts, origin, false);
        state.settle_if_done();
        Ok(true)
    }

    /// Merge diary entries without touching cursors or flags.
    pub fn append_diary_entries(&self, ticket: &LoadTicket, entries: &[DiaryEntry]) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            return Ok(false);
        }
        state.diary = merge_diary_entries(&state.diary, entries);
        Ok(true)
    }

    /// Merge artifacts without touching cursors or flags.
    pub fn append_artifacts(&self, ticket: &LoadTicket, artifacts: &[Artifact]) -> MemlaneResult<bool> {
        let mut state = self.lock()?;
        if !state.is_current(ticket) {
            return Ok(false);
        }
        state.artifacts = merge_artifacts(&state.artifacts, artifacts);
        Ok(true)
    }

    /// Claim the continuation for `collection`.
    ///
    /// Returns `None` when nothing is selected, no first page has landed,
    /// the cursor is at its bound, or a continuation is already in flight.
    /// Only the claimant advances the cursor.
    pub fn begin_load_more(&self, collection: Collection) -> MemlaneResult<Option<(LoadTicket, ScanCursor)>> {
        let mut state = self.lock()?;
        let Some(ticket) = state.ticket() else {
            return Ok(None);
        };
        let in_flight = match collection {
            Collection::Diary => state.loading.diary_more,
            Collection::Artifacts => state.loading.artifacts_more,
        };
        if in_flight {
            debug!(?collection, "load more already in flight");
            return Ok(None);
        }
        let Some(cursor) = *state.cursor_mut(collection) else {
            return Ok(None);
        };
        if !cursor.has_more() {
            return Ok(None);
        }
        state.set_loading(collection, PageOrigin::LoadMore, true);
        Ok(Some((ticket, cursor)))
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> MemlaneResult<AgentView> {
        let state = self.lock()?;
        let phase = state.phase.unwrap_or(LoadPhase::Idle);
        let status = match (state.address, phase) {
            (None, _) => ViewStatus::NoAgentSelected,
            (Some(_), LoadPhase::Failed) => ViewStatus::FailedWithFallback,
            (Some(_), LoadPhase::Settled) => ViewStatus::Ready,
            (Some(_), _) => ViewStatus::Loading,
        };

        Ok(AgentView {
            address: state.address,
            phase,
            status,
            profile: state.profile.clone(),
            profile_is_fallback: state.profile_is_fallback,
            diary_entries: state.diary.clone(),
            artifacts: state.artifacts.clone(),
            loading: state.loading,
            last_error: state.last_error.clone(),
            diary_has_more: state.diary_cursor.is_some_and(|c| c.has_more()),
            artifacts_has_more: state.artifact_cursor.is_some_and(|c| c.has_more()),
        })
    }
}
