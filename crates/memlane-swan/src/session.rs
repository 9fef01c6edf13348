//! `AgentSession`: drives profile, diary and artifact loads into the
//! reconciliation store.
//!
//! ## Load sequence
//!
//! ```text
//! select_agent(A) ──► begin_profile_load ──► fetch_profile
//!                                               │
//!                           ┌── failed ─────────┴── ok ──┐
//!                           ▼                            ▼
//!                  fail_profile(fallback)         apply_profile
//!                                                        │
//!                                  ┌─────────────────────┴──────────────┐
//!                                  ▼                                    ▼
//!                       diary scan 1..=round                 inventory scan 1..=round
//!                                  │                                    │
//!                                  ▼                                    ▼
//!                          apply_diary_page                    apply_artifact_page
//! ```
//!
//! Each load carries the ticket it was started with. The store drops any
//! completion whose ticket is no longer current, and any profile completion
//! older than one it already applied, so the session never has to cancel
//! anything.

use std::sync::Arc;

use tracing::{info, warn};

use memlane_config::{ContractSettings, ScanSettings};
use memlane_contracts::{error::MemlaneResult, view::AgentView, Address};
use memlane_core::{
    continue_scan, scan_rounds,
    traits::{ContentStore, ContractReader},
    Collection, PageOrigin, ReconciliationStore,
};
use memlane_diary::DiaryResolver;

use crate::artifacts::ArtifactProbe;
use crate::fallback::fallback_profile;
use crate::profile::fetch_profile;

pub struct AgentSession {
    reader: Arc<dyn ContractReader>,
    diary: DiaryResolver,
    store: ReconciliationStore,
    marketplace: Address,
    scan: ScanSettings,
}

impl AgentSession {
    pub fn new(
        reader: Arc<dyn ContractReader>,
        content: Arc<dyn ContentStore>,
        contracts: &ContractSettings,
        scan: ScanSettings,
    ) -> Self {
        Self {
            diary: DiaryResolver::from_settings(reader.clone(), content, contracts),
            reader,
            store: ReconciliationStore::new(),
            marketplace: contracts.marketplace,
            scan,
        }
    }

    /// The store this session writes to. Clones share state.
    pub fn store(&self) -> &ReconciliationStore {
        &self.store
    }

    pub fn view(&self) -> MemlaneResult<AgentView> {
        self.store.view()
    }

    /// Select `address` and load it. Re-selecting the current agent returns
    /// the current view without reloading.
    pub async fn select_agent(&self, address: Address) -> MemlaneResult<AgentView> {
        let selection = self.store.select_agent(address)?;
        if selection.changed {
            self.load().await?;
        }
        self.store.view()
    }

    /// Reload the profile and rescan from round 1. Accumulated entries stay;
    /// the scan can only add to or improve them.
    pub async fn refresh(&self) -> MemlaneResult<AgentView> {
        self.load().await?;
        self.store.view()
    }

    /// Scan the next diary rounds. Returns false when there was nothing to
    /// load, a continuation was already running, or the agent changed.
    pub async fn load_more_diary(&self) -> MemlaneResult<bool> {
        let Some((ticket, cursor)) = self.store.begin_load_more(Collection::Diary)? else {
            return Ok(false);
        };
        let page = continue_scan(&self.diary.for_agent(ticket.address), &cursor, &self.scan).await;
        self.store.apply_diary_page(&ticket, PageOrigin::LoadMore, page)
    }

    /// Scan the next artifact rounds; see [`Self::load_more_diary`].
    pub async fn load_more_artifacts(&self) -> MemlaneResult<bool> {
        let Some((ticket, cursor)) = self.store.begin_load_more(Collection::Artifacts)? else {
            return Ok(false);
        };
        let probe = ArtifactProbe::new(self.reader.clone(), self.marketplace, ticket.address);
        let page = continue_scan(&probe, &cursor, &self.scan).await;
        self.store.apply_artifact_page(&ticket, PageOrigin::LoadMore, page)
    }

    async fn load(&self) -> MemlaneResult<()> {
        let profile_ticket = self.store.begin_profile_load()?;
        let ticket = profile_ticket.load;
        let agent = ticket.address;

        let profile = match fetch_profile(&*self.reader, agent).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(agent = %agent, error = %e, "profile load failed, showing fallback");
                self.store.fail_profile(&profile_ticket, e.to_string(), fallback_profile(agent))?;
                return Ok(());
            }
        };

        let bound = profile.current_round;
        if !self.store.apply_profile(&profile_ticket, profile)? {
            return Ok(());
        }
        info!(agent = %agent, current_round = bound, "profile ready, scanning rounds");

        self.store.mark_loading(&ticket, Collection::Diary)?;
        self.store.mark_loading(&ticket, Collection::Artifacts)?;

        let diary = async {
            let page = scan_rounds(&self.diary.for_agent(agent), 1, bound, &self.scan).await;
            self.store.apply_diary_page(&ticket, PageOrigin::Initial, page)
        };
        let artifacts = async {
            let probe = ArtifactProbe::new(self.reader.clone(), self.marketplace, agent);
            let page = scan_rounds(&probe, 1, bound, &self.scan).await;
            self.store.apply_artifact_page(&ticket, PageOrigin::Initial, page)
        };

        let (diary, artifacts) = tokio::join!(diary, artifacts);
        diary?;
        artifacts?;
        Ok(())
    }
}
