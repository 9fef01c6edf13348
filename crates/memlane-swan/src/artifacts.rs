//! Artifact lookups: per-round inventory probing and the marketplace's
//! listed-artifacts index.

use std::sync::Arc;

use async_trait::async_trait;
use futures::{future::join_all, try_join};
use tracing::{debug, warn};

use memlane_contracts::{
    artifact::{Artifact, Listing, ListingStatus},
    error::{MemlaneError, MemlaneResult},
    scan::SlotOutcome,
    swan::{to_u64, SwanAgent, SwanArtifact, SwanMarketplace},
    value::RawValue,
    Address, U256,
};
use memlane_core::traits::{ContractCall, ContractReader, RoundProbe};

use crate::profile::unix_time;

/// Walks `inventory(round, slot)` on an agent contract.
///
/// A reverted read or the zero address ends the round; an artifact whose
/// details cannot be read is a hole.
pub struct ArtifactProbe {
    reader: Arc<dyn ContractReader>,
    marketplace: Address,
    agent: Address,
}

impl ArtifactProbe {
    pub fn new(reader: Arc<dyn ContractReader>, marketplace: Address, agent: Address) -> Self {
        Self {
            reader,
            marketplace,
            agent,
        }
    }

    /// The artifact in `slot` of `round`. An empty slot is a `ResolutionGap`.
    async fn inventory_slot(&self, round: u64, slot: u64) -> MemlaneResult<Address> {
        let call = SwanAgent::inventoryCall {
            round: U256::from(round),
            index: U256::from(slot),
        };
        let item = self.reader.read(self.agent, call).await?._0;
        if item.is_zero() {
            return Err(MemlaneError::gap(format!("inventory slot {slot} of round {round} is empty")));
        }
        Ok(item)
    }
}

#[async_trait]
impl RoundProbe for ArtifactProbe {
    type Item = Artifact;

    async fn probe(&self, round: u64, slot: u64) -> MemlaneResult<SlotOutcome<Artifact>> {
        let item = match self.inventory_slot(round, slot).await {
            Ok(item) => item,
            Err(e @ (MemlaneError::CallReverted { .. } | MemlaneError::ResolutionGap { .. })) => {
                debug!(agent = %self.agent, round, slot, reason = %e, "inventory exhausted");
                return Ok(SlotOutcome::Exhausted);
            }
            Err(e) => return Err(e),
        };

        match fetch_artifact(&*self.reader, self.marketplace, item, self.agent, round).await {
            Ok(artifact) => Ok(SlotOutcome::Found(artifact)),
            Err(e) => {
                warn!(agent = %self.agent, round, slot, artifact = %item, error = %e, "artifact details unavailable");
                Ok(SlotOutcome::Hole)
            }
        }
    }
}

/// Hydrate one artifact from its listing and its own contract.
///
/// `round` is used when the listing does not carry one.
pub async fn fetch_artifact(
    reader: &dyn ContractReader,
    marketplace_address: Address,
    artifact: Address,
    agent: Address,
    round: u64,
) -> MemlaneResult<Artifact> {
    let (listing, name, symbol, description) = try_join!(
        reader.read(marketplace_address, SwanMarketplace::getListingCall { artifact }),
        reader.read(artifact, SwanArtifact::nameCall {}),
        reader.read(artifact, SwanArtifact::symbolCall {}),
        reader.read(artifact, SwanArtifact::descriptionCall {}),
    )?;
    let listing = decode_listing(&listing._0)?;

    let created_at = match listing.created_at {
        0 => match reader.read(artifact, SwanArtifact::createdAtCall {}).await {
            Ok(value) => to_u64(value._0, "createdAt").ok().and_then(unix_time),
            Err(e) => {
                debug!(artifact = %artifact, error = %e, "artifact createdAt unavailable");
                None
            }
        },
        seconds => unix_time(seconds),
    };

    Ok(Artifact {
        address: artifact,
        round: if listing.round == 0 { round } else { listing.round },
        name: name._0,
        symbol: symbol._0,
        description: RawValue::from_payload(&description._0).decode_text()?,
        price: listing.price,
        created_at,
        status: listing.status,
        seller: if listing.seller.is_zero() { agent } else { listing.seller },
    })
}

/// Narrow a marketplace listing record.
pub fn decode_listing(record: &SwanMarketplace::ArtifactListing) -> MemlaneResult<Listing> {
    Ok(Listing {
        created_at: to_u64(record.createdAt, "listing createdAt")?,
        listing_fee: U256::from(record.listingFee),
        price: record.price,
        seller: record.seller,
        agent: record.agent,
        round: to_u64(record.round, "listing round")?,
        status: ListingStatus::from_code(record.status),
    })
}

/// Artifacts the marketplace lists for `agent` in `round`.
///
/// An artifact whose details fail to load is dropped; the index read failing
/// fails the call.
pub async fn fetch_listed_artifacts(
    reader: &dyn ContractReader,
    marketplace_address: Address,
    agent: Address,
    round: u64,
) -> MemlaneResult<Vec<Artifact>> {
    let call = SwanMarketplace::getListedArtifactsCall {
        agent,
        round: U256::from(round),
    };
    let addresses = reader.read(marketplace_address, call).await?._0;

    let hydrated = join_all(
        addresses
            .iter()
            .map(|a| fetch_artifact(reader, marketplace_address, *a, agent, round)),
    )
    .await;

    let mut artifacts = Vec::with_capacity(addresses.len());
    for (address, result) in addresses.iter().zip(hydrated) {
        match result {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => warn!(artifact = %address, round, error = %e, "dropping listed artifact"),
        }
    }
    debug!(agent = %agent, round, listed = addresses.len(), loaded = artifacts.len(), "listed artifacts loaded");
    Ok(artifacts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use memlane_contracts::scan::ScanOptions;
    use memlane_core::scan_rounds;
    use memlane_test_utils::{addr, MockChain};

    const MARKET: u8 = 0x5a;

    fn make_listing(agent: Address, seller: Address, round: u64, status: ListingStatus) -> Listing {
        Listing {
            created_at: 1_700_000_100,
            listing_fee: U256::from(1u64),
            price: U256::from(25u64),
            seller,
            agent,
            round,
            status,
        }
    }

    fn script_artifact(chain: &MockChain, artifact: Address, agent: Address, seller: Address, round: u64) {
        chain.set_artifact(artifact, "Lamp", "LMP", "A brass lamp", 0);
        chain.set_listing(addr(MARKET), artifact, &make_listing(agent, seller, round, ListingStatus::Sold));
    }

    // ── Hydration ─────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn fetch_artifact_combines_listing_and_contract() {
        let chain = MockChain::new();
        let (agent, seller, item) = (addr(1), addr(2), addr(3));
        script_artifact(&chain, item, agent, seller, 2);

        let artifact = fetch_artifact(&chain, addr(MARKET), item, agent, 9).await.unwrap();
        assert_eq!(artifact.name, "Lamp");
        assert_eq!(artifact.symbol, "LMP");
        assert_eq!(artifact.description, "A brass lamp");
        assert_eq!(artifact.round, 2);
        assert_eq!(artifact.price, U256::from(25u64));
        assert_eq!(artifact.status, ListingStatus::Sold);
        assert_eq!(artifact.seller, seller);
        assert_eq!(artifact.created_at.map(|t| t.timestamp()), Some(1_700_000_100));
    }

    #[tokio::test]
    async fn zero_seller_falls_back_to_agent() {
        let chain = MockChain::new();
        let (agent, item) = (addr(1), addr(3));
        script_artifact(&chain, item, agent, Address::ZERO, 0);

        let artifact = fetch_artifact(&chain, addr(MARKET), item, agent, 4).await.unwrap();
        assert_eq!(artifact.seller, agent);
        assert_eq!(artifact.round, 4);
    }

    #[test]
    fn listing_with_oversized_round_is_rejected() {
        let record = SwanMarketplace::ArtifactListing {
            createdAt: U256::ZERO,
            listingFee: Default::default(),
            price: U256::from(1u64),
            seller: addr(2),
            agent: addr(1),
            round: U256::MAX,
            status: 1,
        };
        let err = decode_listing(&record).unwrap_err();
        assert!(err.to_string().contains("listing round"));
    }

    #[test]
    fn unknown_listing_status_reads_as_unlisted() {
        let record = SwanMarketplace::ArtifactListing {
            createdAt: U256::from(5u64),
            listingFee: Default::default(),
            price: U256::ZERO,
            seller: addr(2),
            agent: addr(1),
            round: U256::from(3u64),
            status: 9,
        };
        let listing = decode_listing(&record).unwrap();
        assert_eq!(listing.status, ListingStatus::Unlisted);
        assert_eq!(listing.round, 3);
    }

    // ── Probing ───────────────────────────────────────────────────────────────

    #[tokio::test]
    async fn probe_walks_slots_until_revert_and_skips_holes() {
        let chain = Arc::new(MockChain::new());
        let agent = addr(1);
        let (good, broken) = (addr(3), addr(4));
        chain.set_inventory(agent, 1, &[good, broken]);
        script_artifact(&chain, good, agent, addr(2), 1);

        let probe = ArtifactProbe::new(chain.clone(), addr(MARKET), agent);
        let page = scan_rounds(&probe, 1, 1, &ScanOptions::default()).await;

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].address, good);
        // Slots 0 and 1 hold items, slot 2 reverts.
        assert_eq!(chain.call_count::<SwanAgent::inventoryCall>(), 3);
    }

    #[tokio::test]
    async fn zero_address_ends_the_round() {
        let chain = Arc::new(MockChain::new());
        let agent = addr(1);
        chain.set_inventory(agent, 1, &[Address::ZERO, addr(3)]);

        let probe = ArtifactProbe::new(chain.clone(), addr(MARKET), agent);
        let page = scan_rounds(&probe, 1, 1, &ScanOptions::default()).await;

        assert!(page.items.is_empty());
        assert_eq!(chain.call_count::<SwanAgent::inventoryCall>(), 1);
    }

    #[tokio::test]
    async fn empty_slot_reads_as_a_gap() {
        let chain = Arc::new(MockChain::new());
        let agent = addr(1);
        chain.set_inventory(agent, 1, &[Address::ZERO]);

        let probe = ArtifactProbe::new(chain.clone(), addr(MARKET), agent);
        let err = probe.inventory_slot(1, 0).await.unwrap_err();
        assert!(err.is_gap());
        assert!(matches!(probe.probe(1, 0).await.unwrap(), SlotOutcome::Exhausted));
    }

    #[tokio::test]
    async fn transport_failure_on_inventory_is_not_exhaustion() {
        let chain = Arc::new(MockChain::new());
        let agent = addr(1);
        chain.set_failure(
            agent,
            &SwanAgent::inventoryCall {
                round: U256::from(1u64),
                index: U256::ZERO,
            },
        );

        let probe = ArtifactProbe::new(chain.clone(), addr(MARKET), agent);
        let err = probe.probe(1, 0).await.unwrap_err();
        assert!(matches!(err, MemlaneError::Transport { .. }));
    }

    // ── Listed artifacts ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn listed_artifacts_drop_failures_only() {
        let chain = MockChain::new();
        let agent = addr(1);
        let (good, broken) = (addr(3), addr(4));
        chain.set_listed_artifacts(addr(MARKET), agent, 2, &[good, broken]);
        script_artifact(&chain, good, agent, addr(2), 2);

        let artifacts = fetch_listed_artifacts(&chain, addr(MARKET), agent, 2).await.unwrap();
        assert_eq!(artifacts.len(), 1);
        assert_eq!(artifacts[0].address, good);
    }

    #[tokio::test]
    async fn listed_index_failure_is_returned() {
        let chain = MockChain::new();
        let err = fetch_listed_artifacts(&chain, addr(MARKET), addr(1), 2).await.unwrap_err();
        assert!(matches!(err, MemlaneError::CallReverted { .. }));
    }
}
