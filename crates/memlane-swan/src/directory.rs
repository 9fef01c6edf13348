//! The browsable agent directory: discovery plus a summary per agent.

use futures::{future::join_all, try_join};
use tracing::{debug, info, warn};

use memlane_config::DirectorySettings;
use memlane_contracts::{
    agent::{AgentSummary, DiscoveredAgent},
    error::MemlaneResult,
    swan::SwanAgent,
    Address, SolCall, U256,
};
use memlane_core::{
    traits::{ContractCall, ContractReader, ExplorerApi},
    with_retry, RetryPolicy,
};

use crate::discovery::{discover_agents, DiscoveryOptions};
use crate::profile::read_round_phase;

pub const UNKNOWN_AGENT_NAME: &str = "Unknown Agent";
pub const UNAVAILABLE_DESCRIPTION: &str = "Unable to fetch agent details";

/// Discover every agent and summarise each, newest first.
///
/// Agents are summarised in concurrent batches. An agent whose reads fail
/// still appears, with placeholder fields and `details_loaded = false`.
pub async fn list_agents(
    explorer: &dyn ExplorerApi,
    reader: &dyn ContractReader,
    factory: Address,
    discovery: &DiscoveryOptions,
    settings: &DirectorySettings,
) -> MemlaneResult<Vec<AgentSummary>> {
    let discovered = discover_agents(explorer, factory, discovery).await?;
    let policy = settings.read_policy();
    let delay = settings.inter_batch_delay();

    let mut summaries = Vec::with_capacity(discovered.len());
    for (index, batch) in discovered.chunks(settings.batch_size.max(1)).enumerate() {
        if index > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        debug!(batch = index, agents = batch.len(), "summarising agent batch");
        let rows = join_all(batch.iter().map(|found| summarize(reader, found, &policy))).await;
        summaries.extend(rows);
    }

    summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let loaded = summaries.iter().filter(|s| s.details_loaded).count();
    info!(agents = summaries.len(), loaded, "agent directory ready");
    Ok(summaries)
}

async fn summarize(reader: &dyn ContractReader, found: &DiscoveredAgent, policy: &RetryPolicy) -> AgentSummary {
    let address = found.address;
    let details = try_join!(
        read_with_retry(reader, address, SwanAgent::nameCall {}, policy),
        read_with_retry(reader, address, SwanAgent::descriptionCall {}, policy),
        with_retry(policy, "getRoundPhase", |_| read_round_phase(reader, address)),
        read_with_retry(reader, address, SwanAgent::treasuryCall {}, policy),
        read_with_retry(reader, address, SwanAgent::ownerCall {}, policy),
    )
    .map(|(name, description, round_phase, treasury, owner)| AgentSummary {
        address,
        owner: owner._0,
        name: name._0,
        description: description._0,
        round: round_phase.round,
        treasury: treasury._0,
        created_at: found.created_at,
        details_loaded: true,
    });

    details.unwrap_or_else(|e| {
        warn!(agent = %address, error = %e, "agent details unavailable");
        AgentSummary {
            address,
            owner: Address::ZERO,
            name: UNKNOWN_AGENT_NAME.to_string(),
            description: UNAVAILABLE_DESCRIPTION.to_string(),
            round: 0,
            treasury: U256::ZERO,
            created_at: found.created_at,
            details_loaded: false,
        }
    })
}

async fn read_with_retry<C>(
    reader: &dyn ContractReader,
    address: Address,
    call: C,
    policy: &RetryPolicy,
) -> MemlaneResult<C::Return>
where
    C: SolCall + Clone + Send + Sync,
{
    with_retry(policy, C::SIGNATURE, |_| reader.read(address, call.clone())).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use memlane_test_utils::{addr, AgentFixture, MockChain, MockExplorer, Reply};

    const FACTORY: u8 = 0xfa;

    fn make_settings(batch_size: usize) -> DirectorySettings {
        DirectorySettings {
            batch_size,
            read_attempts: 3,
            read_delay_ms: 0,
            inter_batch_delay_ms: 0,
        }
    }

    fn make_discovery() -> DiscoveryOptions {
        DiscoveryOptions {
            page_limit: 50,
            max_pages: 5,
            retry: RetryPolicy::new(1, Duration::ZERO),
            inter_page_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn summaries_are_sorted_newest_first_with_placeholders() {
        // Block 20 maps to a later timestamp than block 10.
        let explorer = MockExplorer::new(vec![vec![
            MockExplorer::creation(addr(1), 10),
            MockExplorer::creation(addr(2), 20),
            MockExplorer::creation(addr(3), 5),
        ]]);
        let chain = MockChain::new();
        chain.set_agent(addr(1), &AgentFixture::new("Older", 2));
        chain.set_agent(addr(2), &AgentFixture::new("Newer", 6));

        let summaries = list_agents(&explorer, &chain, addr(FACTORY), &make_discovery(), &make_settings(2))
            .await
            .unwrap();

        let names: Vec<&str> = summaries.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Newer", "Older", UNKNOWN_AGENT_NAME]);
        assert_eq!(summaries[0].round, 6);
        assert_eq!(summaries[0].owner, addr(0xee));
        assert!(summaries[0].details_loaded);

        let placeholder = &summaries[2];
        assert_eq!(placeholder.address, addr(3));
        assert_eq!(placeholder.description, UNAVAILABLE_DESCRIPTION);
        assert_eq!(placeholder.treasury, U256::ZERO);
        assert_eq!(placeholder.owner, Address::ZERO);
        assert!(!placeholder.details_loaded);
    }

    #[tokio::test]
    async fn transient_read_failures_are_retried() {
        let explorer = MockExplorer::new(vec![vec![MockExplorer::creation(addr(1), 10)]]);
        let chain = MockChain::new();
        chain.set_agent(addr(1), &AgentFixture::new("Flaky", 2));
        chain.reply(addr(1), &SwanAgent::nameCall {}, Reply::flaky(2, "Flaky".to_string()));

        let summaries = list_agents(&explorer, &chain, addr(FACTORY), &make_discovery(), &make_settings(20))
            .await
            .unwrap();

        assert!(summaries[0].details_loaded);
        assert_eq!(summaries[0].name, "Flaky");
        assert_eq!(chain.call_count::<SwanAgent::nameCall>(), 3);
    }

    #[tokio::test]
    async fn discovery_failure_propagates() {
        let explorer = MockExplorer::new(vec![vec![]]);
        explorer.fail_page(0, 1);
        let chain = MockChain::new();

        let result = list_agents(&explorer, &chain, addr(FACTORY), &make_discovery(), &make_settings(20)).await;
        assert!(result.is_err());
    }
}
