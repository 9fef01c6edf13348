//! Agent discovery through the factory's contract creations.
//!
//! Every agent contract is created by the factory, so the factory's
//! internal transactions of type `create` enumerate the agents. The explorer
//! pages newest first; discovery follows `next_page_params` up to a page
//! budget.
//!
//! Failure policy:
//! - page 1 failing after its retries is a `Discovery` error;
//! - any later page failing ends discovery with the agents found so far.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use memlane_config::ExplorerSettings;
use memlane_contracts::{
    agent::DiscoveredAgent,
    error::{MemlaneError, MemlaneResult},
    explorer::{InternalTx, PageParams},
    Address,
};
use memlane_core::{traits::ExplorerApi, with_retry, RetryPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct DiscoveryOptions {
    pub page_limit: u32,
    pub max_pages: u32,
    /// Per-page retry.
    pub retry: RetryPolicy,
    pub inter_page_delay: Duration,
}

impl From<&ExplorerSettings> for DiscoveryOptions {
    fn from(settings: &ExplorerSettings) -> Self {
        Self {
            page_limit: settings.page_limit,
            max_pages: settings.max_pages,
            retry: settings.retry_policy(),
            inter_page_delay: settings.inter_page_delay(),
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&ExplorerSettings::default())
    }
}

/// Agents created by `factory`, newest first, without duplicates.
pub async fn discover_agents(
    explorer: &dyn ExplorerApi,
    factory: Address,
    options: &DiscoveryOptions,
) -> MemlaneResult<Vec<DiscoveredAgent>> {
    let mut agents = Vec::new();
    let mut seen = HashSet::new();
    let mut cursor: Option<PageParams> = None;

    for page_index in 0..options.max_pages.max(1) {
        if page_index > 0 && !options.inter_page_delay.is_zero() {
            tokio::time::sleep(options.inter_page_delay).await;
        }

        let fetched = with_retry(&options.retry, "explorer page", |_| {
            explorer.internal_transactions(factory, options.page_limit, cursor.as_ref())
        })
        .await;

        let page = match fetched {
            Ok(page) => page,
            Err(e) if page_index == 0 => {
                return Err(MemlaneError::Discovery {
                    reason: e.to_string(),
                });
            }
            Err(e) => {
                warn!(
                    page = page_index + 1,
                    found = agents.len(),
                    error = %e,
                    "explorer page failed, keeping partial agent list"
                );
                break;
            }
        };

        debug!(page = page_index + 1, items = page.items.len(), "explorer page received");
        for item in &page.items {
            if let Some(agent) = created_agent(item, factory) {
                if seen.insert(agent.address) {
                    agents.push(agent);
                }
            }
        }

        match page.next_page_params {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(factory = %factory, agents = agents.len(), "agent discovery finished");
    Ok(agents)
}

/// The agent created by `item`, if it is a creation of something other than
/// the factory itself.
fn created_agent(item: &InternalTx, factory: Address) -> Option<DiscoveredAgent> {
    if !item.is_contract_creation() {
        return None;
    }
    let hash = &item.created_contract.as_ref()?.hash;
    let address: Address = match hash.parse() {
        Ok(address) => address,
        Err(e) => {
            debug!(hash = %hash, error = %e, "skipping unparseable created contract");
            return None;
        }
    };
    if address == factory {
        return None;
    }

    Some(DiscoveredAgent {
        address,
        creation_tx_hash: item.tx_hash.clone(),
        block_number: item.block_number,
        created_at: item.timestamp.as_deref().and_then(parse_timestamp),
    })
}

fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
