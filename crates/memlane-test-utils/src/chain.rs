//! A scripted contract reader.
//!
//! Replies are keyed by `(address, calldata)`, so a scripted call matches
//! only the exact arguments it was scripted with. Return values are encoded
//! with the same `sol!` types the reader decodes with.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use alloy_primitives::aliases::U96;
use async_trait::async_trait;

use memlane_contracts::{
    artifact::{Listing, ListingStatus},
    error::{MemlaneError, MemlaneResult},
    swan::{LLMOracleCoordinator, SwanAgent, SwanArtifact, SwanMarketplace},
    Address, Bytes, SolCall, SolValue, U256,
};
use memlane_core::traits::ContractReader;

/// How the mock answers one `(address, calldata)` call.
#[derive(Debug, Clone)]
pub enum Reply {
    /// ABI-encoded return data.
    Returns(Bytes),
    /// `CallReverted`, as a node reports a contract revert.
    Revert(String),
    /// `Transport` on every call.
    Fail(String),
    /// `Transport` for the first `failures` calls, then `returns`.
    Flaky { failures: u32, returns: Bytes },
}

impl Reply {
    /// `value` encoded as a function's return data.
    pub fn value<V: SolValue>(value: V) -> Self {
        Reply::Returns(encode(value))
    }

    pub fn flaky<V: SolValue>(failures: u32, value: V) -> Self {
        Reply::Flaky {
            failures,
            returns: encode(value),
        }
    }
}

/// A single value, or a static tuple of values, encodes the same way as the
/// return data of a function with those outputs.
fn encode<V: SolValue>(value: V) -> Bytes {
    Bytes::from(value.abi_encode())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CallKey {
    address: Address,
    calldata: Bytes,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub address: Address,
    pub calldata: Bytes,
}

impl RecordedCall {
    pub fn is<C: SolCall>(&self) -> bool {
        self.calldata.starts_with(&C::SELECTOR)
    }
}

#[derive(Default)]
struct ChainState {
    replies: HashMap<CallKey, Reply>,
    calls: Vec<RecordedCall>,
}

/// Scalar fields of a scripted agent contract.
#[derive(Debug, Clone)]
pub struct AgentFixture {
    pub name: String,
    pub description: String,
    pub round: u64,
    pub phase: u8,
    pub phase_started_at: u64,
    pub treasury: u64,
    pub owner: Address,
    pub created_at: u64,
}

impl AgentFixture {
    pub fn new(name: &str, round: u64) -> Self {
        Self {
            name: name.to_string(),
            description: format!("{name} collects things"),
            round,
            phase: 1,
            phase_started_at: 1_700_000_000,
            treasury: 1_000,
            owner: Address::repeat_byte(0xee),
            created_at: 1_700_000_000,
        }
    }
}

#[derive(Default)]
pub struct MockChain {
    state: Mutex<ChainState>,
    latency: Option<Duration>,
}

impl MockChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency`.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn reply<C: SolCall>(&self, address: Address, call: &C, reply: Reply) {
        let key = CallKey {
            address,
            calldata: Bytes::from(call.abi_encode()),
        };
        self.state.lock().unwrap().replies.insert(key, reply);
    }

    pub fn set<C: SolCall, V: SolValue>(&self, address: Address, call: &C, value: V) {
        self.reply(address, call, Reply::value(value));
    }

    pub fn set_revert<C: SolCall>(&self, address: Address, call: &C) {
        self.reply(address, call, Reply::Revert("execution reverted".into()));
    }

    pub fn set_failure<C: SolCall>(&self, address: Address, call: &C) {
        self.reply(address, call, Reply::Fail("connection refused".into()));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls made to function `C` on any address.
    pub fn call_count<C: SolCall>(&self) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.is::<C>())
            .count()
    }

    /// Arguments of every call made to function `C`, in call order.
    pub fn calls_to<C: SolCall>(&self) -> Vec<C> {
        self.calls()
            .iter()
            .filter(|c| c.is::<C>())
            .map(|c| C::abi_decode(&c.calldata, false).unwrap())
            .collect()
    }

    // ── Swan fixtures ─────────────────────────────────────────────────────────

    pub fn set_agent(&self, address: Address, fixture: &AgentFixture) {
        self.set(address, &SwanAgent::nameCall {}, fixture.name.clone());
        self.set(address, &SwanAgent::descriptionCall {}, fixture.description.clone());
        self.set(
            address,
            &SwanAgent::getRoundPhaseCall {},
            (
                U256::from(fixture.round),
                U256::from(fixture.phase),
                U256::from(fixture.phase_started_at),
            ),
        );
        self.set(address, &SwanAgent::treasuryCall {}, U256::from(fixture.treasury));
        self.set(address, &SwanAgent::ownerCall {}, fixture.owner);
        self.set(address, &SwanAgent::createdAtCall {}, U256::from(fixture.created_at));
    }

    /// Script round `round`'s oracle task. `text = None` leaves the result
    /// unscripted, so reading it reverts.
    pub fn set_diary(&self, address: Address, round: u64, task_id: u64, text: Option<&str>) {
        self.set(
            address,
            &SwanAgent::oracleStateRequestsCall {
                round: U256::from(round),
            },
            U256::from(task_id),
        );
        if let (Some(text), true) = (text, task_id != 0) {
            self.set_oracle_result(address, task_id, text.as_bytes());
        }
    }

    pub fn set_oracle_result(&self, address: Address, task_id: u64, output: &[u8]) {
        self.set(
            address,
            &SwanAgent::oracleResultCall {
                taskId: U256::from(task_id),
            },
            Bytes::from(output.to_vec()),
        );
    }

    pub fn set_best_response(&self, coordinator_address: Address, task_id: u64, output: &[u8]) {
        let response = LLMOracleCoordinator::TaskResponse {
            responder: Address::repeat_byte(0x0c),
            nonce: U256::ZERO,
            score: U256::from(100u64),
            output: Bytes::from(output.to_vec()),
            metadata: Bytes::new(),
        };
        self.set(
            coordinator_address,
            &LLMOracleCoordinator::getBestResponseCall {
                taskId: U256::from(task_id),
            },
            response,
        );
    }

    /// Inventory slots `0..items.len()` for `round`; the next slot reverts.
    pub fn set_inventory(&self, address: Address, round: u64, items: &[Address]) {
        for (slot, item) in items.iter().enumerate() {
            self.set(
                address,
                &SwanAgent::inventoryCall {
                    round: U256::from(round),
                    index: U256::from(slot),
                },
                *item,
            );
        }
    }

    pub fn set_artifact(&self, address: Address, name: &str, symbol: &str, description: &str, created_at: u64) {
        self.set(address, &SwanArtifact::nameCall {}, name.to_string());
        self.set(address, &SwanArtifact::symbolCall {}, symbol.to_string());
        self.set(
            address,
            &SwanArtifact::descriptionCall {},
            Bytes::from(description.as_bytes().to_vec()),
        );
        self.set(address, &SwanArtifact::createdAtCall {}, U256::from(created_at));
    }

    pub fn set_listing(&self, marketplace_address: Address, artifact_address: Address, listing: &Listing) {
        let status = match listing.status {
            ListingStatus::Unlisted => 0u8,
            ListingStatus::Listed => 1,
            ListingStatus::Sold => 2,
        };
        let record = SwanMarketplace::ArtifactListing {
            createdAt: U256::from(listing.created_at),
            listingFee: U96::from(listing.listing_fee),
            price: listing.price,
            seller: listing.seller,
            agent: listing.agent,
            round: U256::from(listing.round),
            status,
        };
        self.set(
            marketplace_address,
            &SwanMarketplace::getListingCall {
                artifact: artifact_address,
            },
            record,
        );
    }

    pub fn set_listed_artifacts(&self, marketplace_address: Address, agent_address: Address, round: u64, items: &[Address]) {
        self.set(
            marketplace_address,
            &SwanMarketplace::getListedArtifactsCall {
                agent: agent_address,
                round: U256::from(round),
            },
            items.to_vec(),
        );
    }
}

#[async_trait]
impl ContractReader for MockChain {
    async fn eth_call(&self, address: Address, calldata: Bytes) -> MemlaneResult<Bytes> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let key = CallKey {
            address,
            calldata: calldata.clone(),
        };

        let mut state = self.state.lock().unwrap();
        state.calls.push(RecordedCall { address, calldata });

        match state.replies.get_mut(&key) {
            None => Err(MemlaneError::CallReverted {
                reason: format!("call to {address} not scripted"),
            }),
            Some(Reply::Returns(data)) => Ok(data.clone()),
            Some(Reply::Revert(reason)) => Err(MemlaneError::CallReverted { reason: reason.clone() }),
            Some(Reply::Fail(reason)) => Err(MemlaneError::Transport { reason: reason.clone() }),
            Some(Reply::Flaky { failures, returns }) => {
                if *failures > 0 {
                    *failures -= 1;
                    Err(MemlaneError::Transport {
                        reason: "flaky endpoint".into(),
                    })
                } else {
                    Ok(returns.clone())
                }
            }
        }
    }
}
