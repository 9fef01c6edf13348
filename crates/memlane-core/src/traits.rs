//! Trait seams between the reader's logic and the outside world.
//!
//! - `RpcTransport`: raw JSON-RPC over one or more endpoints
//! - `ContractReader`: raw `eth_call` (built on a transport)
//! - `ContractCall`: typed reads of `sol!` calls over any `ContractReader`
//! - `ExplorerApi`: paginated block-explorer queries
//! - `ContentStore`: content-addressed off-chain documents
//! - `RoundProbe`: one `(round, slot)` lookup driven by the scanner
//!
//! Everything above these traits is deterministic given their responses,
//! which is what the mocks in `memlane-test-utils` rely on.

use alloy_sol_types::SolCall;
use async_trait::async_trait;
use serde_json::Value;

use memlane_contracts::{
    error::{MemlaneError, MemlaneResult},
    explorer::{InternalTxPage, PageParams},
    scan::SlotOutcome,
    Address, Bytes,
};

/// A JSON-RPC 2.0 client.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    /// Issue `method` with `params` and return the `result` member.
    ///
    /// Fails with `Transport` once every candidate endpoint is exhausted and
    /// with `CallReverted` when a node answers with a JSON-RPC error object.
    async fn call(&self, method: &str, params: Value) -> MemlaneResult<Value>;
}

/// Side-effect-free execution of contract calldata.
#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Run `calldata` against `address` at the latest block and return the
    /// raw return data.
    async fn eth_call(&self, address: Address, calldata: Bytes) -> MemlaneResult<Bytes>;
}

/// Typed reads for every [`ContractReader`].
///
/// ```ignore
/// let round = reader.read(agent, SwanAgent::getRoundPhaseCall {}).await?.round;
/// ```
#[async_trait]
pub trait ContractCall: ContractReader {
    /// ABI-encode `call`, execute it, and decode its return values.
    async fn read<C>(&self, address: Address, call: C) -> MemlaneResult<C::Return>
    where
        C: SolCall + Send + Sync;
}

#[async_trait]
impl<R: ContractReader + ?Sized> ContractCall for R {
    async fn read<C>(&self, address: Address, call: C) -> MemlaneResult<C::Return>
    where
        C: SolCall + Send + Sync,
    {
        let data = self.eth_call(address, Bytes::from(call.abi_encode())).await?;
        C::abi_decode_returns(&data, false)
            .map_err(|e| MemlaneError::decode(format!("{} on {}: {}", C::SIGNATURE, address, e)))
    }
}

/// The block explorer's internal-transactions listing.
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    /// Fetch one page for `address`. `cursor` is the previous page's
    /// `next_page_params`, or `None` for the first page.
    async fn internal_transactions(
        &self,
        address: Address,
        limit: u32,
        cursor: Option<&PageParams>,
    ) -> MemlaneResult<InternalTxPage>;
}

/// Immutable documents addressed by id (an Arweave transaction id).
#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn fetch(&self, content_id: &str) -> MemlaneResult<String>;
}

/// A per-`(round, slot)` lookup the round scanner can drive.
///
/// Implementations decide what counts as the end-of-round sentinel. Errors
/// are swallowed by the scanner and end the current round's slot walk.
#[async_trait]
pub trait RoundProbe: Send + Sync {
    type Item: Send;

    async fn probe(&self, round: u64, slot: u64) -> MemlaneResult<SlotOutcome<Self::Item>>;

    /// Fixed number of slots per round, when known. `None` walks slots until
    /// the probe reports `Exhausted`.
    fn slots_per_round(&self) -> Option<u64> {
        None
    }
}
