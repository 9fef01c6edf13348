//! Configuration sections and their Base mainnet defaults.
//!
//! Every section and every field is optional in TOML; anything omitted takes
//! the default below.

use std::time::Duration;

use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};

use memlane_contracts::scan::ScanOptions;
use memlane_core::retry::RetryPolicy;

/// Public Base mainnet RPC.
pub const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";
pub const DEFAULT_EXPLORER_URL: &str = "https://base.blockscout.com/api/v2";
pub const DEFAULT_CONTENT_GATEWAY: &str = "https://arweave.net";

/// `SwanAgentFactory` on Base mainnet.
pub const DEFAULT_FACTORY: Address = address!("8D7DfC92613AAc6a0A8f89dD0ED3e52C0C83f3c3");
/// `Swan` marketplace on Base mainnet.
pub const DEFAULT_MARKETPLACE: Address = address!("10DBC8eD4a7173a342C5975B8DDA13D15D128870");
/// `LLMOracleCoordinator` on Base mainnet.
pub const DEFAULT_ORACLE_COORDINATOR: Address = address!("01547c5E13Fd80EA6f3b7811acDA51Cf3989f832");
/// Agent shown when the CLI is given no address.
pub const DEFAULT_AGENT: Address = address!("d4022dB6165caeA1F72a187D4d49B347E02E1484");

const BACKOFF_FACTOR: f64 = 2.0;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

// ── [rpc] ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RpcSettings {
    /// Candidate endpoints in initial preference order.
    pub endpoints: Vec<String>,
    pub timeout_ms: u64,
    /// Extra sweeps over all endpoints after the first one fails.
    pub retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            endpoints: vec![DEFAULT_RPC_URL.to_string()],
            timeout_ms: 5_000,
            retries: 2,
            retry_delay_ms: 250,
        }
    }
}

impl RpcSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// One attempt per sweep.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retries.saturating_add(1),
            base_delay: Duration::from_millis(self.retry_delay_ms),
            backoff_factor: BACKOFF_FACTOR,
            max_delay: MAX_BACKOFF,
        }
    }
}

// ── [explorer] ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    pub base_url: String,
    pub page_limit: u32,
    pub max_pages: u32,
    /// Attempts per page, including the first.
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub inter_page_delay_ms: u64,
    pub timeout_ms: u64,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_EXPLORER_URL.to_string(),
            page_limit: 50,
            max_pages: 5,
            max_attempts: 3,
            retry_delay_ms: 1_000,
            inter_page_delay_ms: 1_000,
            timeout_ms: 10_000,
        }
    }
}

impl ExplorerSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn inter_page_delay(&self) -> Duration {
        Duration::from_millis(self.inter_page_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            base_delay: Duration::from_millis(self.retry_delay_ms),
            backoff_factor: BACKOFF_FACTOR,
            max_delay: MAX_BACKOFF,
        }
    }
}

// ── [content] ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentSettings {
    pub gateway: String,
    pub timeout_ms: u64,
}

impl Default for ContentSettings {
    fn default() -> Self {
        Self {
            gateway: DEFAULT_CONTENT_GATEWAY.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl ContentSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ── [contracts] ───────────────────────────────────────────────────────────────

/// Where a round's diary text is read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiarySource {
    /// `oracleResult(taskId)` on the agent contract.
    #[default]
    AgentOracleResult,
    /// `getBestResponse(taskId).output` on the oracle coordinator.
    CoordinatorBestResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractSettings {
    pub factory: Address,
    pub marketplace: Address,
    pub oracle_coordinator: Address,
    pub diary_source: DiarySource,
}

impl Default for ContractSettings {
    fn default() -> Self {
        Self {
            factory: DEFAULT_FACTORY,
            marketplace: DEFAULT_MARKETPLACE,
            oracle_coordinator: DEFAULT_ORACLE_COORDINATOR,
            diary_source: DiarySource::default(),
        }
    }
}

// ── [directory] ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorySettings {
    /// Agents enriched concurrently per batch.
    pub batch_size: usize,
    pub read_attempts: u32,
    pub read_delay_ms: u64,
    pub inter_batch_delay_ms: u64,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            read_attempts: 3,
            read_delay_ms: 1_000,
            inter_batch_delay_ms: 1_000,
        }
    }
}

impl DirectorySettings {
    pub fn read_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.read_attempts,
            base_delay: Duration::from_millis(self.read_delay_ms),
            backoff_factor: BACKOFF_FACTOR,
            max_delay: MAX_BACKOFF,
        }
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }
}

/// `[scan]` maps directly onto the scanner's options.
pub type ScanSettings = ScanOptions;
