//! The top-level configuration document.
//!
//! `MemlaneConfig` loads from a TOML string or file. Parsing fills in
//! defaults; `validate()` then rejects values that would make a loader spin
//! or read from the zero address.

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use tracing::debug;

use memlane_contracts::error::{MemlaneError, MemlaneResult};

use crate::settings::{
    ContentSettings, ContractSettings, DirectorySettings, ExplorerSettings, RpcSettings,
    ScanSettings,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MemlaneConfig {
    pub rpc: RpcSettings,
    pub explorer: ExplorerSettings,
    pub content: ContentSettings,
    pub contracts: ContractSettings,
    pub scan: ScanSettings,
    pub directory: DirectorySettings,
}

impl MemlaneConfig {
    /// Parse `s` as TOML, then validate.
    ///
    /// Returns `MemlaneError::Config` if the TOML is malformed, does not match
    /// the schema, or fails validation.
    pub fn from_toml_str(s: &str) -> MemlaneResult<Self> {
        let config: MemlaneConfig = toml::from_str(s).map_err(|e| MemlaneError::Config {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as TOML configuration.
    pub fn from_file(path: &Path) -> MemlaneResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| MemlaneError::Config {
            reason: format!("failed to read config file '{}': {}", path.display(), e),
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&contents)
    }

    /// Check invariants serde cannot express.
    pub fn validate(&self) -> MemlaneResult<()> {
        if self.rpc.endpoints.iter().all(|e| e.trim().is_empty()) {
            return Err(invalid("rpc.endpoints must list at least one URL"));
        }
        if self.rpc.timeout_ms == 0 {
            return Err(invalid("rpc.timeout_ms must be positive"));
        }
        if self.explorer.base_url.trim().is_empty() {
            return Err(invalid("explorer.base_url must not be empty"));
        }
        if self.explorer.page_limit == 0 {
            return Err(invalid("explorer.page_limit must be positive"));
        }
        if self.explorer.max_pages == 0 {
            return Err(invalid("explorer.max_pages must be positive"));
        }
        if self.explorer.max_attempts == 0 {
            return Err(invalid("explorer.max_attempts must be positive"));
        }
        if self.content.gateway.trim().is_empty() {
            return Err(invalid("content.gateway must not be empty"));
        }
        if self.scan.batch_size == 0 {
            return Err(invalid("scan.batch_size must be positive"));
        }
        if self.scan.max_batches == 0 {
            return Err(invalid("scan.max_batches must be positive"));
        }
        if self.scan.max_slots_per_round == 0 {
            return Err(invalid("scan.max_slots_per_round must be positive"));
        }
        if self.directory.batch_size == 0 {
            return Err(invalid("directory.batch_size must be positive"));
        }
        if self.directory.read_attempts == 0 {
            return Err(invalid("directory.read_attempts must be positive"));
        }

        let contracts = [
            ("contracts.factory", self.contracts.factory),
            ("contracts.marketplace", self.contracts.marketplace),
            ("contracts.oracle_coordinator", self.contracts.oracle_coordinator),
        ];
        for (field, address) in contracts {
            if address == Address::ZERO {
                return Err(invalid(&format!("{field} must not be the zero address")));
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> MemlaneError {
    MemlaneError::Config {
        reason: reason.to_string(),
    }
}
