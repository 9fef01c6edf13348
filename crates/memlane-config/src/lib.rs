//! # memlane-config
//!
//! TOML configuration for the Memory Lane reader.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use memlane_config::MemlaneConfig;
//!
//! let config = MemlaneConfig::from_file(Path::new("memlane.toml"))?;
//! ```
//!
//! An empty document is valid and yields the Base mainnet deployment.

pub mod config;
pub mod settings;

pub use config::MemlaneConfig;
pub use settings::{
    ContentSettings, ContractSettings, DiarySource, DirectorySettings, ExplorerSettings,
    RpcSettings, ScanSettings,
};

// ── Tests ─────────────────────────────────────────────────────────────────────
