//! # memlane-swan
//!
//! Reference runtime for the Swan agent marketplace on Base.
//!
//! This crate provides:
//! - Agent discovery from the factory's contract creations ([`discover_agents`])
//! - The agent directory with per-agent summaries ([`list_agents`])
//! - Profile, inventory and listed-artifact reads
//! - [`AgentSession`], which drives all of the above into a
//!   [`ReconciliationStore`](memlane_core::ReconciliationStore)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use memlane_swan::AgentSession;
//!
//! let session = AgentSession::new(reader, content, &config.contracts, config.scan);
//! let view = session.select_agent(agent).await?;
//! session.load_more_diary().await?;
//! ```

pub mod artifacts;
pub mod directory;
pub mod discovery;
pub mod fallback;
pub mod profile;
pub mod session;

pub use artifacts::{fetch_artifact, fetch_listed_artifacts, ArtifactProbe};
pub use directory::list_agents;
pub use discovery::{discover_agents, DiscoveryOptions};
pub use fallback::fallback_profile;
pub use profile::{fetch_profile, RoundPhase};
pub use session::AgentSession;
