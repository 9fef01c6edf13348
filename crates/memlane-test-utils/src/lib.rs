//! # memlane-test-utils
//!
//! Scriptable stand-ins for the reader's network seams:
//!
//! - [`MockChain`]: a `ContractReader` answering from a calldata-keyed reply table
//! - [`MockExplorer`]: an `ExplorerApi` serving a fixed chain of pages
//! - [`MockContent`]: a `ContentStore` backed by a map of documents
//!
//! Every mock records what it was asked so tests can assert on call counts
//! and ordering. Unscripted contract calls revert, which mirrors how the
//! Swan contracts answer out-of-range reads.

pub mod chain;
pub mod content;
pub mod explorer;

pub use chain::{AgentFixture, MockChain, Reply};
pub use content::MockContent;
pub use explorer::MockExplorer;

use memlane_contracts::Address;

/// A distinct, non-zero address for fixtures.
pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}
