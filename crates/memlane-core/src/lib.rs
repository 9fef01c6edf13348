//! # memlane-core
//!
//! The reader's core: trait seams, bounded retry, the round scanner, pure
//! merges, and the reconciliation store.
//!
//! Nothing in this crate touches the network directly. Network clients
//! implement the traits in [`traits`]; the Swan runtime wires them together.

pub mod merge;
pub mod retry;
pub mod scanner;
pub mod store;
pub mod traits;

pub use retry::{with_retry, RetryPolicy};
pub use scanner::{continue_scan, scan_rounds};
pub use store::{Collection, LoadTicket, PageOrigin, ProfileTicket, ReconciliationStore, Selection};
