//! # memlane-contracts
//!
//! Shared types, Swan contract interfaces, and the error taxonomy for the
//! Memory Lane reader.
//!
//! All crates in the workspace import from here. No I/O lives in this crate,
//! only data definitions, `sol!` interface declarations, and error types.

pub mod agent;
pub mod artifact;
pub mod diary;
pub mod error;
pub mod explorer;
pub mod scan;
pub mod swan;
pub mod value;
pub mod view;

pub use alloy_primitives::{Address, Bytes, U256};
pub use alloy_sol_types::{SolCall, SolValue};
