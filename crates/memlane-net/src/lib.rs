//! # memlane-net
//!
//! Network clients behind the `memlane-core` traits:
//!
//! - [`HttpTransport`]: JSON-RPC with ranked multi-endpoint fallthrough
//! - [`RpcContractReader`]: `eth_call` with hex calldata and return data
//! - [`BlockscoutClient`]: explorer internal-transactions pages
//! - [`ArweaveGateway`]: content-addressed documents

pub mod content;
pub mod explorer;
pub mod ranking;
pub mod reader;
pub mod transport;

pub use content::ArweaveGateway;
pub use explorer::BlockscoutClient;
pub use ranking::{EndpointHealth, EndpointRanking};
pub use reader::RpcContractReader;
pub use transport::HttpTransport;
