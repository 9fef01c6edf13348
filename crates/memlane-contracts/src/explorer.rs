//! Block-explorer (Blockscout v2) response shapes.
//!
//! Pagination is cursor based: the four `next_page_params` fields are sent
//! back verbatim as query parameters to fetch the following page.

use serde::{Deserialize, Serialize};

/// Opaque cursor returned by the explorer for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageParams {
    pub block_number: u64,
    pub index: u64,
    pub items_count: u64,
    pub transaction_index: u64,
}

impl PageParams {
    /// Query pairs in the order the explorer documents them.
    pub fn query_pairs(&self) -> [(&'static str, String); 4] {
        [
            ("block_number", self.block_number.to_string()),
            ("index", self.index.to_string()),
            ("items_count", self.items_count.to_string()),
            ("transaction_index", self.transaction_index.to_string()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractRef {
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalTx {
    /// `"create"` for contract creations.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub created_contract: Option<ContractRef>,
    #[serde(alias = "transaction_hash")]
    pub tx_hash: String,
    #[serde(alias = "block")]
    pub block_number: u64,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl InternalTx {
    pub fn is_contract_creation(&self) -> bool {
        self.kind == "create" && self.created_contract.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InternalTxPage {
    pub items: Vec<InternalTx>,
    #[serde(default)]
    pub next_page_params: Option<PageParams>,
}
