//! Blockscout v2 client for the internal-transactions listing.

use async_trait::async_trait;
use tracing::debug;

use memlane_config::ExplorerSettings;
use memlane_contracts::{
    error::{MemlaneError, MemlaneResult},
    explorer::{InternalTxPage, PageParams},
    Address,
};
use memlane_core::traits::ExplorerApi;

pub struct BlockscoutClient {
    client: reqwest::Client,
    base_url: String,
}

impl BlockscoutClient {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ExplorerSettings) -> MemlaneResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| MemlaneError::Config {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self::new(settings.base_url.clone(), client))
    }

    fn url_for(&self, address: Address) -> String {
        format!("{}/addresses/{}/internal-transactions", self.base_url, address)
    }
}

/// Query parameters for one page, cursor fields last.
pub fn page_query(limit: u32, cursor: Option<&PageParams>) -> Vec<(&'static str, String)> {
    let mut query = vec![("filter", "to | from".to_string()), ("limit", limit.to_string())];
    if let Some(cursor) = cursor {
        query.extend(cursor.query_pairs());
    }
    query
}

#[async_trait]
impl ExplorerApi for BlockscoutClient {
    async fn internal_transactions(
        &self,
        address: Address,
        limit: u32,
        cursor: Option<&PageParams>,
    ) -> MemlaneResult<InternalTxPage> {
        let url = self.url_for(address);
        debug!(url = %url, has_cursor = cursor.is_some(), "fetching explorer page");

        let response = self
            .client
            .get(&url)
            .query(&page_query(limit, cursor))
            .send()
            .await
            .map_err(|e| MemlaneError::Transport {
                reason: format!("explorer request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemlaneError::Transport {
                reason: format!("explorer returned HTTP {}", status),
            });
        }

        response
            .json::<InternalTxPage>()
            .await
            .map_err(|e| MemlaneError::decode(format!("unexpected explorer response: {}", e)))
    }
}
