//! Arweave gateway client.

use async_trait::async_trait;
use tracing::debug;

use memlane_config::ContentSettings;
use memlane_contracts::error::{MemlaneError, MemlaneResult};
use memlane_core::traits::ContentStore;

pub struct ArweaveGateway {
    client: reqwest::Client,
    gateway: String,
}

impl ArweaveGateway {
    pub fn new(gateway: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            gateway: gateway.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn from_settings(settings: &ContentSettings) -> MemlaneResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| MemlaneError::Config {
                reason: format!("failed to build HTTP client: {}", e),
            })?;
        Ok(Self::new(settings.gateway.clone(), client))
    }

    /// `{gateway}/{id}` for a well-formed id.
    pub fn url_for(&self, content_id: &str) -> MemlaneResult<String> {
        let id = content_id.trim();
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(MemlaneError::ContentFetch {
                reason: format!("invalid content id {:?}", content_id),
            });
        }
        Ok(format!("{}/{}", self.gateway, id))
    }
}

#[async_trait]
impl ContentStore for ArweaveGateway {
    async fn fetch(&self, content_id: &str) -> MemlaneResult<String> {
        let url = self.url_for(content_id)?;
        debug!(url = %url, "fetching off-chain content");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MemlaneError::ContentFetch {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(MemlaneError::ContentFetch {
                reason: format!("HTTP {}", status),
            });
        }

        response.text().await.map_err(|e| MemlaneError::ContentFetch {
            reason: e.to_string(),
        })
    }
}
