//! Config Manager HTTP client
//!
//! Thin boundary call into the external Config Manager service. Failures
//! translate into a generic upstream rejection; detail stays in logs.

use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ConfigManagerConfig;
use crate::error::{AppError, UpstreamError};
use crate::Result;

pub struct ConfigManagerApi {
    client: Client,
    base_url: Url,
}

impl ConfigManagerApi {
    pub fn new(config: &ConfigManagerConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)
            .map_err(|e| AppError::Config(format!("invalid config_manager.base_url: {}", e)))?;
        // A trailing slash keeps `join` from clobbering a path-mounted base
        // like `http://host/api`.
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// `GET /configs/{serviceId}` — every config the service owns.
    pub async fn get_service_id(&self, service_id: &str) -> Result<Value> {
        let url = self
            .base_url
            .join(&format!("configs/{}", service_id))
            .map_err(|e| UpstreamError::Request(e.to_string()))?;
        self.fetch(url).await
    }

    /// `GET /configs/{serviceId}/ids?id=...` — a named subset of configs.
    pub async fn get_config_ids(&self, service_id: &str, config_ids: &[String]) -> Result<Value> {
        let mut url = self
            .base_url
            .join(&format!("configs/{}/ids", service_id))
            .map_err(|e| UpstreamError::Request(e.to_string()))?;
        url.query_pairs_mut()
            .extend_pairs(config_ids.iter().map(|id| ("id", id)));
        self.fetch(url).await
    }

    async fn fetch(&self, url: Url) -> Result<Value> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status(status.as_u16(), body).into());
        }

        Ok(response.json().await?)
    }
}
