use super::{envelope::read_envelope, workers_ai::api_url};
use crate::{Result, config::CloudflareConfig};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaClient: Send + Sync {
    /// Fetches the input/output schema of `model`. Failures reported by the
    /// API come back as `Error::Vendor`.
    async fn get(&self, account_id: &str, model: &str, api_token: &str) -> Result<Value>;
}

pub struct CloudflareSchemaClient {
    http: reqwest::Client,
    api_base: String,
}

impl CloudflareSchemaClient {
    pub fn new(config: &CloudflareConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SchemaClient for CloudflareSchemaClient {
    async fn get(&self, account_id: &str, model: &str, api_token: &str) -> Result<Value> {
        let url = api_url(
            &self.api_base,
            ["accounts", account_id, "ai", "models", "schema"],
        )?;
        debug!("Fetching schema for model {}", model);

        let response = self
            .http
            .get(url)
            .query(&[("model", model)])
            .bearer_auth(api_token)
            .send()
            .await?;

        read_envelope(response).await
    }
}
