use super::envelope::read_envelope;
use crate::{Error, Result, config::CloudflareConfig};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use reqwest::{Url, header::CONTENT_TYPE};
use serde_json::{Value, json};
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageModel: Send + Sync {
    /// Runs `model` against `input` and returns the model's raw output.
    async fn run(&self, model: &str, input: Value) -> Result<Value>;
}

/// Workers AI model identifiers look like `@cf/vendor/model-name`: an
/// `@`-prefixed path of `[A-Za-z0-9._-]` segments, none of them `.` or `..`.
pub fn is_valid_model_id(model: &str) -> bool {
    let Some(path) = model.strip_prefix('@') else {
        return false;
    };
    path.split('/').all(|segment| {
        !segment.is_empty()
            && segment != "."
            && segment != ".."
            && segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    })
}

/// Appends `segments` to `api_base`, percent-encoding each one.
pub(crate) fn api_url<'a>(
    api_base: &str,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url> {
    let mut url = Url::parse(api_base)
        .map_err(|e| Error::config(format!("Invalid api_base {}: {}", api_base, e)))?;
    url.path_segments_mut()
        .map_err(|_| Error::config(format!("api_base {} cannot carry a path", api_base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

pub struct WorkersAiClient {
    http: reqwest::Client,
    api_base: String,
    account_id: Option<String>,
    api_token: Option<String>,
}

impl WorkersAiClient {
    pub fn new(config: &CloudflareConfig) -> Self {
        let credentials = config.credentials();
        Self {
            http: reqwest::Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            account_id: credentials.account_id,
            api_token: credentials.api_token,
        }
    }
}

#[async_trait]
impl ImageModel for WorkersAiClient {
    async fn run(&self, model: &str, input: Value) -> Result<Value> {
        let account_id = self
            .account_id
            .as_deref()
            .ok_or_else(|| Error::config("Workers AI requires an account id"))?;
        let api_token = self
            .api_token
            .as_deref()
            .ok_or_else(|| Error::config("Workers AI requires an API token"))?;

        let url = api_url(
            &self.api_base,
            ["accounts", account_id, "ai", "run"]
                .into_iter()
                .chain(model.split('/')),
        )?;
        debug!("Running Workers AI model {}", model);

        let response = self
            .http
            .post(url)
            .bearer_auth(api_token)
            .json(&input)
            .send()
            .await
            .map_err(|e| Error::inference(format!("Failed to call Workers AI: {}", e)))?;

        // Some image models answer with raw image bytes instead of JSON.
        let is_image = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("image/"));

        if is_image && response.status().is_success() {
            let bytes = response.bytes().await?;
            debug!("Workers AI returned {} raw image bytes", bytes.len());
            return Ok(json!({ "image": STANDARD.encode(&bytes) }));
        }

        read_envelope(response).await
    }
}
