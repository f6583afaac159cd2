use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_ERROR_MESSAGE: &str = "Cloudflare API error";

/// Standard `{ success, errors, messages, result }` wrapper used by the
/// Cloudflare v4 API.
#[derive(Debug, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub errors: Vec<ApiMessage>,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    pub message: String,
}

pub async fn read_envelope(response: reqwest::Response) -> Result<Value> {
    let status = response.status().as_u16();
    let body = response.bytes().await?;
    parse_envelope(status, &body)
}

/// Unwraps `result`, or turns an unsuccessful reply into `Error::Vendor`
/// carrying the HTTP status and the reported errors.
pub fn parse_envelope(status: u16, body: &[u8]) -> Result<Value> {
    let ok_status = (200..300).contains(&status);

    let envelope: Envelope = match serde_json::from_slice(body) {
        Ok(envelope) => envelope,
        Err(e) if ok_status => return Err(e.into()),
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            let message = if text.trim().is_empty() {
                format!("{} (HTTP {})", DEFAULT_ERROR_MESSAGE, status)
            } else {
                text.trim().to_string()
            };
            return Err(Error::vendor(Some(status), message, None));
        }
    };

    if ok_status && envelope.success != Some(false) {
        return Ok(envelope.result.unwrap_or(Value::Null));
    }

    let message = envelope
        .errors
        .first()
        .map(|e| e.message.clone())
        .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string());
    let details = if envelope.errors.is_empty() {
        None
    } else {
        Some(serde_json::to_value(&envelope.errors)?)
    };

    Err(Error::vendor(Some(status), message, details))
}
