use crate::{Error, Result};
use aws_sdk_s3::primitives::ByteStream;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One object as reported by a bucket listing. Field names follow the R2
/// binding so the JSON relayed to clients keeps its familiar shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectEntry {
    pub key: String,
    pub size: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_metadata: Option<HttpMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListOptions {
    pub limit: i32,
    pub cursor: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListPage {
    pub objects: Vec<ObjectEntry>,
    pub truncated: bool,
    pub cursor: Option<String>,
}

/// A fetched object whose body may still be streaming from the store.
pub struct StoredObject {
    pub content_type: Option<String>,
    body: ObjectBody,
}

enum ObjectBody {
    Buffered(Vec<u8>),
    Stream(ByteStream),
}

impl StoredObject {
    pub fn from_bytes(body: Vec<u8>, content_type: Option<String>) -> Self {
        Self {
            content_type,
            body: ObjectBody::Buffered(body),
        }
    }

    pub fn from_stream(body: ByteStream, content_type: Option<String>) -> Self {
        Self {
            content_type,
            body: ObjectBody::Stream(body),
        }
    }

    /// Reads the full body into memory.
    pub async fn bytes(self) -> Result<Vec<u8>> {
        match self.body {
            ObjectBody::Buffered(bytes) => Ok(bytes),
            ObjectBody::Stream(stream) => {
                let aggregated = stream
                    .collect()
                    .await
                    .map_err(|e| Error::storage(format!("Failed to read object body: {}", e)))?;
                Ok(aggregated.into_bytes().to_vec())
            }
        }
    }
}

impl std::fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let body = match &self.body {
            ObjectBody::Buffered(bytes) => format!("{} bytes", bytes.len()),
            ObjectBody::Stream(_) => "stream".to_string(),
        };
        f.debug_struct("StoredObject")
            .field("content_type", &self.content_type)
            .field("body", &body)
            .finish()
    }
}
