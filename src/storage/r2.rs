use super::{client::BlobStore, types::*};
use crate::{Error, Result, config::StorageConfig};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
};
use tracing::debug;

/// R2 bucket accessed through its S3-compatible endpoint.
#[derive(Clone)]
pub struct R2Store {
    client: Client,
    bucket: String,
}

impl R2Store {
    pub async fn new(config: &StorageConfig, account_id: Option<&str>) -> Result<Self> {
        let endpoint = config.resolved_endpoint(account_id).ok_or_else(|| {
            Error::config("storage.endpoint is not set and no account id is configured")
        })?;

        debug!("Creating R2 store for bucket {} at {}", config.bucket, endpoint);

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(endpoint);

        if let (Some(access_key), Some(secret_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            loader = loader.credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "r2-store",
            ));
        }

        let sdk_config = loader.load().await;
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self::from_client(
            Client::from_conf(s3_config),
            config.bucket.clone(),
        ))
    }

    pub fn from_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl BlobStore for R2Store {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        debug!("Fetching object {}", key);

        match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => {
                let content_type = output.content_type().map(str::to_string);
                Ok(Some(StoredObject::from_stream(output.body, content_type)))
            }
            Err(err) => {
                if err
                    .as_service_error()
                    .is_some_and(|service_err| service_err.is_no_such_key())
                {
                    return Ok(None);
                }
                Err(Error::storage(format!(
                    "get_object {} failed: {}",
                    key,
                    DisplayErrorContext(&err)
                )))
            }
        }
    }

    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()> {
        debug!("Writing {} bytes to {}", body.len(), key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| {
                Error::storage(format!(
                    "put_object {} failed: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn list(&self, options: ListOptions) -> Result<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .max_keys(options.limit)
            .set_continuation_token(options.cursor)
            .send()
            .await
            .map_err(|e| {
                Error::storage(format!("list_objects_v2 failed: {}", DisplayErrorContext(&e)))
            })?;

        let objects = output
            .contents()
            .iter()
            .filter_map(|object| {
                let key = object.key()?.to_string();
                Some(ObjectEntry {
                    key,
                    size: object.size().unwrap_or_default(),
                    etag: object.e_tag().map(|tag| tag.trim_matches('"').to_string()),
                    uploaded: object.last_modified().and_then(|ts| {
                        chrono::DateTime::from_timestamp(ts.secs(), ts.subsec_nanos())
                    }),
                    http_metadata: None,
                })
            })
            .collect();

        Ok(ListPage {
            objects,
            truncated: output.is_truncated().unwrap_or(false),
            cursor: output.next_continuation_token().map(str::to_string),
        })
    }
}
