use super::types::*;
use crate::{Error, Result};
use async_trait::async_trait;
use tracing::debug;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns `None` when no object exists under `key`.
    async fn get(&self, key: &str) -> Result<Option<StoredObject>>;

    /// Writes `body` under `key`, replacing any existing object.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<()>;

    async fn list(&self, options: ListOptions) -> Result<ListPage>;
}

/// Which listing call failed while walking a bucket.
#[derive(Debug)]
pub enum ListingFailure {
    FirstPage(Error),
    Pagination(Error),
}

/// Walks every page of the bucket in order, one request at a time.
pub async fn collect_listing(
    store: &dyn BlobStore,
    page_size: i32,
) -> std::result::Result<Vec<ObjectEntry>, ListingFailure> {
    let first = store
        .list(ListOptions {
            limit: page_size,
            cursor: None,
        })
        .await
        .map_err(ListingFailure::FirstPage)?;

    let mut objects = first.objects;
    let mut truncated = first.truncated;
    let mut cursor = first.cursor;

    while truncated {
        let Some(next_cursor) = cursor.take() else {
            return Err(ListingFailure::Pagination(Error::storage(
                "Listing was truncated but no cursor was returned",
            )));
        };

        debug!("Fetching next listing page after {} objects", objects.len());

        let page = store
            .list(ListOptions {
                limit: page_size,
                cursor: Some(next_cursor),
            })
            .await
            .map_err(ListingFailure::Pagination)?;

        objects.extend(page.objects);
        truncated = page.truncated;
        cursor = page.cursor;
    }

    Ok(objects)
}
