use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::database::models::{ItemDocument, ItemId, ItemPatch};

/// Errors surfaced by a store gateway. Calls are never retried.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Item store is not initialized")]
    NotInitialized,

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("{0}")]
    Backend(String),

    #[error("failed to decode document: {0}")]
    Decode(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            mongodb::error::ErrorKind::BsonDeserialization(_) => StoreError::Decode(err.to_string()),
            _ => StoreError::Backend(err.to_string()),
        }
    }
}

/// Document selector understood by every gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemFilter {
    All,
    ById(ItemId),
}

impl ItemFilter {
    pub fn matches(&self, doc: &ItemDocument) -> bool {
        match self {
            ItemFilter::All => true,
            ItemFilter::ById(id) => doc.id == id.as_object_id(),
        }
    }
}

/// Store gateway over the single item collection.
///
/// Implementations hold one live connection and are shared by every request.
/// No client-side locking across calls: `count` followed by `find` is not a
/// snapshot.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Connectivity check against the backing database.
    async fn ping(&self) -> Result<(), StoreError>;

    async fn count(&self, filter: ItemFilter) -> Result<u64, StoreError>;

    /// At most `limit` documents after bypassing `skip`, in store-native order.
    async fn find(
        &self,
        filter: ItemFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ItemDocument>, StoreError>;

    /// Returns the id the store assigned.
    async fn insert_one(&self, doc: &ItemDocument) -> Result<ItemId, StoreError>;

    /// Merge-sets the patch into the first matching document. Returns the
    /// matched count; an empty patch matches without writing.
    async fn update_one(&self, filter: ItemFilter, patch: &ItemPatch) -> Result<u64, StoreError>;

    /// Returns the deleted count.
    async fn delete_one(&self, filter: ItemFilter) -> Result<u64, StoreError>;
}
