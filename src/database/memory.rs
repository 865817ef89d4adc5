use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::database::models::{ItemDocument, ItemId, ItemPatch};
use crate::database::store::{ItemFilter, ItemStore, StoreError};

/// Process-local gateway used for development (`STORE_BACKEND=memory`) and tests.
///
/// Insertion order is the store-native order returned by `find`.
pub struct InMemoryItemStore {
    docs: RwLock<Option<Vec<ItemDocument>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(Some(Vec::new())),
        }
    }

    pub fn with_documents(docs: Vec<ItemDocument>) -> Self {
        Self {
            docs: RwLock::new(Some(docs)),
        }
    }

    /// Drops all documents; later calls fail with `NotInitialized`.
    pub async fn shutdown(&self) {
        if self.docs.write().await.take().is_some() {
            info!("Closed in-memory item store");
        }
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        match self.docs.read().await.as_ref() {
            Some(_) => Ok(()),
            None => Err(StoreError::NotInitialized),
        }
    }

    async fn count(&self, filter: ItemFilter) -> Result<u64, StoreError> {
        let guard = self.docs.read().await;
        let docs = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        Ok(docs.iter().filter(|d| filter.matches(d)).count() as u64)
    }

    async fn find(
        &self,
        filter: ItemFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ItemDocument>, StoreError> {
        let guard = self.docs.read().await;
        let docs = guard.as_ref().ok_or(StoreError::NotInitialized)?;
        let skip = usize::try_from(skip).unwrap_or(usize::MAX);
        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(docs
            .iter()
            .filter(|d| filter.matches(d))
            .skip(skip)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn insert_one(&self, doc: &ItemDocument) -> Result<ItemId, StoreError> {
        let mut guard = self.docs.write().await;
        let docs = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        if docs.iter().any(|d| d.id == doc.id) {
            return Err(StoreError::Backend(format!(
                "E11000 duplicate key error collection: items index: _id_ dup key: {{ _id: ObjectId('{}') }}",
                doc.id.to_hex()
            )));
        }
        docs.push(doc.clone());
        Ok(ItemId::from(doc.id))
    }

    async fn update_one(&self, filter: ItemFilter, patch: &ItemPatch) -> Result<u64, StoreError> {
        let mut guard = self.docs.write().await;
        let docs = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        match docs.iter_mut().find(|d| filter.matches(d)) {
            Some(doc) => {
                patch.apply_to(doc);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_one(&self, filter: ItemFilter) -> Result<u64, StoreError> {
        let mut guard = self.docs.write().await;
        let docs = guard.as_mut().ok_or(StoreError::NotInitialized)?;
        match docs.iter().position(|d| filter.matches(d)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::oid::ObjectId;

    fn doc(name: &str, price: i64) -> ItemDocument {
        ItemDocument {
            id: ObjectId::new(),
            name: name.to_string(),
            price,
        }
    }

    #[tokio::test]
    async fn find_respects_skip_limit_and_insertion_order() {
        let docs: Vec<_> = (0..5).map(|i| doc(&format!("item-{i}"), i)).collect();
        let store = InMemoryItemStore::with_documents(docs);

        let page = store.find(ItemFilter::All, 1, 2).await.unwrap();
        let names: Vec<_> = page.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["item-1", "item-2"]);

        assert!(store.find(ItemFilter::All, 10, 2).await.unwrap().is_empty());
        assert_eq!(store.count(ItemFilter::All).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_backend_error() {
        let store = InMemoryItemStore::new();
        let d = doc("Book", 20);
        store.insert_one(&d).await.unwrap();
        assert!(matches!(store.insert_one(&d).await, Err(StoreError::Backend(_))));
    }

    #[tokio::test]
    async fn update_and_delete_report_counts() {
        let d = doc("Book", 20);
        let id = ItemId::from(d.id);
        let store = InMemoryItemStore::with_documents(vec![d]);

        let patch = ItemPatch {
            name: Some("Book2".to_string()),
            price: None,
        };
        assert_eq!(store.update_one(ItemFilter::ById(id), &patch).await.unwrap(), 1);
        let stored = store.find(ItemFilter::ById(id), 0, 1).await.unwrap();
        assert_eq!(stored[0].name, "Book2");
        assert_eq!(stored[0].price, 20);

        assert_eq!(store.delete_one(ItemFilter::ById(id)).await.unwrap(), 1);
        assert_eq!(store.delete_one(ItemFilter::ById(id)).await.unwrap(), 0);
        assert_eq!(store.update_one(ItemFilter::ById(id), &patch).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn calls_after_shutdown_fail() {
        let store = InMemoryItemStore::new();
        store.shutdown().await;
        assert!(matches!(store.ping().await, Err(StoreError::NotInitialized)));
        assert!(matches!(
            store.count(ItemFilter::All).await,
            Err(StoreError::NotInitialized)
        ));
    }
}
