use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::database::models::{InvalidItemId, Item, ItemDocument, ItemId, ItemPatch, NewItem};
use crate::database::{ItemFilter, ItemStore, StoreError};
use crate::pagination::{PageRequest, PaginationError};

#[derive(Debug, Error)]
pub enum ItemError {
    #[error(transparent)]
    InvalidParameter(#[from] PaginationError),

    #[error("Invalid item ID")]
    InvalidId(#[from] InvalidItemId),

    #[error("Item not found")]
    NotFound(ItemId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One page of the collection plus the live totals it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedItems {
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
    pub total_count: u64,
    pub items: Vec<Item>,
}

/// List/Create/Update/Delete over the item collection.
///
/// Every operation is a stateless round trip against the injected store; the
/// service holds no locks and performs no retries.
#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ItemStore> {
        &self.store
    }

    /// Validates the raw query values before touching the store, then counts
    /// and fetches the page. Count and fetch are separate calls, so the totals
    /// may disagree with the slice under concurrent writes.
    pub async fn list(
        &self,
        page: Option<&str>,
        limit: Option<&str>,
    ) -> Result<PaginatedItems, ItemError> {
        let request = PageRequest::parse(page, limit)?;

        let total_count = self.store.count(ItemFilter::All).await?;
        let total_pages = request.total_pages(total_count);

        let docs = self
            .store
            .find(ItemFilter::All, request.skip(), request.limit)
            .await?;
        let items: Vec<Item> = docs.into_iter().map(Item::from).collect();

        debug!(
            page = request.page,
            limit = request.limit,
            total_count,
            returned = items.len(),
            "listed items"
        );

        Ok(PaginatedItems {
            page: request.page,
            limit: request.limit,
            total_pages,
            total_count,
            items,
        })
    }

    /// Inserts the item, generating an id when none (or the zero id) is supplied.
    pub async fn create(&self, new_item: NewItem) -> Result<Item, ItemError> {
        let id = match new_item.id.as_deref().map(str::trim) {
            None | Some("") => ItemId::generate(),
            Some(raw) => {
                let id = ItemId::parse(raw)?;
                if id.is_zero() {
                    ItemId::generate()
                } else {
                    id
                }
            }
        };

        let item = Item {
            id,
            name: new_item.name,
            price: new_item.price,
        };
        let assigned = self.store.insert_one(&ItemDocument::from(&item)).await?;
        info!(id = %assigned, "created item");

        Ok(Item { id: assigned, ..item })
    }

    /// Merge-sets the present fields into the item identified by `id`.
    pub async fn update(&self, id: ItemId, patch: &ItemPatch) -> Result<ItemId, ItemError> {
        let matched = self.store.update_one(ItemFilter::ById(id), patch).await?;
        if matched == 0 {
            return Err(ItemError::NotFound(id));
        }
        info!(id = %id, "updated item");
        Ok(id)
    }

    pub async fn delete(&self, id: ItemId) -> Result<ItemId, ItemError> {
        let deleted = self.store.delete_one(ItemFilter::ById(id)).await?;
        if deleted == 0 {
            return Err(ItemError::NotFound(id));
        }
        info!(id = %id, "deleted item");
        Ok(id)
    }
}
