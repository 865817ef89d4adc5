use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Document},
    options::{ClientOptions, Credential, FindOptions},
    Client, Collection, Database,
};
use std::future::Future;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::DatabaseConfig;
use crate::database::models::{ItemDocument, ItemId, ItemPatch};
use crate::database::store::{ItemFilter, ItemStore, StoreError};

struct MongoHandle {
    client: Client,
    database: Database,
    items: Collection<ItemDocument>,
}

/// MongoDB-backed gateway for the item collection.
///
/// Lifecycle: [`MongoItemStore::connect`] opens and pings the connection,
/// [`MongoItemStore::shutdown`] closes it. Calls made after shutdown fail with
/// [`StoreError::NotInitialized`].
pub struct MongoItemStore {
    handle: RwLock<Option<MongoHandle>>,
    call_timeout: Duration,
}

impl MongoItemStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let uri = config.connection_uri();
        let mut options = ClientOptions::parse(&uri).await?;
        options.app_name = Some("items-api".to_string());
        options.connect_timeout = Some(config.call_timeout());
        options.server_selection_timeout = Some(config.call_timeout());

        if let Some(user) = &config.user {
            let mut credential = Credential::default();
            credential.username = Some(user.clone());
            credential.password = config.password.clone();
            options.credential = Some(credential);
        }

        info!("Connecting to MongoDB at {}", config.host);
        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        let items = database.collection::<ItemDocument>(&config.collection);

        let store = Self {
            handle: RwLock::new(Some(MongoHandle {
                client,
                database,
                items,
            })),
            call_timeout: config.call_timeout(),
        };

        store.ping().await?;
        info!(
            "Connected to MongoDB database {} (collection {})",
            config.database, config.collection
        );
        Ok(store)
    }

    /// Closes the client. Idempotent.
    pub async fn shutdown(&self) {
        let handle = self.handle.write().await.take();
        if let Some(handle) = handle {
            handle.client.shutdown().await;
            info!("Closed MongoDB connection");
        }
    }

    async fn collection(&self) -> Result<Collection<ItemDocument>, StoreError> {
        self.handle
            .read()
            .await
            .as_ref()
            .map(|h| h.items.clone())
            .ok_or(StoreError::NotInitialized)
    }

    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = mongodb::error::Result<T>>,
    {
        bounded(self.call_timeout, operation, call).await
    }
}

/// Runs one driver call under `limit`. The call is awaited once; a driver
/// error is returned as is.
async fn bounded<T, F>(limit: Duration, operation: &'static str, call: F) -> Result<T, StoreError>
where
    F: Future<Output = mongodb::error::Result<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result.map_err(StoreError::from),
        Err(_) => Err(StoreError::Timeout {
            operation,
            after: limit,
        }),
    }
}

fn filter_document(filter: ItemFilter) -> Document {
    match filter {
        ItemFilter::All => doc! {},
        ItemFilter::ById(id) => doc! { "_id": id.as_object_id() },
    }
}

fn set_document(patch: &ItemPatch) -> Document {
    let mut set = Document::new();
    if let Some(name) = &patch.name {
        set.insert("name", name.clone());
    }
    if let Some(price) = patch.price {
        set.insert("price", price);
    }
    doc! { "$set": set }
}

#[async_trait]
impl ItemStore for MongoItemStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let database = self
            .handle
            .read()
            .await
            .as_ref()
            .map(|h| h.database.clone())
            .ok_or(StoreError::NotInitialized)?;
        self.bounded("ping", database.run_command(doc! { "ping": 1 }, None))
            .await?;
        Ok(())
    }

    async fn count(&self, filter: ItemFilter) -> Result<u64, StoreError> {
        let items = self.collection().await?;
        self.bounded("count", items.count_documents(filter_document(filter), None))
            .await
    }

    async fn find(
        &self,
        filter: ItemFilter,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<ItemDocument>, StoreError> {
        let items = self.collection().await?;
        let options = FindOptions::builder()
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .build();

        debug!(skip, limit, "find items");
        self.bounded("find", async {
            let cursor = items.find(filter_document(filter), options).await?;
            cursor.try_collect::<Vec<ItemDocument>>().await
        })
        .await
    }

    async fn insert_one(&self, doc: &ItemDocument) -> Result<ItemId, StoreError> {
        let items = self.collection().await?;
        let result = self.bounded("insert", items.insert_one(doc, None)).await?;
        Ok(result
            .inserted_id
            .as_object_id()
            .map(ItemId::from)
            .unwrap_or_else(|| ItemId::from(doc.id)))
    }

    async fn update_one(&self, filter: ItemFilter, patch: &ItemPatch) -> Result<u64, StoreError> {
        // `$set` with no fields is rejected by the server; report the match instead.
        if patch.is_empty() {
            return self.count(filter).await.map(|n| n.min(1));
        }

        let items = self.collection().await?;
        let result = self
            .bounded(
                "update",
                items.update_one(filter_document(filter), set_document(patch), None),
            )
            .await?;
        Ok(result.matched_count)
    }

    async fn delete_one(&self, filter: ItemFilter) -> Result<u64, StoreError> {
        let items = self.collection().await?;
        let result = self
            .bounded("delete", items.delete_one(filter_document(filter), None))
            .await?;
        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out() {
        let limit = Duration::from_secs(10);
        let err = bounded(limit, "find", std::future::pending::<mongodb::error::Result<()>>())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Timeout { operation: "find", after } if after == limit
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn call_finishing_within_limit_returns_its_value() {
        let value = bounded(Duration::from_secs(10), "count", async {
            tokio::time::sleep(Duration::from_secs(9)).await;
            Ok::<u64, mongodb::error::Error>(3)
        })
        .await
        .unwrap();
        assert_eq!(value, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn driver_error_passes_through_once() {
        let attempts = AtomicUsize::new(0);
        let err = bounded(Duration::from_secs(10), "insert", async {
            attempts.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(mongodb::error::Error::from(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "connection refused",
            )))
        })
        .await
        .unwrap_err();

        match err {
            StoreError::Backend(message) => assert!(message.contains("connection refused")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn filter_all_is_empty_document() {
        assert!(filter_document(ItemFilter::All).is_empty());
    }

    #[test]
    fn filter_by_id_targets_object_id() {
        let id = ItemId::generate();
        let filter = filter_document(ItemFilter::ById(id));
        assert_eq!(filter.get_object_id("_id").unwrap(), id.as_object_id());
    }

    #[test]
    fn set_document_only_contains_present_fields() {
        let patch = ItemPatch {
            name: None,
            price: Some(25),
        };
        let update = set_document(&patch);
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_i64("price").unwrap(), 25);
        assert!(set.get("name").is_none());
    }
}
