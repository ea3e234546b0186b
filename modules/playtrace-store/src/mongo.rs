//! Production MongoDB client for the document mirror.

use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database, IndexModel};

use crate::error::StoreError;
use crate::store::DocumentStore;

/// Thin wrapper around a `mongodb::Database` providing connection setup.
#[derive(Clone)]
pub struct MongoStore {
    db: Database,
    timeout: Duration,
}

impl MongoStore {
    /// Connect and verify the deployment is reachable.
    pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await.map_err(StoreError::from)?;
        let db = client.database(database);
        let store = Self { db, timeout };
        store.ping().await?;
        Ok(store)
    }

    /// Round-trip liveness probe.
    pub async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(async { self.db.run_command(doc! { "ping": 1 }).await.map(|_| ()) })
            .await
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, mongodb::error::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError(format!(
                "mongodb call timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        let col = self.db.collection::<Document>(collection);
        self.bounded(async move { col.insert_one(document).await.map(|_| ()) })
            .await
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        descending: bool,
    ) -> Result<(), StoreError> {
        let mut keys = Document::new();
        keys.insert(field, Bson::Int32(if descending { -1 } else { 1 }));
        let model = IndexModel::builder().keys(keys).build();
        let col = self.db.collection::<Document>(collection);
        self.bounded(async move { col.create_index(model).await.map(|_| ()) })
            .await
    }
}
