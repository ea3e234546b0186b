//! Store seams. The coordinator, registry and gateway talk to the backing
//! stores only through these traits, so tests can swap in doubles and the
//! production clients stay behind explicit context objects.

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::Document;
use serde_json::{Map, Value};

use crate::coerce::SqlValue;
use crate::error::StoreError;

/// SQL-speaking analytics store (system of record for querying).
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    /// Liveness probe, invoked by the HTTP layer before ingest.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Execute a statement with no result set.
    async fn exec(&self, statement: &str) -> Result<(), StoreError>;

    /// Insert one row through a positional-placeholder statement.
    /// The values must match the statement's placeholders in order.
    async fn insert_row(&self, statement: &str, values: &[SqlValue]) -> Result<(), StoreError>;

    /// Run a read statement; every result row becomes an ordered mapping
    /// from column name to value.
    async fn select(&self, statement: &str) -> Result<Vec<Map<String, Value>>, StoreError>;
}

/// Schema-flexible document store (best-effort mirror).
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert one document into a collection.
    async fn insert_document(&self, collection: &str, document: Document)
        -> Result<(), StoreError>;

    /// Create a single-field index on a collection.
    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        descending: bool,
    ) -> Result<(), StoreError>;
}

pub type ArcAnalyticsStore = Arc<dyn AnalyticsStore>;
pub type ArcDocumentStore = Arc<dyn DocumentStore>;
