//! Production ClickHouse client. Speaks the HTTP protocol through the
//! `clickhouse` crate; every call is bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use clickhouse::Client;
use serde_json::{Map, Value};

use crate::coerce::SqlValue;
use crate::error::StoreError;
use crate::store::AnalyticsStore;

/// Thin wrapper around `clickhouse::Client` providing connection setup.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: Client,
    timeout: Duration,
}

impl ClickHouseStore {
    /// Build a client against the given HTTP endpoint and database.
    /// The underlying client pools connections and is cheap to clone.
    pub fn connect(url: &str, database: &str, timeout: Duration) -> Self {
        let client = Client::default().with_url(url).with_database(database);
        Self { client, timeout }
    }

    async fn bounded<T>(
        &self,
        call: impl std::future::Future<Output = Result<T, clickhouse::error::Error>>,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError(format!(
                "clickhouse call timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

#[async_trait]
impl AnalyticsStore for ClickHouseStore {
    /// The HTTP client holds no session to re-open, so a failed ping is a
    /// health signal for the caller to log; the next statement surfaces the
    /// real error.
    async fn ping(&self) -> Result<(), StoreError> {
        self.bounded(self.client.query("SELECT 1").execute()).await
    }

    async fn exec(&self, statement: &str) -> Result<(), StoreError> {
        self.bounded(self.client.query(statement).execute()).await
    }

    async fn insert_row(&self, statement: &str, values: &[SqlValue]) -> Result<(), StoreError> {
        let mut query = self.client.query(statement);
        for value in values {
            query = query.bind(value);
        }
        self.bounded(query.execute()).await
    }

    async fn select(&self, statement: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
        let mut cursor = self
            .client
            .query(statement)
            .fetch_bytes("JSONEachRow")
            .map_err(StoreError::from)?;
        let bytes = self.bounded(cursor.collect()).await?;

        let mut rows = Vec::new();
        for line in bytes.split(|b| *b == b'\n') {
            if line.is_empty() {
                continue;
            }
            let row: Map<String, Value> = serde_json::from_slice(line)
                .map_err(|e| StoreError(format!("malformed result row: {e}")))?;
            rows.push(row);
        }
        Ok(rows)
    }
}
