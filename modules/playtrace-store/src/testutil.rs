//! Counting, failable store doubles for tests.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use mongodb::bson::Document;
use serde_json::{Map, Value};

use crate::coerce::SqlValue;
use crate::error::StoreError;
use crate::store::{AnalyticsStore, DocumentStore};

/// In-memory analytics store recording every call.
#[derive(Default)]
pub struct MockAnalytics {
    executed: Mutex<Vec<String>>,
    rows: Mutex<Vec<(String, Vec<SqlValue>)>>,
    select_rows: Mutex<Vec<Map<String, Value>>>,
    fail_exec: AtomicBool,
    fail_insert: AtomicBool,
    fail_select: AtomicBool,
    exec_delay: Option<Duration>,
}

impl MockAnalytics {
    /// Sleep inside `exec` to widen provisioning races.
    pub fn with_exec_delay_ms(mut self, millis: u64) -> Self {
        self.exec_delay = Some(Duration::from_millis(millis));
        self
    }

    pub fn fail_exec(&self, fail: bool) {
        self.fail_exec.store(fail, Ordering::SeqCst);
    }

    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_select(&self, fail: bool) {
        self.fail_select.store(fail, Ordering::SeqCst);
    }

    /// Rows to return from the next `select`.
    pub fn set_select_rows(&self, rows: Vec<Map<String, Value>>) {
        *self.select_rows.lock().unwrap() = rows;
    }

    /// Statements run through `exec`, in order.
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }

    /// Rows inserted through `insert_row`: (statement, bind values).
    pub fn inserted(&self) -> Vec<(String, Vec<SqlValue>)> {
        self.rows.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnalyticsStore for MockAnalytics {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn exec(&self, statement: &str) -> Result<(), StoreError> {
        if let Some(delay) = self.exec_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_exec.load(Ordering::SeqCst) {
            return Err(StoreError("mock exec failure".into()));
        }
        self.executed.lock().unwrap().push(statement.to_string());
        Ok(())
    }

    async fn insert_row(&self, statement: &str, values: &[SqlValue]) -> Result<(), StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError("mock insert failure".into()));
        }
        self.rows
            .lock()
            .unwrap()
            .push((statement.to_string(), values.to_vec()));
        Ok(())
    }

    async fn select(&self, _statement: &str) -> Result<Vec<Map<String, Value>>, StoreError> {
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(StoreError("mock select failure".into()));
        }
        Ok(self.select_rows.lock().unwrap().clone())
    }
}

/// In-memory document store recording every call.
#[derive(Default)]
pub struct MockDocuments {
    documents: Mutex<Vec<(String, Document)>>,
    indexes: Mutex<Vec<(String, String, bool)>>,
    fail_insert: AtomicBool,
    fail_index: AtomicBool,
}

impl MockDocuments {
    pub fn fail_insert(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn fail_index(&self, fail: bool) {
        self.fail_index.store(fail, Ordering::SeqCst);
    }

    /// Documents inserted: (collection, document).
    pub fn documents(&self) -> Vec<(String, Document)> {
        self.documents.lock().unwrap().clone()
    }

    /// Indexes created: (collection, field, descending).
    pub fn indexes(&self) -> Vec<(String, String, bool)> {
        self.indexes.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MockDocuments {
    async fn insert_document(
        &self,
        collection: &str,
        document: Document,
    ) -> Result<(), StoreError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError("mock document insert failure".into()));
        }
        self.documents
            .lock()
            .unwrap()
            .push((collection.to_string(), document));
        Ok(())
    }

    async fn create_index(
        &self,
        collection: &str,
        field: &str,
        descending: bool,
    ) -> Result<(), StoreError> {
        if self.fail_index.load(Ordering::SeqCst) {
            return Err(StoreError("mock index failure".into()));
        }
        self.indexes
            .lock()
            .unwrap()
            .push((collection.to_string(), field.to_string(), descending));
        Ok(())
    }
}
