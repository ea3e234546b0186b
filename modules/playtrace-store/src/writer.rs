//! Dual-store write coordinator: ensure the namespace exists, coerce the
//! event once for both stores, commit the analytics row, then mirror it
//! best-effort into the document store.

use mongodb::bson::Document;
use serde_json::Value;
use tracing::warn;

use playtrace_common::Event;

use crate::coerce::{self, SqlValue};
use crate::error::{TypeMismatch, WriteError};
use crate::registry::NamespaceRegistry;
use crate::schema::{self, FIELDS};
use crate::store::{ArcAnalyticsStore, ArcDocumentStore};

/// Acknowledgement of a committed write. The analytics row is in; the
/// mirror either followed or failed with the recorded diagnostic.
#[derive(Debug, Clone, Default)]
pub struct WriteAck {
    pub mirror_error: Option<String>,
}

/// Coordinates event writes across the analytics store and the document
/// mirror. Shared across all request handlers.
pub struct EventWriter {
    analytics: ArcAnalyticsStore,
    documents: ArcDocumentStore,
    registry: NamespaceRegistry,
}

impl EventWriter {
    pub fn new(analytics: ArcAnalyticsStore, documents: ArcDocumentStore) -> Self {
        Self {
            analytics,
            documents,
            registry: NamespaceRegistry::new(),
        }
    }

    /// Record one event under the given namespace.
    ///
    /// The analytics insert is the commit point: its failure fails the
    /// request and skips the mirror entirely. A mirror failure after the
    /// commit is logged and reported on the ack; it never fails the request.
    pub async fn write(&self, namespace: &str, event: &Event) -> Result<WriteAck, WriteError> {
        self.registry
            .ensure_ready(namespace, self.analytics.as_ref(), self.documents.as_ref())
            .await?;

        let (values, document) = coerce_event(event)?;

        self.analytics
            .insert_row(&schema::insert_statement(namespace), &values)
            .await
            .map_err(WriteError::Analytics)?;

        match self.documents.insert_document(namespace, document).await {
            Ok(()) => Ok(WriteAck::default()),
            Err(error) => {
                warn!(namespace, %error, "document mirror insert failed");
                Ok(WriteAck {
                    mirror_error: Some(error.to_string()),
                })
            }
        }
    }
}

/// Coerce every declared field of the event into the positional SQL row and
/// the mirror document, in descriptor order. Any shape violation aborts the
/// whole write before either store is touched.
pub fn coerce_event(event: &Event) -> Result<(Vec<SqlValue>, Document), TypeMismatch> {
    let raw = serde_json::to_value(event).expect("event serializes to a JSON object");

    let mut values = Vec::with_capacity(FIELDS.len());
    let mut document = Document::new();
    for field in FIELDS {
        let raw_field = raw.get(field.name).unwrap_or(&Value::Null);
        let coerced = coerce::coerce(field, raw_field)?;
        values.push(coerced.sql);
        document.insert(field.name, coerced.doc);
    }
    Ok((values, document))
}
