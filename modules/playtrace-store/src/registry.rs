//! Tracks which namespaces already have their analytics table and document
//! collection, and provisions missing ones at most once per process
//! lifetime.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OnceCell};
use tracing::{info, warn};

use crate::error::ProvisionError;
use crate::schema;
use crate::store::{AnalyticsStore, DocumentStore};

/// Shared set of known-ready namespaces.
///
/// The map mutex is held only across the membership check-and-mark; the
/// provisioning I/O itself runs inside the namespace's own cell, so racing
/// first-writers of one namespace serialize on that cell while unrelated
/// namespaces provision in parallel.
#[derive(Default)]
pub struct NamespaceRegistry {
    known: Mutex<HashMap<String, Arc<OnceCell<()>>>>,
}

impl NamespaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure the namespace's backing entities exist.
    ///
    /// The first caller for a namespace creates the analytics table and the
    /// document collection's indexes; concurrent callers wait for that
    /// attempt. Once a namespace is ready every further call returns without
    /// contacting either store. A failed table creation leaves the namespace
    /// unknown, so the next request retries; a failed index creation is
    /// reported but does not block writes to the table.
    pub async fn ensure_ready(
        &self,
        namespace: &str,
        analytics: &dyn AnalyticsStore,
        documents: &dyn DocumentStore,
    ) -> Result<(), ProvisionError> {
        if !schema::is_valid_namespace(namespace) {
            return Err(ProvisionError::InvalidNamespace(namespace.to_string()));
        }

        let cell = {
            let mut known = self.known.lock().await;
            known.entry(namespace.to_string()).or_default().clone()
        };

        cell.get_or_try_init(|| provision(namespace, analytics, documents))
            .await?;
        Ok(())
    }
}

async fn provision(
    namespace: &str,
    analytics: &dyn AnalyticsStore,
    documents: &dyn DocumentStore,
) -> Result<(), ProvisionError> {
    analytics
        .exec(&schema::create_table_ddl(namespace))
        .await
        .map_err(|source| ProvisionError::Ddl {
            namespace: namespace.to_string(),
            source,
        })?;

    // Creating the indexes also creates the collection. Index failures are
    // non-fatal: the table exists, so writes can proceed.
    for field in schema::instant_fields() {
        if let Err(error) = documents.create_index(namespace, field, true).await {
            warn!(namespace, field, %error, "document index creation failed");
        }
    }

    info!(namespace, "namespace provisioned");
    Ok(())
}
