//! Ad-hoc passthrough queries against the analytics store.
//!
//! The gateway forwards caller-supplied statement text unmodified, with no
//! validation or parameterization. Only privileged operational surfaces may
//! hold a gateway.

use serde_json::{Map, Value};

use crate::error::QueryError;
use crate::store::ArcAnalyticsStore;

pub struct QueryGateway {
    analytics: ArcAnalyticsStore,
}

impl QueryGateway {
    pub fn new(analytics: ArcAnalyticsStore) -> Self {
        Self { analytics }
    }

    /// Run a read statement; every result row becomes an ordered mapping
    /// from column name to a primitive or text value.
    pub async fn query_select(
        &self,
        statement: &str,
    ) -> Result<Vec<Map<String, Value>>, QueryError> {
        self.analytics
            .select(statement)
            .await
            .map_err(QueryError::from)
    }

    /// Run a statement with no expected result set.
    pub async fn query_exec(&self, statement: &str) -> Result<(), QueryError> {
        self.analytics.exec(statement).await.map_err(QueryError::from)
    }
}
