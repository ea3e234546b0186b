pub mod clickhouse;
pub mod coerce;
pub mod error;
pub mod mongo;
pub mod query;
pub mod registry;
pub mod schema;
pub mod store;
pub mod writer;

#[cfg(any(test, feature = "test-support"))]
pub mod testutil;

pub use self::clickhouse::ClickHouseStore;
pub use coerce::{coerce, CoercedField, SqlValue};
pub use error::{ProvisionError, QueryError, StoreError, TypeMismatch, WriteError};
pub use mongo::MongoStore;
pub use query::QueryGateway;
pub use registry::NamespaceRegistry;
pub use schema::{FieldDescriptor, FieldKind, FIELDS};
pub use store::{AnalyticsStore, ArcAnalyticsStore, ArcDocumentStore, DocumentStore};
pub use writer::{EventWriter, WriteAck};
