use thiserror::Error;

use crate::schema::FieldKind;

/// Failure reported by a backing store driver. The message is the driver's
/// own diagnostic text, preserved verbatim.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

impl From<clickhouse::error::Error> for StoreError {
    fn from(err: clickhouse::error::Error) -> Self {
        StoreError(err.to_string())
    }
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        StoreError(err.to_string())
    }
}

/// Namespace provisioning failed. The namespace stays unknown, so the next
/// request for it retries provisioning.
#[derive(Debug, Clone, Error)]
pub enum ProvisionError {
    #[error("invalid namespace `{0}`: expected [A-Za-z_][A-Za-z0-9_]*")]
    InvalidNamespace(String),

    #[error("analytics table creation failed for `{namespace}`: {source}")]
    Ddl {
        namespace: String,
        source: StoreError,
    },
}

/// An event field's runtime shape does not match its declared kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("field `{field}` expected {expected} but got {found}")]
pub struct TypeMismatch {
    pub field: &'static str,
    pub expected: FieldKind,
    pub found: String,
}

/// Fatal outcomes of a dual-store write. A document-mirror failure is not
/// one of these: it is surfaced on the successful ack instead.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error(transparent)]
    Provision(#[from] ProvisionError),

    #[error(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    #[error("analytics insert failed: {0}")]
    Analytics(StoreError),
}

/// An ad-hoc statement failed. Passed through to the caller unmodified.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct QueryError(#[from] pub StoreError);
