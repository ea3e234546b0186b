//! Type-directed coercion of raw event field values into the two store
//! encodings. Both representations come from the same kind dispatch, so the
//! stores can disagree on encoding but never on meaning.

use chrono::{DateTime, Utc};
use mongodb::bson::{self, Bson};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::error::TypeMismatch;
use crate::schema::{FieldDescriptor, FieldKind};

/// A field value in positional SQL-bindable form.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Int(i64),
    Timestamp(DateTime<Utc>),
}

// Serialized into the positional placeholder of the insert statement.
// Timestamps bind as epoch seconds, which ClickHouse accepts for DateTime
// columns.
impl Serialize for SqlValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SqlValue::Text(v) => serializer.serialize_str(v),
            SqlValue::Int(v) => serializer.serialize_i64(*v),
            SqlValue::Timestamp(v) => serializer.serialize_i64(v.timestamp()),
        }
    }
}

/// A field coerced into both store representations.
#[derive(Debug, Clone)]
pub struct CoercedField {
    pub sql: SqlValue,
    pub doc: Bson,
}

/// Coerce one raw field value according to its declared kind.
///
/// Fails with [`TypeMismatch`] when the runtime shape does not match the
/// kind; the caller aborts the whole write before touching either store.
pub fn coerce(field: &FieldDescriptor, raw: &Value) -> Result<CoercedField, TypeMismatch> {
    let mismatch = |found: String| TypeMismatch {
        field: field.name,
        expected: field.kind,
        found,
    };

    match field.kind {
        FieldKind::Text => {
            let text = raw.as_str().ok_or_else(|| mismatch(shape_of(raw)))?;
            Ok(CoercedField {
                sql: SqlValue::Text(text.to_string()),
                doc: Bson::String(text.to_string()),
            })
        }
        FieldKind::Integer => {
            let n = raw.as_i64().ok_or_else(|| mismatch(shape_of(raw)))?;
            Ok(CoercedField {
                sql: SqlValue::Int(n),
                doc: Bson::Int64(n),
            })
        }
        FieldKind::Instant => {
            let secs = raw.as_i64().ok_or_else(|| mismatch(shape_of(raw)))?;
            let ts = DateTime::from_timestamp(secs, 0)
                .ok_or_else(|| mismatch(format!("out-of-range timestamp {secs}")))?;
            Ok(CoercedField {
                sql: SqlValue::Timestamp(ts),
                doc: Bson::DateTime(bson::DateTime::from_millis(secs * 1000)),
            })
        }
        FieldKind::Object => {
            if !raw.is_object() {
                return Err(mismatch(shape_of(raw)));
            }
            let doc = bson::to_bson(raw)
                .map_err(|e| mismatch(format!("unrepresentable object: {e}")))?;
            Ok(CoercedField {
                // Serialized JSON text for the analytics store, native
                // sub-document for the mirror.
                sql: SqlValue::Text(raw.to_string()),
                doc,
            })
        }
    }
}

fn shape_of(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}
