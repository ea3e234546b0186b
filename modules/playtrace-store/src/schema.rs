//! Static schema for the event table: the field descriptor table and the
//! DDL / insert statements compiled from it. Declaration order here fixes
//! both the column order of the generated table and the positional
//! parameter order of inserts, so the two can never drift apart.

use std::fmt;

/// Semantic kind of an event field, driving both schema generation and
/// value coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Integer,
    Instant,
    Object,
}

impl FieldKind {
    /// ClickHouse column type for this kind. Unstructured objects persist
    /// as serialized JSON text in the analytics store.
    pub fn column_type(self) -> &'static str {
        match self {
            FieldKind::Text => "String",
            FieldKind::Integer => "Int64",
            FieldKind::Instant => "DateTime",
            FieldKind::Object => "String",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Integer => write!(f, "integer"),
            FieldKind::Instant => write!(f, "instant"),
            FieldKind::Object => write!(f, "object"),
        }
    }
}

/// One column of the event table. `name` is the canonical snake_case name,
/// serving wire JSON, ClickHouse column and Mongo document key alike.
#[derive(Debug, Clone, Copy)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub kind: FieldKind,
}

const fn field(name: &'static str, kind: FieldKind) -> FieldDescriptor {
    FieldDescriptor { name, kind }
}

/// Every field of the event shape, in stable order.
pub const FIELDS: &[FieldDescriptor] = &[
    field("player_id", FieldKind::Text),
    field("event_type", FieldKind::Text),
    field("event_data", FieldKind::Object),
    field("player_meta_data", FieldKind::Object),
    field("session_uid", FieldKind::Text),
    field("date_time", FieldKind::Instant),
    field("registered", FieldKind::Instant),
    field("app_version", FieldKind::Text),
    field("player_level", FieldKind::Integer),
    field("exp_count", FieldKind::Integer),
    field("session_num", FieldKind::Integer),
    field("soft_balance", FieldKind::Integer),
    field("hard_balance", FieldKind::Integer),
    field("stars_balance", FieldKind::Integer),
    field("energy_balance", FieldKind::Integer),
    field("traffic_source", FieldKind::Text),
    field("ad_company", FieldKind::Text),
    field("ad_name", FieldKind::Text),
];

/// The event's creation instant; the table is ordered and partitioned by it.
pub const CREATION_FIELD: &str = "date_time";

/// The fields the document collection is indexed on (descending).
pub fn instant_fields() -> impl Iterator<Item = &'static str> {
    FIELDS
        .iter()
        .filter(|f| f.kind == FieldKind::Instant)
        .map(|f| f.name)
}

/// True if `name` is safe to splice into a statement as a table or
/// collection name. Namespaces cannot be bound as parameters, so anything
/// else is rejected before it reaches a store.
pub fn is_valid_namespace(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// `CREATE TABLE IF NOT EXISTS` DDL for a namespace's event table.
/// Safe to execute unconditionally, so racing provisioning attempts are
/// individually harmless.
pub fn create_table_ddl(namespace: &str) -> String {
    let columns = FIELDS
        .iter()
        .map(|f| format!("{} {}", f.name, f.kind.column_type()))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE TABLE IF NOT EXISTS {namespace} ({columns}) \
         ENGINE = MergeTree PARTITION BY toYYYYMMDD({CREATION_FIELD}) ORDER BY {CREATION_FIELD}"
    )
}

/// Positional-placeholder insert statement for one event row, columns in
/// `FIELDS` order.
pub fn insert_statement(namespace: &str) -> String {
    let columns = FIELDS.iter().map(|f| f.name).collect::<Vec<_>>().join(", ");
    let placeholders = vec!["?"; FIELDS.len()].join(", ");
    format!("INSERT INTO {namespace} ({columns}) VALUES ({placeholders})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ddl_lists_every_field_in_order() {
        let ddl = create_table_ddl("game1");
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS game1 (player_id String, "));
        assert!(ddl.ends_with(
            "ENGINE = MergeTree PARTITION BY toYYYYMMDD(date_time) ORDER BY date_time"
        ));

        // Column order in the DDL matches descriptor order.
        let mut last = 0;
        for f in FIELDS {
            let pos = ddl
                .find(&format!("{} {}", f.name, f.kind.column_type()))
                .unwrap_or_else(|| panic!("column {} missing from DDL", f.name));
            assert!(pos >= last, "column {} out of order", f.name);
            last = pos;
        }
    }

    #[test]
    fn ddl_types_follow_kinds() {
        let ddl = create_table_ddl("g");
        assert!(ddl.contains("date_time DateTime"));
        assert!(ddl.contains("registered DateTime"));
        assert!(ddl.contains("event_data String"));
        assert!(ddl.contains("player_level Int64"));
    }

    #[test]
    fn insert_statement_agrees_with_ddl_column_order() {
        let stmt = insert_statement("game1");
        let columns: Vec<&str> = stmt
            .trim_start_matches("INSERT INTO game1 (")
            .split(") VALUES (")
            .next()
            .unwrap()
            .split(", ")
            .collect();
        assert_eq!(columns.len(), FIELDS.len());
        for (col, f) in columns.iter().zip(FIELDS) {
            assert_eq!(*col, f.name);
        }
        assert_eq!(stmt.matches('?').count(), FIELDS.len());
    }

    #[test]
    fn instant_fields_are_the_two_timestamps() {
        let fields: Vec<_> = instant_fields().collect();
        assert_eq!(fields, vec!["date_time", "registered"]);
    }

    #[test]
    fn namespace_validation() {
        assert!(is_valid_namespace("game1"));
        assert!(is_valid_namespace("_internal"));
        assert!(is_valid_namespace("My_Game_2"));
        assert!(!is_valid_namespace(""));
        assert!(!is_valid_namespace("1game"));
        assert!(!is_valid_namespace("game-1"));
        assert!(!is_valid_namespace("events; DROP TABLE users"));
    }
}
