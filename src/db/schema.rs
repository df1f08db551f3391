//! Introspected schema shapes.
//!
//! Mirrors what `information_schema` reports for the `public` schema:
//! base tables and their columns in ordinal order. Column fields
//! serialize under the catalog's own names (`column_name`,
//! `column_default`), which is the shape the introspection endpoint
//! emits.

use serde::{Deserialize, Serialize};

/// Base tables reported by the catalog, ordered by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    pub tables: Vec<Table>,
}

/// One base table and its columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
}

/// One column, as described by `information_schema.columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "column_name")]
    pub name: String,

    pub data_type: String,

    pub is_nullable: bool,

    #[serde(rename = "column_default")]
    pub default: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_serializes_under_catalog_names() {
        let col = Column {
            name: "id".to_string(),
            data_type: "integer".to_string(),
            is_nullable: false,
            default: Some("nextval('users_id_seq'::regclass)".to_string()),
        };
        let json = serde_json::to_value(&col).unwrap();

        assert_eq!(json["column_name"], "id");
        assert_eq!(json["data_type"], "integer");
        assert_eq!(json["is_nullable"], false);
        assert!(json["column_default"]
            .as_str()
            .unwrap()
            .contains("users_id_seq"));
        assert!(json.get("name").is_none());
    }

    #[test]
    fn absent_default_serializes_as_null() {
        let col = Column {
            name: "email".to_string(),
            data_type: "character varying".to_string(),
            is_nullable: true,
            default: None,
        };
        let json = serde_json::to_value(&col).unwrap();

        assert_eq!(json["column_default"], serde_json::Value::Null);
    }

    #[test]
    fn schema_round_trips_through_json() {
        let schema = Schema {
            tables: vec![Table {
                name: "users".to_string(),
                columns: vec![Column {
                    name: "id".to_string(),
                    data_type: "integer".to_string(),
                    is_nullable: false,
                    default: None,
                }],
            }],
        };

        let json = serde_json::to_string(&schema).unwrap();
        let back: Schema = serde_json::from_str(&json).unwrap();

        assert_eq!(back.tables.len(), 1);
        assert_eq!(back.tables[0].name, "users");
        assert_eq!(back.tables[0].columns[0].name, "id");
    }
}
