//! Columnar result set and scalar values.
//!
//! A session decodes engine rows onto the small `Value` scalar set;
//! anything without a dedicated variant is read back as text. The
//! console renderer goes through `Display` and the service path through
//! `to_json`, so both views of a result share one decode.

use std::fmt;

/// Columnar result of one executed statement.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryResult {
    /// Column names in the statement's projection order. Empty when the
    /// statement produced no row description (DDL, plain INSERT).
    pub columns: Vec<String>,

    /// Fetched rows, each aligned with `columns`.
    pub rows: Vec<Row>,
}

impl QueryResult {
    /// An empty result, as produced by a committed batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a result from column names and aligned rows.
    pub fn with_data(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// One fetched row, in column order.
pub type Row = Vec<Value>;

/// A single scalar read back from the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// SQL NULL, displayed as the `NULL` sentinel.
    #[default]
    Null,

    Bool(bool),

    /// Any integer width, widened to i64.
    Int(i64),

    Float(f64),

    String(String),

    /// Raw binary, never rendered verbatim.
    Bytes(Vec<u8>),
}

impl Value {
    /// JSON rendering for the service path.
    ///
    /// Bytes have no natural JSON form and degrade to a length
    /// placeholder; a non-finite float degrades to null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Int(v) => serde_json::Value::from(*v),
            Value::Float(v) => serde_json::Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(v) => serde_json::Value::String(v.clone()),
            Value::Bytes(v) => serde_json::Value::String(format!("<{} bytes>", v.len())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_null_sentinel() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Bool(false).to_string(), "false");
        assert_eq!(Value::Int(-7).to_string(), "-7");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::from("ada").to_string(), "ada");
    }

    #[test]
    fn bytes_display_as_length_placeholder() {
        let value = Value::Bytes(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(value.to_string(), "<4 bytes>");
        assert_eq!(value.to_json(), serde_json::json!("<4 bytes>"));
    }

    #[test]
    fn json_conversion_per_variant() {
        assert_eq!(Value::Null.to_json(), serde_json::Value::Null);
        assert_eq!(Value::Bool(true).to_json(), serde_json::json!(true));
        assert_eq!(Value::from(12i64).to_json(), serde_json::json!(12));
        assert_eq!(Value::from(1.25).to_json(), serde_json::json!(1.25));
        assert_eq!(Value::from("x").to_json(), serde_json::json!("x"));
    }

    #[test]
    fn non_finite_float_degrades_to_json_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
        assert_eq!(
            Value::Float(f64::INFINITY).to_json(),
            serde_json::Value::Null
        );
    }

    #[test]
    fn result_reports_row_count() {
        let result = QueryResult::with_data(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Value::Int(1), Value::from("ada")],
                vec![Value::Int(2), Value::Null],
            ],
        );

        assert!(!result.is_empty());
        assert_eq!(result.row_count(), 2);
        assert_eq!(result.columns.len(), 2);
    }

    #[test]
    fn fresh_result_is_empty() {
        let result = QueryResult::new();
        assert!(result.is_empty());
        assert!(result.columns.is_empty());
        assert_eq!(result.row_count(), 0);
    }
}
