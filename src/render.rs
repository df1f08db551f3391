//! Console rendering of query outcomes.
//!
//! Formats result sets as fixed-width text tables for the migration
//! runner's demonstration output. The service path serializes results to
//! JSON instead and does not truncate; see the server module.

use crate::db::QueryResult;
use crate::query::ExecutionOutcome;

/// Width of one table cell, including the trailing pad space.
const COLUMN_WIDTH: usize = 25;

/// Maximum printed characters per cell value.
const VALUE_WIDTH: usize = COLUMN_WIDTH - 1;

/// Width of the horizontal separator lines.
const SEPARATOR_WIDTH: usize = 80;

/// Renders an execution outcome as console text.
///
/// Failures render as a single line carrying the engine diagnostic; this
/// never panics, whatever the reason text contains.
pub fn render_outcome(outcome: &ExecutionOutcome) -> String {
    match outcome {
        ExecutionOutcome::Success(result) => render_result(result),
        ExecutionOutcome::Failure(reason) => format!("Query failed: {reason}"),
    }
}

/// Renders a result set as a fixed-width table with a row-count summary.
///
/// An empty result set renders as an explicit indicator rather than a
/// headers-only table.
pub fn render_result(result: &QueryResult) -> String {
    if result.rows.is_empty() {
        return "No results found.".to_string();
    }

    let separator = "-".repeat(SEPARATOR_WIDTH);
    let mut out = String::new();

    for column in &result.columns {
        out.push_str(&cell(column));
    }
    out.push('\n');
    out.push_str(&separator);
    out.push('\n');

    for row in &result.rows {
        for value in row {
            out.push_str(&cell(&value.to_string()));
        }
        out.push('\n');
    }

    out.push_str(&separator);
    out.push('\n');
    out.push_str(&format!("Total rows: {}", result.row_count()));

    out
}

/// Left-justifies text into one cell, truncating to the value width.
fn cell(text: &str) -> String {
    let truncated: String = text.chars().take(VALUE_WIDTH).collect();
    format!("{:<width$}", truncated, width = COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{QueryResult, Value};

    fn sample_result() -> QueryResult {
        QueryResult::with_data(
            vec!["id".to_string(), "name".to_string()],
            vec![
                vec![Value::Int(1), Value::from("Alice")],
                vec![Value::Int(2), Value::Null],
            ],
        )
    }

    #[test]
    fn test_render_empty_result_is_explicit() {
        let rendered = render_result(&QueryResult::new());
        assert_eq!(rendered, "No results found.");

        // Even with columns present, zero rows never renders a bare table.
        let empty = QueryResult::with_data(vec!["x".to_string()], vec![]);
        assert_eq!(render_result(&empty), "No results found.");
    }

    #[test]
    fn test_render_table_layout() {
        let rendered = render_result(&sample_result());
        let lines: Vec<&str> = rendered.lines().collect();

        assert!(lines[0].starts_with("id"));
        assert!(lines[0].contains("name"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert!(lines[2].starts_with("1"));
        assert!(lines[2].contains("Alice"));
        assert_eq!(*lines.last().unwrap(), "Total rows: 2");
    }

    #[test]
    fn test_render_null_sentinel() {
        let rendered = render_result(&sample_result());
        assert!(rendered.contains("NULL"));
    }

    #[test]
    fn test_render_truncates_long_values() {
        let long = "x".repeat(100);
        let result = QueryResult::with_data(
            vec!["col".to_string()],
            vec![vec![Value::String(long)]],
        );
        let rendered = render_result(&result);

        let value_line = rendered.lines().nth(2).unwrap();
        assert_eq!(value_line.trim_end().len(), VALUE_WIDTH);
    }

    #[test]
    fn test_render_outcome_failure() {
        let outcome = ExecutionOutcome::Failure("syntax error at or near \"SELEC\"".to_string());
        assert_eq!(
            render_outcome(&outcome),
            "Query failed: syntax error at or near \"SELEC\""
        );
    }

    #[test]
    fn test_render_outcome_success() {
        let outcome = ExecutionOutcome::Success(sample_result());
        assert!(render_outcome(&outcome).contains("Total rows: 2"));
    }
}
