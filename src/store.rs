//! Annotated SQL query store.
//!
//! A queries file is flat SQL text carved into addressable blocks by
//! marker lines of the form `-- Query <id> [title]`. Each block runs as a
//! single statement; comment lines inside a block are explanatory only
//! and are stripped before execution.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Line prefix that marks a SQL comment.
const COMMENT_PREFIX: &str = "--";

/// A single named query extracted from an annotated SQL file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Identifier from the marker line, unique by convention only.
    pub id: String,

    /// Free-text title from the marker line, or `"Query <id>"` when absent.
    pub title: String,

    /// The SQL text of the block, comment lines removed, trimmed.
    /// May be empty when the block held only comments.
    pub body: String,
}

fn marker_regex() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"^\s*--\s*Query\s+(\d+)\b(.*)$").expect("marker regex is valid")
    })
}

/// Parses annotated SQL text into an ordered sequence of query records.
///
/// Each record's body spans from immediately after its marker line to the
/// next marker line (or end of input). Lines whose first non-whitespace
/// characters are `--` are removed from bodies, so a block may carry
/// explanatory comments without affecting execution. Text before the
/// first marker is ignored, as are marker-like lines with a non-numeric
/// identifier (those read as plain comments).
///
/// No markers at all is not an error; the result is simply empty. A block
/// whose body is empty after stripping still produces a record, with an
/// empty body string, so callers can decide to skip execution.
pub fn parse(text: &str) -> Vec<QueryRecord> {
    let marker = marker_regex();
    let mut records = Vec::new();
    let mut current: Option<(String, String, Vec<&str>)> = None;

    for line in text.lines() {
        if let Some(caps) = marker.captures(line) {
            if let Some((id, title, body)) = current.take() {
                records.push(build_record(id, title, &body));
            }

            let id = caps[1].to_string();
            let title_text = caps[2].trim();
            let title = if title_text.is_empty() {
                format!("Query {id}")
            } else {
                title_text.to_string()
            };
            current = Some((id, title, Vec::new()));
        } else if let Some((_, _, body)) = current.as_mut() {
            body.push(line);
        }
    }

    if let Some((id, title, body)) = current.take() {
        records.push(build_record(id, title, &body));
    }

    records
}

/// Looks up a query by id. When the same id appears more than once, the
/// first occurrence wins.
pub fn find_query<'a>(records: &'a [QueryRecord], id: &str) -> Option<&'a QueryRecord> {
    records.iter().find(|record| record.id == id)
}

fn build_record(id: String, title: String, body_lines: &[&str]) -> QueryRecord {
    let body = body_lines
        .iter()
        .filter(|line| !line.trim_start().starts_with(COMMENT_PREFIX))
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string();

    QueryRecord { id, title, body }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_markers_returns_empty() {
        assert!(parse("").is_empty());
        assert!(parse("SELECT 1;\nSELECT 2;").is_empty());
        assert!(parse("-- just a comment\n-- another\n").is_empty());
    }

    #[test]
    fn test_parse_three_markers_in_order() {
        let text = "-- Query 1\nSELECT a;\n-- Query 2\nSELECT b;\n-- Query 3\nSELECT c;";
        let records = parse(text);

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[1].id, "2");
        assert_eq!(records[2].id, "3");
        assert_eq!(records[0].body, "SELECT a;");
        assert_eq!(records[1].body, "SELECT b;");
        assert_eq!(records[2].body, "SELECT c;");

        // No body carries its own marker line or a neighbor's.
        for record in &records {
            assert!(!record.body.contains("-- Query"));
        }
    }

    #[test]
    fn test_parse_title_and_default_title() {
        let text = "-- Query 1 Count rows\nSELECT count(*) FROM t;\n-- Query 2\nSELECT 1;";
        let records = parse(text);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "1");
        assert_eq!(records[0].title, "Count rows");
        assert_eq!(records[0].body, "SELECT count(*) FROM t;");
        assert_eq!(records[1].id, "2");
        assert_eq!(records[1].title, "Query 2");
        assert_eq!(records[1].body, "SELECT 1;");
    }

    #[test]
    fn test_parse_strips_comment_lines_from_body() {
        let text = "-- Query 5 Commented\n-- explains the join\nSELECT *\n  -- inline note\nFROM t;";
        let records = parse(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "SELECT *\nFROM t;");
        assert!(!records[0].body.contains("--"));
    }

    #[test]
    fn test_parse_empty_body_still_produces_record() {
        // Next marker immediately follows the first.
        let records = parse("-- Query 1\n-- Query 2\nSELECT 1;");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].body.len(), 0);

        // Comment stripping empties the body.
        let records = parse("-- Query 1\n-- only a comment here\n");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body.len(), 0);
    }

    #[test]
    fn test_parse_ignores_malformed_marker() {
        // Non-numeric identifier does not match, and reads as a comment.
        let text = "-- Query 1\nSELECT a;\n-- Query abc\nSELECT b;";
        let records = parse(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "SELECT a;\nSELECT b;");
    }

    #[test]
    fn test_parse_rejects_identifier_glued_to_text() {
        let records = parse("-- Query 12abc\nSELECT 1;");
        assert!(records.is_empty());
    }

    #[test]
    fn test_parse_ignores_text_before_first_marker() {
        let text = "SELECT ignored;\n-- Query 1\nSELECT kept;";
        let records = parse(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "SELECT kept;");
    }

    #[test]
    fn test_parse_last_record_spans_to_end_of_input() {
        let text = "-- Query 9\nSELECT 1\nFROM t\nWHERE x > 0;\n";
        let records = parse(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].body, "SELECT 1\nFROM t\nWHERE x > 0;");
    }

    #[test]
    fn test_find_query_first_occurrence_wins() {
        let text = "-- Query 1 First\nSELECT 'first';\n-- Query 1 Second\nSELECT 'second';";
        let records = parse(text);

        assert_eq!(records.len(), 2);
        let found = find_query(&records, "1").unwrap();
        assert_eq!(found.title, "First");
        assert_eq!(found.body, "SELECT 'first';");
    }

    #[test]
    fn test_find_query_missing_id() {
        let records = parse("-- Query 1\nSELECT 1;");
        assert!(find_query(&records, "2").is_none());
    }
}
