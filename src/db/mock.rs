//! Mock database session for testing.
//!
//! Provides an in-memory session implementation so the executor, the
//! console runner, and the HTTP handlers can be tested without a live
//! database.

use super::{DatabaseSession, QueryResult, Schema, Value};
use crate::config::TimeoutConfig;
use crate::error::{LabError, Result};
use async_trait::async_trait;

/// A mock session that records what it was asked to do and returns
/// predefined results.
pub struct MockSession {
    schema: Schema,
    fail_with: Option<String>,

    /// Number of times the timeout policy was applied.
    pub timeouts_applied: usize,

    /// Batches executed, in order.
    pub batches: Vec<String>,

    /// Queries executed, in order.
    pub queries: Vec<String>,
}

impl MockSession {
    /// Creates a new mock session with an empty schema.
    pub fn new() -> Self {
        Self {
            schema: Schema::default(),
            fail_with: None,
            timeouts_applied: 0,
            batches: Vec::new(),
            queries: Vec::new(),
        }
    }

    /// Creates a mock session with the given schema.
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            schema,
            ..Self::new()
        }
    }

    /// Creates a mock session whose statement operations fail with the
    /// given engine diagnostic.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            fail_with: Some(message.into()),
            ..Self::new()
        }
    }

    fn fail_if_configured(&self) -> Result<()> {
        match &self.fail_with {
            Some(message) => Err(LabError::query(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MockSession {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseSession for MockSession {
    async fn apply_timeouts(&mut self, _timeouts: &TimeoutConfig) -> Result<()> {
        self.timeouts_applied += 1;
        Ok(())
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        self.fail_if_configured()?;
        self.batches.push(sql.to_string());
        Ok(())
    }

    async fn run_query(&mut self, sql: &str) -> Result<QueryResult> {
        self.fail_if_configured()?;
        self.queries.push(sql.to_string());

        if sql.trim_start().to_uppercase().starts_with("SELECT") {
            Ok(QueryResult::with_data(
                vec!["result".to_string()],
                vec![vec![Value::String(format!("mock result for: {sql}"))]],
            ))
        } else {
            // Non-SELECT statements return no row description.
            Ok(QueryResult::new())
        }
    }

    async fn introspect_schema(&mut self) -> Result<Schema> {
        Ok(self.schema.clone())
    }

    async fn close(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_select() {
        let mut session = MockSession::new();
        let result = session.run_query("SELECT 1").await.unwrap();

        assert_eq!(result.columns, vec!["result"]);
        assert_eq!(result.row_count(), 1);
        assert_eq!(session.queries, vec!["SELECT 1"]);
    }

    #[tokio::test]
    async fn test_mock_non_select_is_empty() {
        let mut session = MockSession::new();
        let result = session.run_query("INSERT INTO t VALUES (1)").await.unwrap();

        assert!(result.is_empty());
        assert!(result.columns.is_empty());
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mut session = MockSession::failing("syntax error at or near \"SELEC\"");
        let result = session.run_query("SELEC 1").await;

        assert!(matches!(result, Err(LabError::Query(_))));
    }

    #[tokio::test]
    async fn test_mock_records_batches_and_timeouts() {
        let mut session = MockSession::new();
        session
            .apply_timeouts(&TimeoutConfig::default())
            .await
            .unwrap();
        session.execute_batch("CREATE TABLE t (id int);").await.unwrap();

        assert_eq!(session.timeouts_applied, 1);
        assert_eq!(session.batches.len(), 1);
    }
}
