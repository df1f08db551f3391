//! Database session layer for sqllab.
//!
//! Provides a trait-based interface for database sessions, allowing the
//! executor and the HTTP handlers to be tested against an in-memory mock.
//! Sessions are deliberately un-pooled: each operation or request acquires
//! a fresh session and releases it when done.

mod mock;
mod postgres;
mod schema;
mod types;

pub use mock::MockSession;
pub use postgres::PostgresSession;
pub use schema::{Column, Schema, Table};
pub use types::{QueryResult, Row, Value};

use crate::config::{ConnectionConfig, RetryConfig, TimeoutConfig};
use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the interface for a single database session.
///
/// All operations are async and return Results with LabError.
#[async_trait]
pub trait DatabaseSession: Send {
    /// Applies the per-session timeout policy. Must run before statements.
    async fn apply_timeouts(&mut self, timeouts: &TimeoutConfig) -> Result<()>;

    /// Executes a multi-statement SQL batch inside a transaction.
    /// Commits on success; rolls back and reports the engine error otherwise.
    async fn execute_batch(&mut self, sql: &str) -> Result<()>;

    /// Executes a single statement and fetches its full result set.
    async fn run_query(&mut self, sql: &str) -> Result<QueryResult>;

    /// Introspects the database schema via the metadata catalog.
    async fn introspect_schema(&mut self) -> Result<Schema>;

    /// Closes the session.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Opens a fresh database session for the given configuration.
///
/// This is the factory used by the HTTP handlers; it makes a single
/// connection attempt.
pub async fn connect(config: &ConnectionConfig) -> Result<Box<dyn DatabaseSession>> {
    let session = PostgresSession::connect(config).await?;
    Ok(Box::new(session))
}

/// Opens a database session, waiting for the database to become ready.
///
/// Retries up to `retry.max_attempts` times with a fixed delay between
/// attempts. Used by the console path, where the database container may
/// still be starting.
pub async fn connect_with_retry(
    config: &ConnectionConfig,
    retry: &RetryConfig,
) -> Result<Box<dyn DatabaseSession>> {
    let session = PostgresSession::connect_with_retry(config, retry).await?;
    Ok(Box::new(session))
}
