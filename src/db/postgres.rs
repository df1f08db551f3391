//! PostgreSQL session implementation.
//!
//! Provides the `PostgresSession` struct that implements the
//! `DatabaseSession` trait over a single sqlx connection. One session maps
//! to one connection; nothing is pooled or shared.

use crate::config::{ConnectionConfig, RetryConfig, TimeoutConfig};
use crate::db::{Column, DatabaseSession, QueryResult, Row, Schema, Table, Value};
use crate::error::{LabError, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgRow};
use sqlx::{Column as SqlxColumn, Connection, Executor, Row as SqlxRow, TypeInfo};
use tracing::{debug, warn};

/// PostgreSQL database session over a single connection.
#[derive(Debug)]
pub struct PostgresSession {
    conn: PgConnection,
}

impl PostgresSession {
    /// Opens a session with a single connection attempt.
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let conn = PgConnection::connect_with(&connect_options(config))
            .await
            .map_err(|e| map_connect_error(&e, config))?;

        debug!("Connected to {}", config.display_string());
        Ok(Self { conn })
    }

    /// Opens a session, retrying until the database is ready.
    ///
    /// Makes up to `retry.max_attempts` attempts with a fixed delay between
    /// them and a per-attempt connect timeout. Exhausting the attempts is a
    /// connection error carrying the last engine diagnostic.
    pub async fn connect_with_retry(
        config: &ConnectionConfig,
        retry: &RetryConfig,
    ) -> Result<Self> {
        let options = connect_options(config);
        let mut last_error = None;

        for attempt in 1..=retry.max_attempts {
            debug!(
                "Connection attempt {} of {} to {}",
                attempt,
                retry.max_attempts,
                config.display_string()
            );

            let result = tokio::time::timeout(
                retry.connect_timeout,
                PgConnection::connect_with(&options),
            )
            .await;

            match result {
                Ok(Ok(conn)) => {
                    debug!("Database is ready");
                    return Ok(Self { conn });
                }
                Ok(Err(e)) => {
                    warn!("Attempt {}/{} failed: {}", attempt, retry.max_attempts, e);
                    last_error = Some(e.to_string());
                }
                Err(_) => {
                    warn!(
                        "Attempt {}/{} timed out after {:?}",
                        attempt, retry.max_attempts, retry.connect_timeout
                    );
                    last_error = Some(format!(
                        "connect timed out after {:?}",
                        retry.connect_timeout
                    ));
                }
            }

            if attempt < retry.max_attempts {
                tokio::time::sleep(retry.delay).await;
            }
        }

        Err(LabError::connection(format!(
            "Could not reach {} after {} attempts: {}",
            config.display_string(),
            retry.max_attempts,
            last_error.unwrap_or_else(|| "no attempt was made".to_string())
        )))
    }

    /// Executes a raw (possibly multi-statement) SQL string on the
    /// connection, returning the engine error verbatim on failure.
    async fn run_raw(&mut self, sql: &str) -> std::result::Result<(), sqlx::Error> {
        sqlx::raw_sql(sql).fetch_all(&mut self.conn).await.map(|_| ())
    }

    /// Best-effort column names for a statement that returned no rows.
    async fn describe_columns(&mut self, sql: &str) -> Option<Vec<String>> {
        let described = (&mut self.conn).describe(sql).await.ok()?;
        Some(
            described
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect(),
        )
    }

    /// Fetches base table names from the public schema.
    async fn fetch_table_names(&mut self) -> Result<Vec<String>> {
        sqlx::query_scalar(
            r#"
            SELECT table_name::text
            FROM information_schema.tables
            WHERE table_schema = 'public' AND table_type = 'BASE TABLE'
            ORDER BY table_name
            "#,
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| LabError::query(format!("Failed to fetch tables: {e}")))
    }

    /// Fetches columns for a specific table, in ordinal position order.
    async fn fetch_columns(&mut self, table_name: &str) -> Result<Vec<Column>> {
        let rows: Vec<(String, String, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT
                column_name::text,
                data_type::text,
                is_nullable::text,
                column_default::text
            FROM information_schema.columns
            WHERE table_schema = 'public' AND table_name = $1
            ORDER BY ordinal_position
            "#,
        )
        .bind(table_name)
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| LabError::query(format!("Failed to fetch columns for {table_name}: {e}")))?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, is_nullable, default)| Column {
                name,
                data_type,
                is_nullable: is_nullable == "YES",
                default,
            })
            .collect())
    }
}

#[async_trait]
impl DatabaseSession for PostgresSession {
    async fn apply_timeouts(&mut self, timeouts: &TimeoutConfig) -> Result<()> {
        let settings = format!(
            "SET statement_timeout = '{}ms';\n\
             SET lock_timeout = '{}ms';\n\
             SET idle_in_transaction_session_timeout = '{}ms';",
            timeouts.statement.as_millis(),
            timeouts.lock.as_millis(),
            timeouts.idle_in_transaction.as_millis(),
        );

        self.run_raw(&settings)
            .await
            .map_err(|e| LabError::query(format!("Failed to apply session timeouts: {e}")))?;

        Ok(())
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<()> {
        let mut tx = self
            .conn
            .begin()
            .await
            .map_err(|e| LabError::query(format!("Failed to begin transaction: {e}")))?;

        match sqlx::raw_sql(sql).execute(&mut *tx).await {
            Ok(_) => tx
                .commit()
                .await
                .map_err(|e| LabError::query(format!("Failed to commit: {e}"))),
            Err(e) => {
                let reason = format_query_error(e);
                if let Err(rollback_err) = tx.rollback().await {
                    warn!("Rollback after failed batch also failed: {rollback_err}");
                }
                Err(LabError::query(reason))
            }
        }
    }

    async fn run_query(&mut self, sql: &str) -> Result<QueryResult> {
        let fetched = sqlx::query(sql)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| LabError::query(format_query_error(e)))?;

        // Column metadata comes from the first row when there is one.
        // For an empty result set, fall back to describing the statement,
        // which still yields the projection for SELECTs.
        let columns: Vec<String> = if let Some(first_row) = fetched.first() {
            first_row
                .columns()
                .iter()
                .map(|col| col.name().to_string())
                .collect()
        } else {
            self.describe_columns(sql).await.unwrap_or_default()
        };

        let rows: Vec<Row> = fetched.iter().map(convert_row).collect();

        Ok(QueryResult { columns, rows })
    }

    async fn introspect_schema(&mut self) -> Result<Schema> {
        let table_names = self.fetch_table_names().await?;

        let mut tables = Vec::with_capacity(table_names.len());
        for name in table_names {
            let columns = self.fetch_columns(&name).await?;
            tables.push(Table { name, columns });
        }

        Ok(Schema { tables })
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn
            .close()
            .await
            .map_err(|e| LabError::connection(format!("Failed to close session: {e}")))
    }
}

fn connect_options(config: &ConnectionConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password)
}

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow) -> Row {
    row.columns()
        .iter()
        .enumerate()
        .map(|(i, col)| convert_value(row, i, col.type_info().name()))
        .collect()
}

/// Converts a single column value from a PgRow to our Value type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> Value {
    match type_name.to_uppercase().as_str() {
        "BOOL" | "BOOLEAN" => decode::<bool>(row, index).map(Value::Bool),
        "INT2" | "SMALLINT" => decode::<i16>(row, index).map(|v| Value::Int(v.into())),
        "INT4" | "INT" | "INTEGER" => decode::<i32>(row, index).map(|v| Value::Int(v.into())),
        "INT8" | "BIGINT" => decode::<i64>(row, index).map(Value::Int),
        "FLOAT4" | "REAL" => decode::<f32>(row, index).map(|v| Value::Float(v.into())),
        "FLOAT8" | "DOUBLE PRECISION" => decode::<f64>(row, index).map(Value::Float),
        "BYTEA" => decode::<Vec<u8>>(row, index).map(Value::Bytes),
        // All other types are read back as text.
        _ => decode::<String>(row, index).map(Value::String),
    }
    .unwrap_or(Value::Null)
}

fn decode<'r, T>(row: &'r PgRow, index: usize) -> Option<T>
where
    Option<T>: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get::<Option<T>, _>(index).ok().flatten()
}

/// Maps a failed connection attempt to a connection error.
fn map_connect_error(error: &sqlx::Error, config: &ConnectionConfig) -> LabError {
    LabError::connection(format!(
        "Failed to connect to {}: {}",
        config.display_string(),
        error
    ))
}

/// Formats an engine error, keeping the diagnostic message verbatim and
/// appending DETAIL and HINT lines when the engine provides them.
fn format_query_error(error: sqlx::Error) -> String {
    let Some(db_error) = error.as_database_error() else {
        return error.to_string();
    };

    let mut result = db_error.message().to_string();

    if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>() {
        if let Some(detail) = pg_error.detail() {
            result.push_str("\n  DETAIL: ");
            result.push_str(detail);
        }
        if let Some(hint) = pg_error.hint() {
            result.push_str("\n  HINT: ");
            result.push_str(hint);
        }
    }

    result
}
