//! One-shot migration, seed, and demo-query console runner.
//!
//! Applies `schema.sql` and `seed.sql` as transactional batches, then
//! runs each query in `queries.sql` sequentially, printing its result
//! table to stdout. A failed step is reported and the run continues;
//! overall success feeds the process exit code.

use crate::config::{ConnectionConfig, RetryConfig, TimeoutConfig};
use crate::db::{self, DatabaseSession};
use crate::error::{LabError, Result};
use crate::query::{ExecutionOutcome, QueryRunner};
use crate::render;
use crate::store;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};

const SCHEMA_FILE: &str = "schema.sql";
const SEED_FILE: &str = "seed.sql";
const QUERIES_FILE: &str = "queries.sql";

/// Fixed pause between demonstration queries. A deliberate throttle so
/// the console output is readable as it scrolls, not a correctness need.
const QUERY_PAUSE: Duration = Duration::from_millis(500);

/// Runs the full migration flow against the configured database.
///
/// Returns overall success: `Ok(false)` means the run finished but at
/// least one step failed. A missing schema file or an unreachable
/// database is an error, not a partial run.
pub async fn run(
    connection: &ConnectionConfig,
    retry: &RetryConfig,
    timeouts: &TimeoutConfig,
    sql_dir: &Path,
) -> Result<bool> {
    let schema_path = sql_dir.join(SCHEMA_FILE);
    if !schema_path.exists() {
        return Err(LabError::file(format!(
            "{} not found",
            schema_path.display()
        )));
    }

    info!("Waiting for database: {}", connection.display_string());
    let mut session = db::connect_with_retry(connection, retry).await?;
    info!("Connected to {}", connection.display_string());

    let success = run_steps(session.as_mut(), timeouts, sql_dir, QUERY_PAUSE).await?;

    session.close().await?;

    if success {
        info!("Migration completed successfully");
    } else {
        error!("Migration completed with errors");
    }

    Ok(success)
}

/// Runs schema, seed, and demo queries against an open session.
async fn run_steps(
    session: &mut dyn DatabaseSession,
    timeouts: &TimeoutConfig,
    sql_dir: &Path,
    pause: Duration,
) -> Result<bool> {
    let mut success = true;

    let schema_path = sql_dir.join(SCHEMA_FILE);
    success &= run_sql_file(session, timeouts, &schema_path, "schema").await?;

    let seed_path = sql_dir.join(SEED_FILE);
    if seed_path.exists() {
        success &= run_sql_file(session, timeouts, &seed_path, "seed").await?;
    } else {
        warn!("{} not found, skipping seed", seed_path.display());
    }

    let queries_path = sql_dir.join(QUERIES_FILE);
    if queries_path.exists() {
        success &= run_demo_queries(session, timeouts, &queries_path, pause).await?;
    } else {
        warn!("{} not found, skipping demo queries", queries_path.display());
    }

    Ok(success)
}

/// Executes one SQL file as a transactional batch.
async fn run_sql_file(
    session: &mut dyn DatabaseSession,
    timeouts: &TimeoutConfig,
    path: &Path,
    label: &str,
) -> Result<bool> {
    let sql = read_sql_file(path)?;

    info!("Running {}: {}", label, path.display());
    let outcome = QueryRunner::new(session, timeouts).run_batch(&sql).await;

    match outcome {
        ExecutionOutcome::Success(_) => {
            info!("Applied {} successfully", label);
            Ok(true)
        }
        ExecutionOutcome::Failure(reason) => {
            error!("Failed to apply {}: {}", label, reason);
            Ok(false)
        }
    }
}

/// Parses the queries file and runs each record sequentially, printing
/// each result table. Failures are reported and the batch continues.
async fn run_demo_queries(
    session: &mut dyn DatabaseSession,
    timeouts: &TimeoutConfig,
    path: &Path,
    pause: Duration,
) -> Result<bool> {
    let text = read_sql_file(path)?;
    let records = store::parse(&text);

    if records.is_empty() {
        info!("No annotated queries found in {}", path.display());
        return Ok(true);
    }

    info!("Running {} queries from {}", records.len(), path.display());
    let mut success = true;

    for record in &records {
        if record.body.is_empty() {
            debug!("Skipping query {} with empty body", record.id);
            continue;
        }

        println!("\n{}", record.title);
        println!("{}", "=".repeat(80));

        let outcome = QueryRunner::new(session, timeouts)
            .run_query(&record.body)
            .await;
        success &= outcome.is_success();

        println!("{}", render::render_outcome(&outcome));

        tokio::time::sleep(pause).await;
    }

    Ok(success)
}

fn read_sql_file(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| LabError::file(format!("Failed to read {}: {e}", path.display())))
}
