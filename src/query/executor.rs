//! Query execution over a database session.
//!
//! The runner applies the session timeout policy before each statement
//! and reports results as a success-or-failure outcome rather than an
//! error to propagate, because a failed statement does not abort a batch
//! of otherwise independent queries.

use crate::config::TimeoutConfig;
use crate::db::{DatabaseSession, QueryResult};
use crate::error::LabError;

/// Outcome of executing one statement block.
///
/// There is no partial-success state: a block either fully produces its
/// result set (or commits), or the whole operation is reported failed
/// with the engine's diagnostic.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The statement ran; its result set may be empty.
    Success(QueryResult),

    /// The engine rejected or aborted the statement. Carries the engine's
    /// diagnostic message.
    Failure(String),
}

impl ExecutionOutcome {
    /// Returns true for the success variant.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

/// Runs statement blocks against a session under a timeout policy.
pub struct QueryRunner<'a> {
    session: &'a mut dyn DatabaseSession,
    timeouts: &'a TimeoutConfig,
}

impl<'a> QueryRunner<'a> {
    /// Creates a runner for the given session and timeout policy.
    pub fn new(session: &'a mut dyn DatabaseSession, timeouts: &'a TimeoutConfig) -> Self {
        Self { session, timeouts }
    }

    /// Executes a read query and fetches its full result set.
    ///
    /// The timeout policy is applied to the session first. Engine errors
    /// become `Failure` with the diagnostic text; nothing is retried.
    pub async fn run_query(&mut self, sql: &str) -> ExecutionOutcome {
        if let Err(e) = self.session.apply_timeouts(self.timeouts).await {
            return ExecutionOutcome::Failure(failure_reason(e));
        }

        match self.session.run_query(sql).await {
            Ok(result) => ExecutionOutcome::Success(result),
            Err(e) => ExecutionOutcome::Failure(failure_reason(e)),
        }
    }

    /// Executes a multi-statement batch transactionally.
    ///
    /// Commits on success and returns an empty result set; any engine
    /// error rolls the transaction back and becomes `Failure`.
    pub async fn run_batch(&mut self, sql: &str) -> ExecutionOutcome {
        if let Err(e) = self.session.apply_timeouts(self.timeouts).await {
            return ExecutionOutcome::Failure(failure_reason(e));
        }

        match self.session.execute_batch(sql).await {
            Ok(()) => ExecutionOutcome::Success(QueryResult::new()),
            Err(e) => ExecutionOutcome::Failure(failure_reason(e)),
        }
    }
}

/// Unwraps a query error to the engine's diagnostic text; other error
/// kinds keep their categorized rendering.
fn failure_reason(error: LabError) -> String {
    match error {
        LabError::Query(message) => message,
        other => other.to_string(),
    }
}
