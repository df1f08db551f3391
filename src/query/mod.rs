//! Query execution.
//!
//! Runs SQL against a database session under the configured timeout
//! policy and folds the result into an outcome the renderers consume.

mod executor;

pub use executor::{ExecutionOutcome, QueryRunner};
