//! Error taxonomy.
//!
//! Every failure path funnels into `LabError`: unreachable database,
//! missing SQL files, engine-rejected statements, unknown query ids,
//! and bad configuration. Nothing is swallowed; the caller decides
//! whether a failure aborts the whole run or only one step.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    /// The database could not be reached (or retries were exhausted),
    /// or the connection died mid-session.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An expected SQL file is missing or unreadable. Fatal for the
    /// schema file, skippable for seed and queries.
    #[error("File error: {0}")]
    File(String),

    /// The engine rejected or aborted a statement. Carries the engine
    /// diagnostic verbatim.
    #[error("Query error: {0}")]
    Query(String),

    /// No query with this id exists in the parsed file.
    #[error("Query '{0}' not found")]
    QueryNotFound(String),

    /// Invalid configuration, such as an unbindable listen address.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A state that should be unreachable.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl LabError {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    pub fn file(msg: impl Into<String>) -> Self {
        Self::File(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        Self::Query(msg.into())
    }

    pub fn query_not_found(id: impl Into<String>) -> Self {
        Self::QueryNotFound(id.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, LabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_keeps_engine_diagnostic_verbatim() {
        let diagnostic = "syntax error at or near \"SELEC\"";
        let err = LabError::query(diagnostic);
        assert_eq!(err.to_string(), format!("Query error: {diagnostic}"));
    }

    #[test]
    fn query_not_found_names_the_id() {
        let err = LabError::query_not_found("7");
        assert_eq!(err.to_string(), "Query '7' not found");
    }

    #[test]
    fn helpers_build_matching_variants() {
        assert!(matches!(
            LabError::connection("refused"),
            LabError::Connection(_)
        ));
        assert!(matches!(LabError::file("gone"), LabError::File(_)));
        assert!(matches!(LabError::config("bad"), LabError::Config(_)));
        assert!(matches!(LabError::internal("bug"), LabError::Internal(_)));
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<LabError>();
    }
}
