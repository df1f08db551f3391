//! Configuration for sqllab.
//!
//! All configuration is resolved once at startup (CLI arguments with
//! environment fallbacks) and passed into the components that need it.
//! Nothing below the CLI layer reads the environment directly.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Database connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// Database host.
    pub host: String,

    /// Database port.
    pub port: u16,

    /// Database name.
    pub database: String,

    /// Database user.
    pub user: String,

    /// Database password.
    pub password: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "mydb".to_string(),
            user: "postgres".to_string(),
            password: "postgres".to_string(),
        }
    }
}

impl ConnectionConfig {
    /// Returns a display-safe string (no password) for logs and errors.
    pub fn display_string(&self) -> String {
        format!("{} @ {}:{}", self.database, self.host, self.port)
    }
}

/// Per-session timeout policy, applied before any statement runs.
///
/// Maps to the `statement_timeout`, `lock_timeout`, and
/// `idle_in_transaction_session_timeout` session settings.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutConfig {
    /// Maximum run time for a single statement.
    pub statement: Duration,

    /// Maximum wait for a lock acquisition.
    pub lock: Duration,

    /// Maximum time a transaction may sit idle.
    pub idle_in_transaction: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            statement: Duration::from_secs(5),
            lock: Duration::from_secs(2),
            idle_in_transaction: Duration::from_secs(10),
        }
    }
}

/// Connection retry policy for the wait-for-database loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryConfig {
    /// Maximum number of connection attempts before giving up.
    pub max_attempts: u32,

    /// Fixed delay between attempts.
    pub delay: Duration,

    /// Per-attempt connect timeout.
    pub connect_timeout: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 30,
            delay: Duration::from_secs(2),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,

    /// Port to bind.
    pub port: u16,

    /// Path to the annotated queries file served and executed by the API.
    pub queries_path: PathBuf,
}
