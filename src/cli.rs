//! Command-line argument parsing for sqllab.
//!
//! Connection parameters carry environment fallbacks (`DB_HOST` and
//! friends) so containerized deployments can configure the tool without
//! flags; the resolved values become an explicit `ConnectionConfig`.

use crate::config::ConnectionConfig;
use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;

/// Teaching utilities for running annotated SQL files against PostgreSQL.
#[derive(Parser, Debug)]
#[command(name = "sqllab")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = 5432)]
    pub db_port: u16,

    /// Database name
    #[arg(long, env = "DB_NAME", default_value = "mydb")]
    pub db_name: String,

    /// Database user
    #[arg(long, env = "DB_USER", default_value = "postgres")]
    pub db_user: String,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", default_value = "postgres")]
    pub db_password: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Apply the schema, seed the database, and run the demo queries
    Migrate {
        /// Directory containing schema.sql, seed.sql, and queries.sql
        #[arg(long, value_name = "DIR", default_value = "sql")]
        sql_dir: PathBuf,
    },

    /// Start the HTTP API server
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: IpAddr,

        /// Port to bind
        #[arg(long, env = "PORT", default_value_t = 8000)]
        port: u16,

        /// Path to the annotated queries file
        #[arg(long, value_name = "PATH", default_value = "sql/queries.sql")]
        queries_file: PathBuf,
    },
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Builds the database connection configuration from the parsed
    /// arguments (which already folded in the environment fallbacks).
    pub fn connection_config(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            database: self.db_name.clone(),
            user: self.db_user.clone(),
            password: self.db_password.clone(),
        }
    }
}
