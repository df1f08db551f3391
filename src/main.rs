//! sqllab - teaching utilities for annotated SQL files.

use sqllab::cli::{Cli, Command};
use sqllab::config::{RetryConfig, ServerConfig, TimeoutConfig};
use sqllab::error::Result;
use sqllab::{migrate, server};
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}

async fn run() -> Result<bool> {
    let cli = Cli::parse_args();
    let connection = cli.connection_config();
    let timeouts = TimeoutConfig::default();

    match &cli.command {
        Command::Migrate { sql_dir } => {
            let retry = RetryConfig::default();
            migrate::run(&connection, &retry, &timeouts, sql_dir).await
        }
        Command::Serve {
            host,
            port,
            queries_file,
        } => {
            let server_config = ServerConfig {
                host: *host,
                port: *port,
                queries_path: queries_file.clone(),
            };
            server::serve(&server_config, connection, timeouts).await?;
            Ok(true)
        }
    }
}
