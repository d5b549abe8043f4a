use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use docbridge::cli::{execute, Command};
use docbridge::storage::{InMemoryBackend, MongoBackend};
use docbridge::{Config, Connector};
use docbridge_core::store::{store_error_to_exit_code, StoreError};

/// docbridge - validated CRUD calls against a MongoDB database
#[derive(Parser, Debug)]
#[command(name = "docbridge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// MongoDB connection string (overrides MONGODB_URI)
    #[arg(long, short = 'u')]
    uri: Option<String>,

    /// Database name (overrides MONGODB_DATABASE)
    #[arg(long, short = 'd')]
    database: Option<String>,

    /// Run against an empty in-memory store instead of MongoDB
    #[arg(long)]
    in_memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays pure JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docbridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "Command failed");
            let code = err
                .downcast_ref::<StoreError>()
                .map(store_error_to_exit_code)
                .unwrap_or(2);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = Config::from_env().with_overrides(cli.uri, cli.database);

    let output = if cli.in_memory {
        tracing::debug!("Using in-memory backend");
        let connector =
            Connector::new(InMemoryBackend::new()).with_write_timeout(config.write_timeout());
        execute(&connector, cli.command).await?
    } else {
        let backend = MongoBackend::new(&config.mongodb_uri, &config.database)?
            .with_app_name(&config.app_name)
            .with_connect_timeout(config.connect_timeout());
        let connector = Connector::new(backend).with_write_timeout(config.write_timeout());

        connector.connect().await?;
        let result = execute(&connector, cli.command).await;
        connector.close_connection().await;
        result?
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
