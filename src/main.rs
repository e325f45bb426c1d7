use std::process::ExitCode;
use std::sync::Arc;

use homework_status_bot::api_client::PracticumClient;
use homework_status_bot::banner;
use homework_status_bot::config::{BotConfig, StorageConfig};
use homework_status_bot::errors::Result;
use homework_status_bot::notifier::TelegramNotifier;
use homework_status_bot::poller::PollingLoop;
use homework_status_bot::store::{MemoryStore, SqliteStore, StateStore};

#[tokio::main]
async fn main() -> ExitCode {
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  Warning: Could not load .env file: {}", e);
        eprintln!("   Make sure the bot tokens are set in your environment");
    }

    env_logger::Builder::from_env(
        env_logger::Env::new().default_filter_or("info,homework_status_bot=debug"),
    )
    .target(env_logger::Target::Stdout)
    .init();

    let config = match BotConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("CRITICAL: cannot start the bot: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("CRITICAL: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: BotConfig) -> Result<()> {
    let store: Arc<dyn StateStore> = match &config.storage {
        StorageConfig::Sqlite { path } => Arc::new(SqliteStore::open(path).await?),
        StorageConfig::Memory => {
            log::info!("Using in-memory state; nothing survives a restart");
            Arc::new(MemoryStore::new())
        }
    };

    let source = PracticumClient::new(config.api.clone())?;
    let notifier = TelegramNotifier::new(config.telegram.clone())?;
    let poller = PollingLoop::new(source, notifier, store, config.poller.clone());

    poller
        .run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    Ok(())
}
