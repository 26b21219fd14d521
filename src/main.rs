use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recruit_hub::api::{self, AppState};
use recruit_hub::config::{Config, StoreBackend};
use recruit_hub::db::init_database;
use recruit_hub::notify::{AdminNotifier, DisabledNotifier, HttpVideoNotifier};
use recruit_hub::storage::HttpObjectStorage;
use recruit_hub::store::{DocumentStore, MemoryStore, PgDocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "info,recruit_hub=debug".into()),
    );
    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    let store: Arc<dyn DocumentStore> = match config.database.backend {
        StoreBackend::Postgres => {
            let db = Arc::new(init_database().await?);
            info!("Connected to database");
            Arc::new(PgDocumentStore::new(db))
        }
        StoreBackend::Memory => {
            warn!("Using the in-memory document store; data is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let storage = Arc::new(HttpObjectStorage::new(config.storage.base_url.clone())?);
    let notifier: Arc<dyn AdminNotifier> = match &config.notifications.video_webhook_url {
        Some(url) => Arc::new(HttpVideoNotifier::new(url.clone())?),
        None => {
            info!("No video webhook configured, notifications disabled");
            Arc::new(DisabledNotifier)
        }
    };

    let state = AppState::new(store, storage, notifier, config);

    // Stop serving on ctrl-c
    let shutdown = async {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received, initiating graceful shutdown"),
            Err(e) => {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await
            }
        }
    };

    if let Err(e) = api::start_api_server(state, shutdown).await {
        error!("API server error: {}", e);
        return Err(e);
    }

    info!("Recruit hub shutdown complete");
    Ok(())
}
