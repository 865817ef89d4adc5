use std::sync::Arc;

use items_api::auth::JwtAuthenticator;
use items_api::config::{AppConfig, Environment, StoreBackend};
use items_api::database::{InMemoryItemStore, ItemStore, MongoItemStore};
use items_api::{app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    let default_filter = match environment {
        Environment::Development => "info,items_api=debug,tower_http=debug",
        Environment::Production => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    // .env is a development convenience only
    if environment != Environment::Production {
        if let Err(e) = dotenvy::dotenv() {
            tracing::warn!("Error loading .env file: {}", e);
        }
    }

    let config = AppConfig::from_env()?;
    tracing::info!("Starting items API in {:?} mode", config.environment);

    let mut mongo: Option<Arc<MongoItemStore>> = None;
    let store: Arc<dyn ItemStore> = match config.database.backend {
        StoreBackend::Mongo => {
            let connected = Arc::new(MongoItemStore::connect(&config.database).await?);
            mongo = Some(connected.clone());
            connected
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory item store; data is lost on exit");
            Arc::new(InMemoryItemStore::new())
        }
    };

    let tokens = Arc::new(JwtAuthenticator::from_config(&config.security));
    let state = AppState::new(store, tokens);
    let router = app(state, &config.security);

    let bind_addr = config.server.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Items API listening on http://{}", bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    if let Some(mongo) = mongo {
        mongo.shutdown().await;
    }
    tracing::info!("Server shutdown complete");

    Ok(())
}
