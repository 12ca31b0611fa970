// region:    --- Imports
use auction_market::config::{AppConfig, StoreConfig};
use auction_market::database::DatabaseManager;
use auction_market::handlers;
use auction_market::store::{InMemoryMarketStore, MarketStore, PgMarketStore};
use axum::extract::DefaultBodyLimit;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};
// endregion: --- Imports

// region:    --- Main
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .without_time()
        .with_target(false)
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        error!("{:<12} --> invalid configuration: {}", "Main", e);
        e
    })?;

    match config.store {
        StoreConfig::Postgres {
            database_url,
            max_connections,
            reset_database,
        } => {
            let db_manager = match DatabaseManager::new(&database_url, max_connections).await {
                Ok(db_manager) => Arc::new(db_manager),
                Err(e) => {
                    error!("{:<12} --> database connection failed: {:?}", "Main", e);
                    return Err(e.into());
                }
            };
            if let Err(e) = db_manager.initialize_database(reset_database).await {
                error!("{:<12} --> database initialization failed: {:?}", "Main", e);
                return Err(e.into());
            }
            info!("{:<12} --> database initialized", "Main");
            serve(config.bind_addr, Arc::new(PgMarketStore::new(db_manager))).await
        }
        StoreConfig::Memory => {
            info!("{:<12} --> using in-memory store", "Main");
            serve(config.bind_addr, Arc::new(InMemoryMarketStore::new())).await
        }
    }
}

async fn serve<S: MarketStore + 'static>(
    bind_addr: SocketAddr,
    store: Arc<S>,
) -> Result<(), Box<dyn std::error::Error>> {
    // test page is served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let routes_all = handlers::routes(store)
        .layer(cors)
        .layer(DefaultBodyLimit::max(1024 * 1024 * 2));

    let listener = TcpListener::bind(bind_addr).await.map_err(|e| {
        error!("{:<12} --> cannot bind {}: {}", "Main", bind_addr, e);
        e
    })?;
    info!("{:<12} --> Web Server: Listening on {}", "Main", bind_addr);

    if let Err(err) = axum::serve(listener, routes_all.into_make_service()).await {
        error!("{:<12} --> Server error: {}", "Main", err);
        return Err(err.into());
    }
    Ok(())
}
// endregion: --- Main
