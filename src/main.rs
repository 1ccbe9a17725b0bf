//! Clubhub - A college clubs hub backend

use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use clubhub::{
    api::{self, AppState},
    config::Config,
    persist::JsonStore,
    services::{AuthService, LoginRateLimiter},
    storage::create_storage,
    store::ClubStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "clubhub=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting clubhub backend...");

    // Load configuration
    let config = Config::load_with_env(Path::new("clubhub.yml"))?;
    tracing::info!("Configuration loaded");

    // Optional JSON state mirror
    let persist = match &config.data_dir {
        Some(dir) => {
            let store = JsonStore::open(dir)?;
            tracing::info!("State mirror at {}", dir.display());
            Some(Arc::new(store))
        }
        None => {
            tracing::info!("No data directory configured; state is in-memory only");
            None
        }
    };

    // Club store, seeded when nothing was mirrored
    let club_store = Arc::new(match &persist {
        Some(persist) => ClubStore::with_persistence(persist.clone()),
        None => ClubStore::new(),
    });
    club_store.seed_samples().await;
    tracing::info!("Club store ready ({} clubs)", club_store.count().await);

    // Authentication
    let rate_limiter = Arc::new(LoginRateLimiter::new());
    if config.auth.bootstrap.is_some() {
        tracing::warn!("Administrative bootstrap credentials are configured");
    }
    let auth_service = Arc::new(AuthService::new(
        config.auth.clone(),
        club_store.clone(),
        rate_limiter.clone(),
        persist,
    ));
    auth_service.seed_demo_accounts().await;

    // Media storage backend
    let storage = create_storage(&config)?;
    tracing::info!("Storage backend: {:?}", config.storage.backend);

    let state = AppState {
        club_store,
        auth_service,
        storage,
        upload_config: Arc::new(config.upload.clone()),
    };

    // Rate limiter cleanup task (runs every 5 minutes)
    {
        let limiter = rate_limiter.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tokio::time::Duration::from_secs(300));
            loop {
                interval.tick().await;
                limiter.cleanup().await;
            }
        });
    }

    // Build router and serve
    let app = api::build_router(state, &config.server.cors_origin);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
