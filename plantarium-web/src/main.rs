//! plantarium-web - personal plant catalogue service
//!
//! Proxies species search against two third-party plant databases,
//! persists a personal catalogue in SQLite, and serves uploaded
//! photos from a local object store.

use anyhow::Result;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use plantarium_web::config::Config;
use plantarium_web::{build_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting plantarium-web (plant catalogue)");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    info!("Data directory: {}", config.root_folder.display());

    let db_path = config.database_path();
    let db = plantarium_web::db::init_database_pool(&db_path).await?;
    info!("Database connection established");

    let bind_addr = config.bind_addr;
    let state = AppState::new(config, db)?;

    // Drop rate-limit windows left over from a previous run
    state.limiter.purge_expired().await?;

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    info!("Listening on http://{}", bind_addr);
    info!("Health check: http://{}/health", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
