use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;

mod config;
mod error;
mod export;
mod extract;
mod logging;
mod models;
mod repositories;
mod routes;
mod services;
mod state;
mod validation;

use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};

use crate::{
    config::{Settings, StoreKind},
    repositories::{MemoryStore, Repositories},
    state::AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load()?;

    let _log_guard = logging::init(&settings.log)?;

    info!("Starting {}", settings.app.title);

    let repositories = match settings.store {
        StoreKind::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = init_pool(&db_config).await?;

            if health_check(&pool).await? {
                info!("Database connection successful");
            } else {
                anyhow::bail!("Failed to connect to database");
            }

            run_migrations(&pool).await?;
            Repositories::postgres(pool)
        }
        StoreKind::Memory => {
            info!("Using in-memory store, data is lost on shutdown");
            Repositories::memory(MemoryStore::new())
        }
    };

    let app_state = AppState::new(&settings, repositories)?;
    info!(
        "Booking rules: working hours {}, daily limit {}",
        app_state.booking.rules().working_hours,
        app_state.booking.rules().daily_limit
    );

    let app = routes::create_router(app_state);

    let listener = TcpListener::bind(&settings.app.bind_address).await?;
    info!("Scheduler listening on {}", settings.app.bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Scheduler stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}
