//! Rolegate API composition root.

#![forbid(unsafe_code)]

mod api_config;
mod api_router;
mod api_services;
mod auth;
mod dto;
mod error;
mod handlers;
mod middleware;
mod seed;
mod state;

#[cfg(test)]
mod test_support;

use rolegate_core::AppError;
use tracing::info;

use crate::api_config::{ApiCommand, ApiConfig, StoreBackendConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ApiConfig::load()?;
    let store = api_services::build_store(&config).await?;

    if config.command == ApiCommand::Migrate {
        return Ok(());
    }

    let app_state = api_services::build_app_state(store, &config);

    let seed_on_start = config.store_backend == StoreBackendConfig::Memory;
    if config.command == ApiCommand::Seed || seed_on_start {
        seed::run(&app_state, config.seed_superuser_email.as_deref()).await?;
        info!(store = app_state.store_backend, "baseline data seeded");
    }

    if config.command == ApiCommand::Seed {
        return Ok(());
    }

    let app = api_router::build_router(app_state, config.cors_allowed_origin.as_deref())?;

    let address = config.socket_address()?;
    let listener = tokio::net::TcpListener::bind(address)
        .await
        .map_err(|error| AppError::Internal(format!("failed to bind listener: {error}")))?;

    info!(%address, store = config.store_backend_name(), "rolegate api listening");

    axum::serve(listener, app)
        .await
        .map_err(|error| AppError::Internal(format!("server error: {error}")))
}
