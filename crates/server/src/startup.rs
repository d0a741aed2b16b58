use std::net::SocketAddr;

use axum::Router;
use configs::{AppConfig, MissingFile};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use service::auth::service::AuthSettings;
use service::runtime::{self, RuntimeOptions};
use service::storage::MissingFilePolicy;

use crate::errors::StartupError;
use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub fn runtime_options(cfg: &AppConfig) -> RuntimeOptions {
    RuntimeOptions {
        data_dir: cfg.storage.data_path(),
        missing_file: match cfg.storage.missing_file {
            MissingFile::Empty => MissingFilePolicy::Empty,
            MissingFile::Error => MissingFilePolicy::NotFound,
        },
        unique_email: cfg.storage.unique_email,
        seed_empty_files: cfg.storage.seed_empty_files,
        auth: AuthSettings {
            jwt_secret: cfg.auth.jwt_secret.clone(),
            token_ttl_secs: cfg.auth.jwt_expiration_secs,
            min_password_len: cfg.auth.min_password_len,
        },
    }
}

/// Open the data directory and wire the services into handler state.
pub async fn build_state(cfg: &AppConfig) -> Result<ServerState, StartupError> {
    if cfg.auth.uses_dev_secret() {
        warn!("JWT_SECRET not set; using the development secret");
    }
    common::env::ensure_data_dir(&cfg.storage.data_path()).await?;
    let services = runtime::open_services(&runtime_options(cfg)).await?;
    Ok(ServerState { auth: services.auth, books: services.books, categories: services.categories })
}

pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors()))
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address: {e}")))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;
    let addr = bind_addr(&cfg)?;
    info!(%addr, data_dir = %cfg.storage.data_dir, "starting bookshelf server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
