//! Tollgate Server: application entry point.
//!
//! Loads the signing keys (fatal on failure), connects to the user store
//! and builds the authentication service.

mod config;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tollgate_auth::{AuthService, SigningKeys};
use tollgate_db::DbManager;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tollgate=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .init();

    let config = ServerConfig::parse();

    // Without valid keys nothing may be served.
    let keys = SigningKeys::from_base64_pem(&config.private_key, &config.public_key)
        .context("loading signing keys")?;

    let db = DbManager::connect(&config.db_config())
        .await
        .context("connecting to user store")?;
    db.migrate().await.context("migrating user store")?;

    let auth_config = config.auth_config();
    info!(
        access_ttl_secs = auth_config.access_token_lifetime_secs,
        refresh_ttl_secs = auth_config.refresh_token_lifetime_secs,
        reject_inactive = auth_config.reject_inactive,
        "Starting Tollgate"
    );
    let _service = AuthService::new(db.users(), Arc::new(keys), auth_config)
        .context("building authentication service")?;

    // TODO: mount AuthService behind the RPC transport once its stubs land.
    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;

    info!("Tollgate stopped");
    Ok(())
}
