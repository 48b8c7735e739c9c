//! Keygate - authenticated SSH public key provisioning.
//!
//! This service accepts base64 encoded public keys over HTTP, guarded by
//! basic authentication, and appends them to the host's `authorized_keys`
//! while recording each one in a numbered tracking file.

use std::sync::Arc;

use tokio::net::TcpListener;

mod api;
mod auth;
mod config;
mod error;
mod logging;
mod provision;

use crate::api::build_router;
use crate::auth::AuthGate;
use crate::config::Config;
use crate::provision::{KeyProvisioner, LocalFilesystem};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Persists accepted keys.
    pub provisioner: Arc<KeyProvisioner>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("Note: No .env file loaded ({e})");
    }

    // Logging depends on config, so load failures go to stderr
    let config = Config::load().map_err(|e| {
        eprintln!("Failed to load configuration: {e}");
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    logging::init(&config.logging);

    tracing::info!("Starting Keygate v{}", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        host = %config.server.host,
        port = %config.server.port,
        authorized_keys = %config.keys.authorized_keys_path.display(),
        tracking_dir = %config.keys.tracking_dir.display(),
        tracking_file_prefix = %config.keys.tracking_file_prefix,
        realm = %config.auth.realm,
        log_format = ?config.logging.format,
        "Configuration loaded"
    );

    let gate = AuthGate::from_config(&config.auth);
    let provisioner = Arc::new(KeyProvisioner::new(Arc::new(LocalFilesystem), &config.keys));

    // The key store may be mounted later; requests report it until then.
    if let Err(e) = provisioner.check_environment() {
        tracing::warn!(
            error = %e,
            authorized_keys = %provisioner.authorized_keys_path().display(),
            tracking_dir = %provisioner.tracking_dir().display(),
            "Key store not ready at startup"
        );
    }

    let state = AppState { provisioner };
    let app = build_router(state, gate);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
