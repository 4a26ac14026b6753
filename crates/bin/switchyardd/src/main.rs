//! # switchyardd — switchyard daemon
//!
//! Composition root that wires the kernel and adapters together and starts
//! the server.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Build the location context and the [`Hub`]
//! - Install the enabled integrations
//! - Build the axum router and serve it until Ctrl-C / SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use switchyard_adapter_http_axum::state::AppState;
use switchyard_adapter_virtual::VirtualIntegration;
use switchyard_app::hub::Hub;
use switchyard_app::location::LocationContext;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_new(&config.logging.filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting switchyardd");

    // Kernel
    let location = Arc::new(LocationContext::new(
        config.utc_offset()?,
        config.location.initial_mode.clone(),
    ));
    let hub = Arc::new(Hub::new(config.dispatcher_config(), location));

    // Integrations
    if config.integrations.virtual_enabled {
        let integration = VirtualIntegration;
        integration
            .install(&hub)
            .with_context(|| format!("installing {} integration", integration.name()))?;
    }

    // HTTP
    let app = switchyard_adapter_http_axum::router::build(AppState::new(hub));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "switchyardd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("switchyardd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        () = terminate => tracing::info!("received terminate signal, shutting down"),
    }
}
