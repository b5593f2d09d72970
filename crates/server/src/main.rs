use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use squeezer_core::{load_config, LmsClient, MediaServer, MediaSkill};
use squeezer_server::{api::create_router, state::AppState};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine config path
    let config_path = std::env::var("SQUEEZER_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    info!(
        "Media server: {}:{} (default player {:?})",
        config.server.host, config.server.port, config.player.default_player_name
    );
    info!("Cache directory: {:?}", config.cache.dir);

    let server: Arc<dyn MediaServer> =
        Arc::new(LmsClient::new(&config.server).context("Failed to create media server client")?);

    // Validates config, refreshes the cache and loads every source
    let skill = MediaSkill::initialize(&config, server)
        .await
        .context("Failed to initialize media skill")?;
    if let Some(summary) = skill.last_load().await {
        info!(
            "Index ready: {:?} ({} entries skipped)",
            summary.counts,
            summary.failures.len()
        );
    }

    // Create app state
    let state = Arc::new(AppState::new(config.clone(), Arc::new(skill)));

    // Create router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.http.host, config.http.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
