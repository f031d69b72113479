//! langguard-web - Media Translation Service
//!
//! Accepts audio, video, documents and images over HTTP, turns them into
//! text, translates the text and reads it back as speech.

use anyhow::{Context, Result};
use clap::Parser;
use langguard_common::config::{RootFolderInitializer, RootFolderResolver};
use langguard_common::events::EventBus;
use std::path::PathBuf;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use langguard_web::config::{AppConfig, CliOverrides, MODULE_NAME};
use langguard_web::services::retention::spawn_retention_sweeper;
use langguard_web::workflow::{Pipeline, PipelineConfig};
use langguard_web::AppState;

/// Command-line arguments for langguard-web
#[derive(Parser, Debug)]
#[command(name = "langguard-web")]
#[command(about = "Media translation web service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "LANGGUARD_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder holding the database and uploads
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Address to listen on (host:port)
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let cli = CliOverrides {
        config_path: args.config,
        root_folder: args.root_folder,
        bind_address: args.bind,
    };

    let (config, env_overrides) =
        AppConfig::resolve(&cli).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting langguard-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE"),
    );
    for key in &env_overrides {
        info!("Configuration override from environment: {}", key);
    }

    // Root folder: CLI → environment → TOML → compiled default
    let root_folder = RootFolderResolver::new(MODULE_NAME)
        .with_cli_override(cli.root_folder.clone())
        .with_toml_root_folder(config.root_folder.clone())
        .resolve();
    let initializer = RootFolderInitializer::new(root_folder);
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;

    let db_path = initializer.database_path();
    info!("Database: {}", db_path.display());
    let db_pool = langguard_web::db::init_database_pool(&db_path).await?;

    let event_bus = EventBus::new(100);

    let capabilities = langguard_web::clients::build_capabilities(&config)
        .await
        .context("Failed to initialize service clients")?;

    let upload_dir = initializer.uploads_path();
    let pipeline = Pipeline::new(
        &capabilities,
        PipelineConfig::from_app_config(&config, upload_dir.clone()),
        db_pool.clone(),
        event_bus.clone(),
    )
    .context("Failed to build pipeline")?;

    let shutdown = CancellationToken::new();

    let sweeper = spawn_retention_sweeper(
        db_pool.clone(),
        upload_dir,
        config.retention.ttl(),
        Duration::from_secs(config.retention.sweep_interval_secs),
        shutdown.clone(),
    );

    let bind_address = config.bind_address.clone();
    let state = AppState::new(db_pool, event_bus, pipeline, config, shutdown.clone());
    let app = langguard_web::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_address))?;
    info!("Listening on http://{}", bind_address);
    info!("Health check: http://{}/health", bind_address);

    let signal_token = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            signal_token.cancel();
        })
        .await
        .context("Server error")?;

    shutdown.cancel();
    if let Some(handle) = sweeper {
        if let Err(e) = handle.await {
            error!("Retention sweeper task failed: {}", e);
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
