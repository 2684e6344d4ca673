//! sponsor-server - participant sync and sponsor API
//!
//! Keeps the local participant table in step with the registration and
//! resume stores, and serves participant data and resume archives.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use sponsor_common::config::{load_toml_config, ServerConfig};
use sponsor_common::db::init_database;
use sponsor_server::archive::ResumeArchiver;
use sponsor_server::cli::Args;
use sponsor_server::sync::{IntervalTicker, MongoDocumentStore, SyncScheduler, SyncSettings};
use sponsor_server::{build_router, AppState};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug {
        "sponsor_server=debug,sponsor_common=debug,tower_http=debug"
    } else {
        "sponsor_server=info,sponsor_common=info,tower_http=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting sponsor-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let file_layer = load_toml_config(&args.config_path())?;
    let config = ServerConfig::resolve(args.to_layer().layered_over(file_layer))?;

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize participant database")?;

    let settings = SyncSettings::new(
        config.quill_db_uri.clone(),
        config.resumes_db_uri.clone(),
        config.quill_users.clone(),
        config.resumes.clone(),
    );
    let scheduler = SyncScheduler::new(
        Arc::new(MongoDocumentStore::new()),
        pool.clone(),
        settings,
        IntervalTicker::new(config.sync_interval),
    );

    let cancel = CancellationToken::new();
    let sync = match scheduler.start(cancel.clone()) {
        Ok(handle) => handle,
        Err(e) => {
            error!("Participant sync cannot start: {}", e);
            return Err(e.into());
        }
    };
    info!(
        "Participant sync every {}s",
        config.sync_interval.as_secs()
    );

    let archiver = ResumeArchiver::new(config.download_concurrency, config.archive_timeout)
        .context("Failed to build resume download client")?;
    let app = build_router(AppState::new(pool, archiver, sync.status()));

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.listen_addr))?;
    info!("sponsor-server listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel))
        .await
        .context("Server error")?;

    sync.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM and cancel background work
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
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

    cancel.cancel();
}
