// crates/server/src/main.rs
//! Parcelwise server binary.
//!
//! Opens the user database, wires the classifier factory from the
//! environment, starts the demo scheduler and serves the API until Ctrl-C or
//! SIGTERM.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parcelwise_core::{CategoryCatalog, ClassifierFactory, LlmConfig};
use parcelwise_db::Database;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use parcelwise_server::{create_app_full, init_metrics, AppState, JobRunner, Scheduler, ServerArgs};

#[tokio::main]
async fn main() -> Result<()> {
    let args = ServerArgs::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .compact()
        .init();

    init_metrics();

    // Step 1: Open database
    let db = Database::connect(&args.database_url)
        .await
        .with_context(|| format!("opening database {}", args.database_url))?;

    // Step 2: Status catalog
    let catalog = match &args.catalog_path {
        Some(path) => CategoryCatalog::load(path)
            .await
            .with_context(|| format!("loading catalog {}", path.display()))?,
        None => CategoryCatalog::shipment_default(),
    };
    tracing::info!(status_types = catalog.len(), "Catalog ready");

    // Step 3: LLM providers
    let llm_config = LlmConfig::from_env();
    tracing::debug!(config = ?llm_config, "LLM configuration");
    let classifiers = ClassifierFactory::from_config(llm_config)?;

    let jobs = Arc::new(JobRunner::new());
    let state = AppState::new(db, catalog, classifiers, Arc::clone(&jobs));

    // Step 4: Scheduler, stopped through the same signal as the server
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let scheduler = if args.no_scheduler {
        None
    } else {
        let scheduler = Scheduler::new(Arc::clone(&jobs), args.job_result_ttl());
        Some(tokio::spawn(scheduler.run(wait_for(shutdown_rx.clone()))))
    };

    // Step 5: Serve
    let app = create_app_full(state, args.static_dir.clone());
    let addr = args.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(addr = %addr, version = env!("CARGO_PKG_VERSION"), "Parcelwise listening");

    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for(shutdown_rx))
        .await?;

    if let Some(handle) = scheduler {
        if let Err(e) = handle.await {
            tracing::warn!("Scheduler task ended abnormally: {e}");
        }
    }
    let cancelled = jobs.cancel_all();
    tracing::info!(cancelled, "Server stopped");
    Ok(())
}

/// Resolves once the watch value flips to `true` or the sender is gone.
async fn wait_for(mut rx: watch::Receiver<bool>) {
    let _ = rx.wait_for(|stop| *stop).await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
