// Main entry point - Dependency injection, dashboard loop and view server
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use tokio::sync::{mpsc, watch};
use tracing_subscriber::EnvFilter;

use crate::application::clock::SystemClock;
use crate::application::dashboard_service::{self, Dashboard};
use crate::application::panel_controller::PanelTimings;
use crate::application::telemetry_source::{PanelSync, TelemetrySource};
use crate::infrastructure::config::load_dashboard_config;
use crate::infrastructure::http_source::DeviceClient;
use crate::infrastructure::simulated_source::SimulatedSource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;
use crate::presentation::published_view;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_dashboard_config()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Device adapters (infrastructure layer)
    let device = Arc::new(DeviceClient::new(&config.device)?);
    let source: Arc<dyn TelemetrySource> = if config.poll.simulated {
        tracing::info!("Using simulated telemetry");
        Arc::new(SimulatedSource)
    } else {
        tracing::info!("Polling {}", config.device.data_url());
        device.clone()
    };
    let sync: Arc<dyn PanelSync> = device;

    // Dashboard state (application layer)
    let (publisher, registry, view) = published_view::channel();
    let dashboard = Dashboard::new(PanelTimings::from(&config.panels), publisher, registry);
    let (input_tx, input_rx) = mpsc::channel(64);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let dashboard_task = tokio::spawn(dashboard_service::run(
        dashboard,
        source,
        sync,
        Arc::new(SystemClock),
        config.poll.interval(),
        input_rx,
        shutdown_rx,
    ));

    // View server (presentation layer)
    let state = Arc::new(AppState {
        view,
        inputs: input_tx,
    });
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid server.bind address {}", config.server.bind))?;
    tracing::info!("Starting battery-dashboard view server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
            }
            tracing::info!("Shutdown requested");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    dashboard_task.await?;

    Ok(())
}
