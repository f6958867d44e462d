// Main entry point - Dependency injection, polling and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc};
use anyhow::Context;
use axum::{
    routing::{get, post, put},
    Router,
};
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::catalog_service::CatalogService;
use crate::application::dashboard_service::DashboardService;
use crate::application::poll_scheduler::PollScheduler;
use crate::infrastructure::backend_repository::BackendRepository;
use crate::infrastructure::config::load_config;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    day_history, get_dashboard, health_check, list_countries, list_servers, range_history,
    select_country, show_live, stream_dashboard, update_selection,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = load_config().context("Failed to load config/dashboard")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Create repository (infrastructure layer)
    let repository = Arc::new(BackendRepository::new(
        config.backend.base_url.clone(),
        config.backend.timeout(),
    )?);

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository.clone(), &config.display)?;
    let catalog_service = CatalogService::new(repository.clone());
    let scheduler = PollScheduler::new(
        dashboard_service.clone(),
        config.polling.samples_interval(),
        config.polling.averages_interval(),
    );

    // Start polling the backend
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pollers = scheduler.start(shutdown_rx);

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        catalog_service,
        scheduler,
        servers_per_country: config.catalog.servers_per_country,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/events", get(stream_dashboard))
        .route("/selection", put(update_selection))
        .route("/live", post(show_live))
        .route("/history", get(range_history))
        .route("/history/:fecha", get(day_history))
        .route("/countries", get(list_countries))
        .route("/countries/:pais", post(select_country))
        .route("/servers", get(list_servers))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address {}", config.server.bind))?;
    tracing::info!(
        "Starting netquality-dashboard on {} (backend {})",
        addr,
        config.backend.base_url
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    let _ = shutdown_tx.send(true);
    for poller in pollers {
        let _ = poller.await;
    }
    tracing::info!("Shut down");

    Ok(())
}
