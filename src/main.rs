// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::{Router, routing::get};
use tokio::sync::{RwLock, watch};
use tower_http::trace::TraceLayer;

use crate::application::dashboard_service::DashboardService;
use crate::application::poller::Poller;
use crate::infrastructure::config::load_gateway_config;
use crate::infrastructure::gateway_client::GatewayClient;
use crate::infrastructure::session::StaticTokenProvider;
use crate::presentation::app_state::{AppState, DashboardIndex};
use crate::presentation::handlers::{get_dashboard, health_check, list_dashboards};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration; missing values fail fast here
    let config = load_gateway_config()?;

    // Create gateway adapters (infrastructure layer)
    let client = Arc::new(GatewayClient::new(config.gateway.base_url.clone()));
    let tokens = Arc::new(StaticTokenProvider::new(config.gateway.api_token.clone()));

    // Create services (application layer)
    let dashboard_service = DashboardService::new(client.clone(), tokens);

    // Dashboard index, refreshed in the background. The precondition
    // sender lives as long as main so the poller never goes idle.
    let index: DashboardIndex = Arc::new(RwLock::new(Vec::new()));
    let (_index_ready, index_ready_rx) = watch::channel(true);
    let _index_poller = {
        let layouts = client.clone();
        let index = index.clone();
        Poller::spawn(
            "dashboard-index",
            Duration::from_secs(config.gateway.index_poll_secs),
            index_ready_rx,
            move || {
                let layouts = layouts.clone();
                let index = index.clone();
                async move {
                    use crate::application::gateway_port::LayoutProvider;
                    let dashboards = layouts.list_dashboards().await?;
                    tracing::debug!("dashboard index refreshed: {} entries", dashboards.len());
                    *index.write().await = dashboards;
                    Ok(())
                }
            },
        )
    };

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        layouts: client,
        index,
    });

    // Build router (presentation layer)
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboards", get(list_dashboards))
        .route("/dashboards/:id", get(get_dashboard))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = config.server.listen.parse()?;
    println!("Starting dashboard-gateway service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}
