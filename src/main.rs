// Main entry point - Dependency injection and server setup
use std::{net::SocketAddr, sync::Arc, time::Duration};
use axum::{
    Router,
    routing::{get, patch, post},
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;

use helpdesk_dashboard::application::change_feed::{ChangeNotifier, spawn_poller};
use helpdesk_dashboard::application::dashboard_service::DashboardService;
use helpdesk_dashboard::application::mutation_service::MutationService;
use helpdesk_dashboard::application::streaming_service::StreamingDashboardService;
use helpdesk_dashboard::infrastructure::config::load_config;
use helpdesk_dashboard::infrastructure::http_repository::HttpRepository;
use helpdesk_dashboard::presentation::app_state::AppState;
use helpdesk_dashboard::presentation::handlers::{
    bulk_update, create_record, dashboard_overview, delete_record, departments, health_check,
    list_airtime, list_assets, list_incidents, list_requests, list_users, stream_dashboard,
    technicians, update_record, warranty_report,
};

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(dashboard_overview))
        .route("/dashboard/stream", get(stream_dashboard))
        .route("/users", get(list_users))
        .route("/assets", get(list_assets))
        .route("/incidents", get(list_incidents))
        .route("/requests", get(list_requests))
        .route("/airtime", get(list_airtime))
        .route("/analytics/warranty", get(warranty_report))
        .route("/analytics/departments", get(departments))
        .route("/analytics/technicians", get(technicians))
        .route("/collections/:collection", post(create_record))
        .route("/collections/:collection/bulk", post(bulk_update))
        .route(
            "/collections/:collection/:id",
            patch(update_record).delete(delete_record),
        )
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_config()?;

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpRepository::new(&config.api)?);

    // Change feed shared by writers, the poller and dashboard streams
    let notifier = ChangeNotifier::new();
    if config.realtime.poll_interval_secs > 0 {
        spawn_poller(
            notifier.clone(),
            Duration::from_secs(config.realtime.poll_interval_secs),
        );
    }

    // Create services (application layer)
    let dashboard_service = DashboardService::new(repository.clone(), config.windows.clone());
    let mutation_service = MutationService::new(repository.clone(), notifier.clone());
    let streaming_service = StreamingDashboardService::new(
        dashboard_service.clone(),
        notifier,
        Duration::from_millis(config.realtime.debounce_ms),
    );

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        mutation_service,
        streaming_service,
    });

    let addr: SocketAddr = config.server.bind.parse()?;
    tracing::info!("Starting helpdesk-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router(state)).await?;

    Ok(())
}
