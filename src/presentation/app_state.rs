// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::mutation_service::MutationService;
use crate::application::streaming_service::StreamingDashboardService;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub mutation_service: MutationService,
    pub streaming_service: StreamingDashboardService,
}
