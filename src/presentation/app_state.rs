// Application state for HTTP handlers
use crate::application::catalog_service::CatalogService;
use crate::application::dashboard_service::DashboardService;
use crate::application::poll_scheduler::PollScheduler;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub catalog_service: CatalogService,
    pub scheduler: PollScheduler,
    pub servers_per_country: u32,
}
