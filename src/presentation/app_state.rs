// Application state for HTTP handlers
use crate::application::dashboard_service::DashboardService;
use crate::application::gateway_port::{DashboardSummary, LayoutProvider};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Index of known dashboards, kept fresh by the background poller. The
/// poller is the sole writer; handlers only read.
pub type DashboardIndex = Arc<RwLock<Vec<DashboardSummary>>>;

#[derive(Clone)]
pub struct AppState {
    pub dashboard_service: DashboardService,
    pub layouts: Arc<dyn LayoutProvider>,
    pub index: DashboardIndex,
}
