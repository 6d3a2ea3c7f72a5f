// Application state for HTTP handlers
use crate::application::monitor_service::MonitorService;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<MonitorService>,
}
