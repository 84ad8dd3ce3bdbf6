use crate::config::Settings;
use crate::google::Backend;
use crate::models::CampusRegistry;
use std::sync::Arc;

/// Shared read-only request context. Nothing here changes after start-up.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<CampusRegistry>,
    pub backend: Arc<dyn Backend>,
}

impl AppState {
    pub fn new(settings: Settings, registry: CampusRegistry, backend: Arc<dyn Backend>) -> Self {
        Self {
            settings: Arc::new(settings),
            registry: Arc::new(registry),
            backend,
        }
    }
}
