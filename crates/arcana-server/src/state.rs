use std::sync::Arc;

use arcana_core::ReadingPipeline;

/// Shared application state accessible from all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ReadingPipeline>,
}
