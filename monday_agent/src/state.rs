//! Shared agent state: the metrics facility handle and selection size.
//! Nothing in here is mutated after startup; each request samples afresh.

use std::sync::Arc;

use crate::metrics::{MetricsSource, SysinfoSource};
use crate::select::TOP_PROCESSES;

pub type SharedSource = Arc<dyn MetricsSource>;

#[derive(Clone)]
pub struct AppState {
    pub source: SharedSource,
    pub top_n: usize,
}

impl AppState {
    pub fn new(source: SharedSource) -> Self {
        Self {
            source,
            top_n: TOP_PROCESSES,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Arc::new(SysinfoSource))
    }
}
