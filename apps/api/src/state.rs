use std::sync::Arc;

use crate::seed::catalog::Catalog;
use crate::simulation::Simulation;
use crate::store::Store;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    /// Latency and failure injection for `/api` routes.
    pub simulation: Simulation,
    /// Seed data tables, used by the startup seed and `POST /admin/seed`.
    pub catalog: Arc<Catalog>,
    pub seed_candidates: usize,
}

impl AppState {
    pub fn new(store: Store, simulation: Simulation, catalog: Arc<Catalog>) -> Self {
        Self {
            store,
            simulation,
            catalog,
            seed_candidates: crate::seed::DEFAULT_CANDIDATE_COUNT,
        }
    }
}
