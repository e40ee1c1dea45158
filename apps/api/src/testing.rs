//! Shared fixtures for handler tests.

use std::sync::Arc;

use crate::client::{ApiClient, InProcessTransport};
use crate::models::job::{Job, JobStatus};
use crate::routes::build_router;
use crate::seed::catalog::Catalog;
use crate::simulation::{NoLatency, RandomFailure, Simulation};
use crate::state::AppState;
use crate::store::Store;

/// Fresh in-memory app with the given simulation, plus a client wired to it.
pub async fn test_app_with(simulation: Simulation) -> (AppState, ApiClient<InProcessTransport>) {
    let store = Store::in_memory().await.expect("in-memory store");
    let catalog = Arc::new(Catalog::builtin().expect("built-in catalog"));
    let state = AppState::new(store, simulation, catalog);
    let client = ApiClient::new(InProcessTransport::new(build_router(state.clone())));
    (state, client)
}

/// No latency, no injected failures.
pub async fn test_app() -> (AppState, ApiClient<InProcessTransport>) {
    test_app_with(Simulation::deterministic()).await
}

/// Every write fails with the simulated 500.
pub async fn test_app_failing() -> (AppState, ApiClient<InProcessTransport>) {
    test_app_with(Simulation::new(
        Arc::new(NoLatency),
        Arc::new(RandomFailure::new(1.0)),
    ))
    .await
}

/// Inserts `job-1..=job-n` with `order == i`, slug `job-i`, every fifth job
/// (1, 6, 11, ...) archived and tags alternating `odd`/`even`.
pub async fn seeded_jobs(store: &Store, n: usize) -> Vec<Job> {
    let jobs: Vec<Job> = (1..=n as i64)
        .map(|i| Job {
            id: format!("job-{i}"),
            title: format!("Job {i}"),
            slug: format!("job-{i}"),
            status: Some(if (i - 1) % 5 == 0 {
                JobStatus::Archived
            } else {
                JobStatus::Active
            }),
            tags: vec![if i % 2 == 0 { "even" } else { "odd" }.to_string()],
            order: i,
            created_at: i,
            summary: String::new(),
        })
        .collect();
    store.bulk_add(&jobs).await.expect("seed jobs");
    jobs
}
