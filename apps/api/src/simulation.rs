//! Network-condition simulation for the mock API: randomized latency on every
//! request and random failure on writes. Both are pluggable so tests can run
//! with zero latency and no failures.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use rand::Rng;
use tracing::warn;

use crate::config::Config;
use crate::errors::AppError;
use crate::state::AppState;

pub trait LatencyPolicy: Send + Sync {
    fn delay(&self) -> Duration;
}

pub trait FailurePolicy: Send + Sync {
    fn should_fail(&self) -> bool;
}

/// Delay drawn uniformly from `[min_ms, max_ms)` milliseconds.
#[derive(Debug, Clone)]
pub struct UniformLatency {
    min_ms: u64,
    max_ms: u64,
}

impl UniformLatency {
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            min_ms: min_ms.min(max_ms),
            max_ms: min_ms.max(max_ms),
        }
    }
}

impl LatencyPolicy for UniformLatency {
    fn delay(&self) -> Duration {
        if self.min_ms == self.max_ms {
            return Duration::from_millis(self.min_ms);
        }
        Duration::from_millis(rand::thread_rng().gen_range(self.min_ms..self.max_ms))
    }
}

pub struct NoLatency;

impl LatencyPolicy for NoLatency {
    fn delay(&self) -> Duration {
        Duration::ZERO
    }
}

/// Fails with probability `rate`, clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct RandomFailure {
    rate: f64,
}

impl RandomFailure {
    pub fn new(rate: f64) -> Self {
        let rate = if rate.is_nan() { 0.0 } else { rate.clamp(0.0, 1.0) };
        Self { rate }
    }
}

impl FailurePolicy for RandomFailure {
    fn should_fail(&self) -> bool {
        rand::thread_rng().gen_bool(self.rate)
    }
}

pub struct NeverFail;

impl FailurePolicy for NeverFail {
    fn should_fail(&self) -> bool {
        false
    }
}

#[derive(Clone)]
pub struct Simulation {
    latency: Arc<dyn LatencyPolicy>,
    failure: Arc<dyn FailurePolicy>,
}

impl Simulation {
    pub fn new(latency: Arc<dyn LatencyPolicy>, failure: Arc<dyn FailurePolicy>) -> Self {
        Self { latency, failure }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            Arc::new(UniformLatency::new(config.latency_min_ms, config.latency_max_ms)),
            Arc::new(RandomFailure::new(config.failure_rate)),
        )
    }

    /// Zero latency, no injected failures.
    pub fn deterministic() -> Self {
        Self::new(Arc::new(NoLatency), Arc::new(NeverFail))
    }

    pub async fn delay(&self) {
        let delay = self.latency.delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Rolls the failure dice for a write. Must run before any store mutation.
    pub fn check_write(&self, operation: &str) -> Result<(), AppError> {
        if self.failure.should_fail() {
            warn!("Injected simulated failure for {operation}");
            return Err(AppError::SimulatedFailure);
        }
        Ok(())
    }
}

/// Middleware applied to every `/api` route: waits out the simulated latency
/// before the handler runs. There is no cancellation once the delay starts.
pub async fn simulate_latency(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    state.simulation.delay().await;
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_latency_stays_in_window() {
        let policy = UniformLatency::new(200, 1200);
        for _ in 0..500 {
            let d = policy.delay();
            assert!(d >= Duration::from_millis(200));
            assert!(d < Duration::from_millis(1200));
        }
    }

    #[test]
    fn test_uniform_latency_swaps_inverted_bounds() {
        let policy = UniformLatency::new(50, 10);
        let d = policy.delay();
        assert!(d >= Duration::from_millis(10) && d < Duration::from_millis(50));
    }

    #[test]
    fn test_failure_rate_extremes() {
        let always = RandomFailure::new(1.0);
        let never = RandomFailure::new(0.0);
        for _ in 0..100 {
            assert!(always.should_fail());
            assert!(!never.should_fail());
        }
        assert!(!RandomFailure::new(-3.0).should_fail());
        assert!(RandomFailure::new(7.0).should_fail());
    }

    #[test]
    fn test_check_write_reports_simulated_failure() {
        let sim = Simulation::new(Arc::new(NoLatency), Arc::new(RandomFailure::new(1.0)));
        assert!(matches!(
            sim.check_write("create job"),
            Err(AppError::SimulatedFailure)
        ));
        assert!(Simulation::deterministic().check_write("create job").is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_waits_for_the_drawn_latency() {
        let sim = Simulation::new(Arc::new(UniformLatency::new(300, 300)), Arc::new(NeverFail));
        let start = tokio::time::Instant::now();
        sim.delay().await;
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
