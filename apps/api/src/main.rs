use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use talentflow::config::Config;
use talentflow::db::create_pool;
use talentflow::routes::build_router;
use talentflow::seed::{catalog::Catalog, seed_db};
use talentflow::simulation::Simulation;
use talentflow::state::AppState;
use talentflow::store::Store;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first; malformed env values abort startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting TalentFlow API v{}", env!("CARGO_PKG_VERSION"));

    // Open the document store (runs pending migrations)
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    let store = Store::open(pool).await?;
    info!("Store ready at schema version {}", store.schema_version().await?);

    let catalog = Arc::new(Catalog::load(config.seed_catalog_path.as_deref())?);
    info!(
        "Seed catalog loaded: {} job templates, {} assessment templates",
        catalog.jobs.len(),
        catalog.assessments.len()
    );

    if config.seed_on_startup {
        let mut rng = StdRng::from_entropy();
        let outcome = seed_db(&store, &catalog, &mut rng, config.seed_candidates).await?;
        info!("Startup seed: {outcome:?}");
    }

    let simulation = Simulation::from_config(&config);
    info!(
        "Simulating {}-{}ms latency, {:.0}% write failure rate",
        config.latency_min_ms,
        config.latency_max_ms,
        config.failure_rate * 100.0
    );

    let mut state = AppState::new(store, simulation, catalog);
    state.seed_candidates = config.seed_candidates;

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
