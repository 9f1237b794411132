//! Runs the review rotation HTTP server.
//!
//! Configuration is read from the environment; see
//! [`review_rotation::config::RotationConfig`]. The review tables are created
//! on startup when missing.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use review_rotation::assignment::{
    adapters::{postgres::PostgresReviewStore, random::ThreadRandom},
    services::ReviewAssignmentService,
};
use review_rotation::config::RotationConfig;
use review_rotation::{http, telemetry};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::runtime::Builder;
use tracing::{info, warn};

/// Boxed error type for the main result.
type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), BoxError> {
    let config = RotationConfig::from_env()?;
    telemetry::init(&config.log_filter)?;

    let manager = ConnectionManager::<PgConnection>::new(config.database_url.as_str());
    let pool = Pool::builder()
        .max_size(config.pool_max_size)
        .build(manager)?;

    let runtime = Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(serve(config, PostgresReviewStore::new(pool)))
}

async fn serve(config: RotationConfig, store: PostgresReviewStore) -> Result<(), BoxError> {
    store.ensure_schema().await?;

    let service = ReviewAssignmentService::new(
        Arc::new(store),
        Arc::new(DefaultClock),
        Arc::new(ThreadRandom),
    )
    .with_operation_timeout(config.operation_timeout);

    let listener = TcpListener::bind(config.bind_addr).await?;
    info!(
        addr = %config.bind_addr,
        pool_max_size = config.pool_max_size,
        "review rotation listening"
    );
    axum::serve(listener, http::router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("review rotation stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
