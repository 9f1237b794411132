//! Shared helpers for `PostgreSQL` integration tests.
//!
//! Each test gets a fresh database cloned from a pre-migrated template on the
//! shared embedded cluster.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use mockable::DefaultClock;
use pg_embedded_setup_unpriv::TestCluster;
use review_rotation::assignment::{
    adapters::{
        postgres::{PostgresReviewStore, ReviewPgPool, SCHEMA_SQL},
        random::ThreadRandom,
    },
    services::{CreateTeamRequest, ReviewAssignmentService},
};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::runtime::Runtime;

/// Boxed error type returned by setup helpers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service type used across `PostgreSQL` integration tests.
pub type PgService = ReviewAssignmentService<PostgresReviewStore, DefaultClock, ThreadRandom>;

/// Template database name for the pre-migrated schema.
pub const TEMPLATE_DB: &str = "review_rotation_test_template";

static NEXT_DATABASE: AtomicU64 = AtomicU64::new(0);

/// Creates a multi-threaded runtime so blocking store work and racing tasks
/// run in parallel.
#[expect(clippy::expect_used, reason = "Test runtime must build")]
pub fn test_runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_all()
        .build()
        .expect("failed to create test runtime")
}

/// Ensures the template database exists with the schema applied.
///
/// # Errors
///
/// Returns an error if template creation or migration fails.
pub fn ensure_template(cluster: &TestCluster) -> Result<(), BoxError> {
    cluster
        .ensure_template_exists(TEMPLATE_DB, |db_name| {
            let url = cluster.connection().database_url(db_name);
            let mut conn = PgConnection::establish(&url).map_err(|e| eyre::eyre!("{e}"))?;
            conn.batch_execute(SCHEMA_SQL)
                .map_err(|e| eyre::eyre!("schema error: {e}"))?;
            Ok(())
        })
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(())
}

/// A database cloned from the template, dropped again when the handle goes.
///
/// The pool is declared first so its connections close before the database
/// is dropped.
pub struct TestDatabase {
    /// Connection pool against this database.
    pub pool: ReviewPgPool,
    _cleanup: CleanupGuard,
}

impl TestDatabase {
    /// Builds a service over this database.
    pub fn service(&self) -> PgService {
        ReviewAssignmentService::new(
            Arc::new(PostgresReviewStore::new(self.pool.clone())),
            Arc::new(DefaultClock),
            Arc::new(ThreadRandom),
        )
    }
}

/// Drops a test database even if the test panics.
struct CleanupGuard {
    cluster: &'static TestCluster,
    name: String,
}

impl Drop for CleanupGuard {
    #[expect(clippy::print_stderr, reason = "Cleanup failures are informational")]
    fn drop(&mut self) {
        if let Err(e) = self.cluster.drop_database(&self.name) {
            eprintln!("Warning: failed to drop test database {}: {e}", self.name);
        }
    }
}

/// Creates a fresh database from the template and pools connections to it.
///
/// # Errors
///
/// Returns an error if template setup, database creation, or pool
/// construction fails.
pub fn fresh_database(cluster: &'static TestCluster) -> Result<TestDatabase, BoxError> {
    ensure_template(cluster)?;
    let name = format!(
        "review_rotation_{}_{}",
        std::process::id(),
        NEXT_DATABASE.fetch_add(1, Ordering::Relaxed)
    );
    cluster
        .create_database_from_template(&name, TEMPLATE_DB)
        .map_err(|e| Box::new(e) as BoxError)?;
    let cleanup = CleanupGuard {
        cluster,
        name: name.clone(),
    };
    let url = cluster.connection().database_url(&name);
    let pool = Pool::builder()
        .max_size(8)
        .build(ConnectionManager::<PgConnection>::new(url))
        .map_err(|e| Box::new(e) as BoxError)?;
    Ok(TestDatabase {
        pool,
        _cleanup: cleanup,
    })
}

/// Registers a team whose members are all available.
#[expect(clippy::expect_used, reason = "Test helper fails fast on setup errors")]
pub async fn register_team(service: &PgService, team: &str, members: &[&str]) {
    let request = members
        .iter()
        .fold(CreateTeamRequest::new(team), |request, member| {
            request.with_member(*member, format!("user {member}"), true)
        });
    service
        .create_team(request)
        .await
        .expect("team registration should succeed");
}
