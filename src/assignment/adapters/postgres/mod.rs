//! `PostgreSQL` adapters for reviewer assignment persistence.

mod models;
mod schema;
mod store;

pub use store::{PostgresReviewStore, ReviewPgPool, SCHEMA_SQL};
