//! In-memory store adapter.
//!
//! Reads see the latest committed state overlaid with the unit's own pending
//! writes. Writes are buffered and replayed onto shared state at commit, so
//! concurrent units that both read a flag and both write it end with the last
//! committed write. Pull request rows are locked through a lock table held
//! until the unit ends.

mod row_locks;
mod state;
mod store;

pub use store::InMemoryReviewStore;
