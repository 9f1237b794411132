//! Port contracts for reviewer assignment.
//!
//! Ports define infrastructure-agnostic interfaces used by assignment
//! services: the transactional store and the randomness provider.

pub mod random;
pub mod store;

pub use random::RandomSource;
pub use store::{ReviewStore, StoreError, StoreResult, UnitOfWork};

#[cfg(test)]
pub use random::MockRandomSource;
