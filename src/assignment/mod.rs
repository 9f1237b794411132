//! Reviewer assignment and rotation for pull requests.
//!
//! When a pull request opens, up to two available teammates of the author are
//! selected as reviewers; a reviewer can later be swapped for another
//! available teammate; merging releases every review obligation. All state
//! lives in the backing store, and each operation executes as a single unit
//! of work against it. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
