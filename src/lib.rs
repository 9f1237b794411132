//! Review rotation: reviewer assignment for pull requests.
//!
//! This crate assigns and rotates code-review workload across a team. Opening
//! a pull request selects up to two available teammates of the author as
//! reviewers, a reviewer can be swapped for another available teammate, and
//! merging releases every review obligation. Each operation runs as one unit
//! of work against a shared relational store, with a per-pull-request row
//! lock serializing reassignment and merge.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for the store and randomness
//! - **Adapters**: `PostgreSQL`, in-memory, and random-source implementations
//! - **Services**: Lifecycle orchestration, candidate selection, and
//!   availability tracking
//!
//! # Modules
//!
//! - [`assignment`]: Reviewer assignment bounded context
//! - [`http`]: JSON API boundary
//! - [`config`]: Environment-driven process settings
//! - [`telemetry`]: Structured logging setup

pub mod assignment;
pub mod config;
pub mod http;
pub mod telemetry;
