//! Adapter implementations for assignment ports.

pub mod memory;
pub mod postgres;
pub mod random;
