//! Pure domain logic for the case-opening reward engine.
//!
//! Nothing in this crate performs I/O: boost resolution, cost calculation
//! and weighted prize selection operate on plain values so they can be
//! unit-tested without a database.

pub mod boost;
pub mod cost;
pub mod error;
pub mod random;
pub mod selection;
pub mod types;
