//! # Adapters Layer (Outer Hexagon)
//!
//! Implementations of the driven ports: the in-memory chain with its contract
//! fixtures, and the artifact stores.

pub mod artifact_store;
pub mod chain;
pub mod fixtures;

pub use artifact_store::*;
pub use chain::*;
pub use fixtures::*;
