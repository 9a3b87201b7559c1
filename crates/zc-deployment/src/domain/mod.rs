//! # Domain Layer (Inner Hexagon)
//!
//! Address derivation, ABI encoding and the relay module state machine.
//! NO I/O, NO async. Dependencies point inward only.

pub mod abi;
pub mod entities;
pub mod invariants;
pub mod relay;
pub mod services;
pub mod value_objects;

pub use abi::{AbiType, AbiValue};
pub use entities::*;
pub use invariants::*;
pub use relay::*;
pub use services::*;
pub use value_objects::*;
