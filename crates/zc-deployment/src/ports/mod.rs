//! # Ports Layer
//!
//! Trait definitions between the deployment domain and the outside world.
//!
//! - **Driving Ports (Inbound)**: `MastercopyApi`, `ProxyApi`
//! - **Driven Ports (Outbound)**: `NetworkClient`, `ArtifactStore`, `ModuleExecutor`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
