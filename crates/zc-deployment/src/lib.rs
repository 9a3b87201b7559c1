//! # ZC Deployment - Connext Relay Module Deployment
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Deploys the Connext relay module the way Zodiac modules are deployed:
//! a canonical mastercopy at a CREATE2 address identical on every chain, and
//! per-avatar EIP-1167 proxies created and initialized in one transaction.
//! The module itself accepts cross-chain messages only from the configured
//! Connext contract, origin domain and origin sender, and forwards them to
//! its target as module transactions.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Same init code and salt derive the same address | `domain/services.rs` - `derive_address()` |
//! | Deploying twice is a no-op | `service/registry.rs`, `service/factory.rs` |
//! | A proxy is set up exactly once | `domain/relay.rs` - `RelayModule::set_up()` |
//! | Dispatch is authenticated before any effect | `domain/relay.rs` - `RelayModule::receive_message()` |
//! | Records reproduce their address | `domain/invariants.rs` - `check_record_reproducible()` |
//!
//! ## Well-Known Addresses
//!
//! | Contract | Address |
//! |----------|---------|
//! | ERC-2470 singleton factory | `0xce0042B868300000d44A59004Da54A005ffdcf9f` |
//! | Module proxy factory | `0x000000000000aDdB49795b0f9bA5BC298cDda236` |
//!
//! ## Module Structure
//!
//! ```text
//! zc-deployment/
//! ├── domain/      # ABI, address derivation, relay module state machine
//! ├── ports/       # MastercopyApi, ProxyApi, NetworkClient, ArtifactStore
//! ├── adapters/    # InMemoryChain, JSON and in-memory artifact stores
//! ├── service/     # MastercopyRegistry, ProxyFactory
//! ├── events.rs    # Module and factory events
//! └── config.rs    # DeployerConfig
//! ```
//!
//! ## Usage Example
//!
//! ```ignore
//! use zc_deployment::prelude::*;
//!
//! let registry = MastercopyRegistry::new(network.clone(), store, config.clone());
//! let mastercopy = registry.deploy_recorded("ConnextModule", None).await?.address;
//!
//! let factory = ProxyFactory::new(network, config);
//! let spec = ProxySetupSpec::for_module(mastercopy, &params, U256::from(salt_nonce));
//! let proxy = factory.deploy_proxy(&spec).await?;
//! ```

// Crate-level lints
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::{DeployerConfig, MODULE_PROXY_FACTORY, SINGLETON_FACTORY};
    pub use crate::domain::entities::{
        ConstructorArgs, DeployOutcome, DeploymentSpec, Instruction, MastercopyRecord,
        ModuleParams, Operation, ProxySetupSpec, RelayMessage,
    };
    pub use crate::domain::relay::{ModuleState, RelayModule};
    pub use crate::domain::value_objects::{Address, Bytes, Hash, U256};
    pub use crate::domain::{AbiType, AbiValue};
    pub use crate::errors::{DeploymentError, ModuleError};
    pub use crate::ports::{ArtifactStore, MastercopyApi, NetworkClient, ProxyApi};
    pub use crate::service::{DeploymentStats, MastercopyRegistry, ProxyFactory};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
