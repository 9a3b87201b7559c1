//! # Integration Tests
//!
//! Flows spanning the registry, the proxy factory, the relay module and the
//! fixtures hosted on `InMemoryChain`.

pub mod deployment_flows;
pub mod e2e_relay;
