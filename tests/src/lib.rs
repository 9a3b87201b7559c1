//! # Zodiac Connext Test Suite
//!
//! Unified test crate containing:
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Shared world: factories, avatar, counter, token
//! └── integration/      # Cross-component flows against InMemoryChain
//!     ├── e2e_relay.rs          # Deploy mastercopy + proxy, then relay
//!     └── deployment_flows.rs   # Races, artifacts, factories, raw deploys
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p zc-tests
//!
//! # By category
//! cargo test -p zc-tests integration::e2e_relay
//! cargo test -p zc-tests integration::deployment_flows
//!
//! # Benchmarks
//! cargo bench -p zc-tests
//! ```

pub mod fixtures;
pub mod integration;
