//! # Driving Ports (API - Inbound)
//!
//! The public deployment API. `MastercopyRegistry` and `ProxyFactory`
//! implement these; callers can depend on the traits and swap in doubles.

use crate::domain::entities::{DeployOutcome, DeploymentSpec, MastercopyRecord, ProxySetupSpec};
use crate::domain::value_objects::Address;
use crate::errors::DeploymentError;
use async_trait::async_trait;

/// Deterministic deployment of canonical implementations.
#[async_trait]
pub trait MastercopyApi: Send + Sync {
    /// Address `spec` lands on through the singleton factory.
    fn derive_address(&self, spec: &DeploymentSpec) -> Address;

    /// Deploys `spec` unless code already exists at its address.
    async fn deploy_mastercopy(&self, spec: &DeploymentSpec)
        -> Result<DeployOutcome, DeploymentError>;

    async fn read_mastercopy_record(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, DeploymentError>;

    async fn write_mastercopy_record(&self, record: MastercopyRecord)
        -> Result<(), DeploymentError>;
}

/// Minimal proxies with an atomic setup call.
#[async_trait]
pub trait ProxyApi: Send + Sync {
    fn predict_proxy_address(&self, spec: &ProxySetupSpec) -> Address;

    async fn deploy_proxy(&self, spec: &ProxySetupSpec) -> Result<DeployOutcome, DeploymentError>;
}
