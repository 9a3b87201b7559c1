//! # Proxy Factory
//!
//! Deploys EIP-1167 minimal proxies of a mastercopy through the module proxy
//! factory. Creation and `setUp` happen in one transaction, so a proxy is
//! never observable uninitialized.

use super::{fold_outcome, submit_and_confirm, DeploymentStats};
use crate::config::DeployerConfig;
use crate::domain::abi::{IModuleProxyFactory, SolCall};
use crate::domain::entities::{DeployOutcome, ProxySetupSpec, TransactionIntent};
use crate::domain::value_objects::to_sol_u256;
use crate::domain::invariants::is_proxy_for;
use crate::domain::value_objects::Address;
use crate::errors::DeploymentError;
use crate::ports::inbound::ProxyApi;
use crate::ports::outbound::NetworkClient;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

pub struct ProxyFactory<N: NetworkClient> {
    config: DeployerConfig,
    network: Arc<N>,
    stats: Arc<RwLock<DeploymentStats>>,
}

impl<N: NetworkClient> ProxyFactory<N> {
    pub fn new(network: Arc<N>, config: DeployerConfig) -> Self {
        Self {
            config,
            network,
            stats: Arc::new(RwLock::new(DeploymentStats::default())),
        }
    }

    pub fn config(&self) -> &DeployerConfig {
        &self.config
    }

    pub async fn stats(&self) -> DeploymentStats {
        self.stats.read().await.clone()
    }

    /// Address the proxy for `spec` will occupy. Depends only on the factory,
    /// the mastercopy, the setup calldata and the salt nonce.
    pub fn predict_proxy_address(&self, spec: &ProxySetupSpec) -> Address {
        spec.predict(self.config.module_proxy_factory)
    }

    /// Creates and initializes the proxy for `spec`, or reports the existing
    /// one.
    ///
    /// # Errors
    ///
    /// * `FactoryMissing` - no code at the module proxy factory
    /// * `DeploymentFailed` - the factory reverted (no mastercopy code, setup
    ///   rejected) and nothing is deployed at the predicted address
    #[instrument(skip(self, spec), fields(mastercopy = %spec.mastercopy, salt_nonce = %spec.salt_nonce))]
    pub async fn deploy_proxy(&self, spec: &ProxySetupSpec) -> Result<DeployOutcome, DeploymentError> {
        let address = self.predict_proxy_address(spec);
        let factory = self.config.module_proxy_factory;

        if !self.network.get_code(address).await?.is_empty() {
            info!(%address, "proxy already deployed");
            let outcome = Ok(DeployOutcome::noop(address, None));
            self.stats.write().await.record(&outcome);
            return outcome;
        }
        if self.network.get_code(factory).await?.is_empty() {
            return Err(DeploymentError::FactoryMissing(factory));
        }

        let data = deploy_module_call(spec);
        self.stats.write().await.transactions_submitted += 1;
        let receipt = submit_and_confirm(
            &*self.network,
            TransactionIntent::call(self.config.deployer, factory, data),
            self.config.receipt_timeout_ms,
        )
        .await?;

        let code = self.network.get_code(address).await?;
        if !code.is_empty() && !is_proxy_for(&code, spec.mastercopy) {
            warn!(%address, "code at predicted address is not a proxy for the mastercopy");
        }
        let result = fold_outcome(address, &receipt, !code.is_empty());
        self.stats.write().await.record(&result);
        result
    }
}

/// `deployModule(mastercopy, setupCalldata, saltNonce)`.
fn deploy_module_call(spec: &ProxySetupSpec) -> Vec<u8> {
    IModuleProxyFactory::deployModuleCall {
        masterCopy: spec.mastercopy.into(),
        initializer: spec.setup_calldata.clone().into(),
        saltNonce: to_sol_u256(spec.salt_nonce),
    }
    .abi_encode()
}

#[async_trait]
impl<N: NetworkClient> ProxyApi for ProxyFactory<N> {
    fn predict_proxy_address(&self, spec: &ProxySetupSpec) -> Address {
        ProxyFactory::predict_proxy_address(self, spec)
    }

    async fn deploy_proxy(&self, spec: &ProxySetupSpec) -> Result<DeployOutcome, DeploymentError> {
        ProxyFactory::deploy_proxy(self, spec).await
    }
}
