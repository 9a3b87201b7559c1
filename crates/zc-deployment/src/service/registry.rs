//! # Mastercopy Registry
//!
//! Deploys canonical implementations through the singleton factory and keeps
//! the artifact records that make those deployments reproducible elsewhere.

use super::{fold_outcome, submit_and_confirm, DeploymentStats};
use crate::config::DeployerConfig;
use crate::domain::abi::{ISingletonFactory, SolCall};
use crate::domain::entities::{
    ConstructorArgs, DeployOutcome, DeploymentSpec, MastercopyRecord, TransactionIntent,
};
use crate::domain::invariants::check_record_reproducible;
use crate::domain::services::compute_contract_address;
use crate::domain::value_objects::{Address, Bytes, Hash};
use crate::errors::DeploymentError;
use crate::ports::inbound::MastercopyApi;
use crate::ports::outbound::{ArtifactStore, NetworkClient};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};

/// Result of deploying one recorded mastercopy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedDeployment {
    pub contract_name: String,
    pub version: String,
    pub outcome: DeployOutcome,
}

/// Deterministic mastercopy deployment plus artifact bookkeeping.
pub struct MastercopyRegistry<N: NetworkClient, S: ArtifactStore> {
    config: DeployerConfig,
    network: Arc<N>,
    store: Arc<S>,
    stats: Arc<RwLock<DeploymentStats>>,
}

impl<N: NetworkClient, S: ArtifactStore> MastercopyRegistry<N, S> {
    pub fn new(network: Arc<N>, store: Arc<S>, config: DeployerConfig) -> Self {
        Self {
            config,
            network,
            store,
            stats: Arc::new(RwLock::new(DeploymentStats::default())),
        }
    }

    pub fn config(&self) -> &DeployerConfig {
        &self.config
    }

    pub async fn stats(&self) -> DeploymentStats {
        self.stats.read().await.clone()
    }

    async fn has_code(&self, address: Address) -> Result<bool, DeploymentError> {
        Ok(!self.network.get_code(address).await?.is_empty())
    }

    async fn require_factory(&self, factory: Address) -> Result<(), DeploymentError> {
        if self.has_code(factory).await? {
            Ok(())
        } else {
            Err(DeploymentError::FactoryMissing(factory))
        }
    }

    /// Address of `spec` behind the configured singleton factory.
    pub fn derive_address(&self, spec: &DeploymentSpec) -> Address {
        spec.derive_address(self.config.singleton_factory)
    }

    /// Deploys `spec` through the singleton factory unless code already
    /// exists at its derived address.
    ///
    /// # Errors
    ///
    /// * `FactoryMissing` - no code at the singleton factory
    /// * `DeploymentFailed` - the transaction reverted or left no code behind
    /// * `Network` - lookup, submission or receipt timeout failures
    #[instrument(skip(self, spec), fields(salt = %spec.salt))]
    pub async fn deploy_mastercopy(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeployOutcome, DeploymentError> {
        let address = self.derive_address(spec);

        if self.has_code(address).await? {
            info!(%address, "mastercopy already deployed");
            let outcome = Ok(DeployOutcome::noop(address, None));
            self.stats.write().await.record(&outcome);
            return outcome;
        }
        self.require_factory(self.config.singleton_factory).await?;

        let data = ISingletonFactory::deployCall {
            initCode: spec.init_code.clone().into(),
            salt: spec.salt.into(),
        }
        .abi_encode();
        let intent = TransactionIntent::call(self.config.deployer, self.config.singleton_factory, data);
        self.stats.write().await.transactions_submitted += 1;
        let receipt = submit_and_confirm(&*self.network, intent, self.config.receipt_timeout_ms).await?;

        let result = fold_outcome(address, &receipt, self.has_code(address).await?);
        self.stats.write().await.record(&result);
        result
    }

    /// Deploys with plain CREATE from the deployer account. The address
    /// depends on the deployer nonce, so it differs across chains.
    ///
    /// # Errors
    ///
    /// * `Abi` - the constructor arguments do not encode
    /// * `DeploymentFailed` - the creation reverted
    /// * `Network` - nonce lookup, submission or receipt failures
    #[instrument(skip_all)]
    pub async fn deploy_raw(
        &self,
        bytecode: &Bytes,
        constructor_args: &ConstructorArgs,
    ) -> Result<DeployOutcome, DeploymentError> {
        let spec = DeploymentSpec::from_parts(bytecode, constructor_args, Hash::ZERO)?;
        let nonce = self.network.get_nonce(self.config.deployer).await?;
        let address = compute_contract_address(self.config.deployer, nonce);

        self.stats.write().await.transactions_submitted += 1;
        let receipt = submit_and_confirm(
            &*self.network,
            TransactionIntent::create(self.config.deployer, spec.init_code),
            self.config.receipt_timeout_ms,
        )
        .await?;

        if receipt.is_success() && receipt.created_address.is_some_and(|a| a != address) {
            warn!(%address, created = ?receipt.created_address, "nonce moved before inclusion");
        }
        let address = receipt.created_address.unwrap_or(address);
        let result = fold_outcome(address, &receipt, self.has_code(address).await?);
        self.stats.write().await.record(&result);
        result
    }

    // =========================================================================
    // ARTIFACT RECORDS
    // =========================================================================

    /// Record for `contract_name`; `None` version picks the latest.
    ///
    /// # Errors
    ///
    /// `Artifact` when no record matches or the store cannot be read.
    pub async fn read_mastercopy_record(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, DeploymentError> {
        Ok(self.store.read(contract_name, version).await?)
    }

    /// # Errors
    ///
    /// `Artifact` on a conflicting duplicate version or a store failure.
    pub async fn write_mastercopy_record(
        &self,
        record: MastercopyRecord,
    ) -> Result<(), DeploymentError> {
        Ok(self.store.write(record).await?)
    }

    /// Derives the mastercopy address for compiled `bytecode` and records it,
    /// without touching the network.
    ///
    /// # Errors
    ///
    /// `Abi` when the constructor arguments do not encode, `Artifact` when the
    /// record cannot be written.
    #[instrument(skip(self, bytecode, constructor_args))]
    pub async fn extract_mastercopy(
        &self,
        contract_name: &str,
        version: &str,
        source_name: Option<&str>,
        bytecode: Bytes,
        constructor_args: ConstructorArgs,
        salt: Hash,
    ) -> Result<MastercopyRecord, DeploymentError> {
        let spec = DeploymentSpec::from_parts(&bytecode, &constructor_args, salt)?;
        let record = MastercopyRecord {
            contract_name: contract_name.to_string(),
            version: version.to_string(),
            source_name: source_name.map(str::to_string),
            factory: self.config.singleton_factory,
            address: self.derive_address(&spec),
            bytecode,
            constructor_args,
            salt,
        };
        self.store.write(record.clone()).await?;
        info!(address = %record.address, "mastercopy extracted");
        Ok(record)
    }

    /// Deploys a recorded mastercopy; `None` version picks the latest.
    ///
    /// # Errors
    ///
    /// * `Artifact` - no such record
    /// * `FactoryMismatch` - the record targets another singleton factory
    /// * `AddressMismatch` - the record no longer derives its address
    /// * anything [`Self::deploy_mastercopy`] returns
    #[instrument(skip(self))]
    pub async fn deploy_recorded(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<DeployOutcome, DeploymentError> {
        let record = self.store.read(contract_name, version).await?;
        self.deploy_record(&record).await
    }

    /// Deploys every recorded version of every mastercopy, stopping at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// The first error [`Self::deploy_recorded`] would report for a record.
    pub async fn deploy_all_recorded(&self) -> Result<Vec<RecordedDeployment>, DeploymentError> {
        let records = self.store.list().await?;
        let mut deployed = Vec::with_capacity(records.len());
        for record in records {
            let outcome = self.deploy_record(&record).await?;
            deployed.push(RecordedDeployment {
                contract_name: record.contract_name,
                version: record.version,
                outcome,
            });
        }
        Ok(deployed)
    }

    async fn deploy_record(
        &self,
        record: &MastercopyRecord,
    ) -> Result<DeployOutcome, DeploymentError> {
        if record.factory != self.config.singleton_factory {
            return Err(DeploymentError::FactoryMismatch {
                recorded: record.factory,
                configured: self.config.singleton_factory,
            });
        }
        check_record_reproducible(record)?;
        self.deploy_mastercopy(&record.deployment_spec()?).await
    }

    /// Deploys the module proxy factory as a mastercopy with salt zero.
    ///
    /// The singleton factory itself must already exist on the network.
    ///
    /// # Errors
    ///
    /// `FactoryMissing` when it does not, otherwise as [`Self::deploy_mastercopy`].
    #[instrument(skip_all)]
    pub async fn deploy_factories(
        &self,
        module_proxy_factory_bytecode: &Bytes,
    ) -> Result<DeployOutcome, DeploymentError> {
        self.require_factory(self.config.singleton_factory).await?;
        let spec = DeploymentSpec::new(module_proxy_factory_bytecode.clone(), Hash::ZERO);
        self.deploy_mastercopy(&spec).await
    }
}

#[async_trait]
impl<N: NetworkClient, S: ArtifactStore> MastercopyApi for MastercopyRegistry<N, S> {
    fn derive_address(&self, spec: &DeploymentSpec) -> Address {
        MastercopyRegistry::derive_address(self, spec)
    }

    async fn deploy_mastercopy(
        &self,
        spec: &DeploymentSpec,
    ) -> Result<DeployOutcome, DeploymentError> {
        MastercopyRegistry::deploy_mastercopy(self, spec).await
    }

    async fn read_mastercopy_record(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, DeploymentError> {
        MastercopyRegistry::read_mastercopy_record(self, contract_name, version).await
    }

    async fn write_mastercopy_record(
        &self,
        record: MastercopyRecord,
    ) -> Result<(), DeploymentError> {
        MastercopyRegistry::write_mastercopy_record(self, record).await
    }
}

// =============================================================================
// TESTS
// =============================================================================
