//! # Deployment Flows
//!
//! - Concurrent duplicate deployments fold into one creation and one no-op
//! - Addresses are identical across chains
//! - Mastercopy records survive a JSON round trip and redeploy elsewhere
//! - The module proxy factory can itself be deployed as a mastercopy
//! - Plain CREATE deployments of a fully configured module

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use async_trait::async_trait;
    use std::sync::Arc;
    use zc_deployment::adapters::{InMemoryChain, JsonArtifactStore};
    use zc_deployment::domain::invariants::{check_record_reproducible, is_proxy_for};
    use zc_deployment::domain::services::compute_contract_address;
    use zc_deployment::domain::{Receipt, TransactionIntent};
    use zc_deployment::errors::NetworkError;
    use zc_deployment::prelude::*;

    /// Yields to the scheduler before every network call so concurrent
    /// deployers interleave.
    struct Interleaving(Arc<InMemoryChain>);

    #[async_trait]
    impl NetworkClient for Interleaving {
        async fn get_code(&self, address: Address) -> Result<Bytes, NetworkError> {
            tokio::task::yield_now().await;
            self.0.get_code(address).await
        }
        async fn get_nonce(&self, address: Address) -> Result<u64, NetworkError> {
            tokio::task::yield_now().await;
            self.0.get_nonce(address).await
        }
        async fn send_transaction(&self, intent: TransactionIntent) -> Result<Hash, NetworkError> {
            tokio::task::yield_now().await;
            self.0.send_transaction(intent).await
        }
        async fn wait_for_receipt(&self, hash: Hash) -> Result<Receipt, NetworkError> {
            tokio::task::yield_now().await;
            self.0.wait_for_receipt(hash).await
        }
        async fn chain_id(&self) -> Result<u64, NetworkError> {
            self.0.chain_id().await
        }
    }

    // =========================================================================
    // CONCURRENCY
    // =========================================================================

    #[tokio::test]
    async fn test_concurrent_mastercopy_deployments() {
        let chain = network(31337);
        let network = Arc::new(Interleaving(chain.clone()));
        let first = MastercopyRegistry::new(
            network.clone(),
            Arc::new(zc_deployment::adapters::InMemoryArtifactStore::new()),
            config(),
        );
        let second = MastercopyRegistry::new(
            network,
            Arc::new(zc_deployment::adapters::InMemoryArtifactStore::new()),
            config(),
        );
        let spec = mastercopy_spec();

        let (a, b) = tokio::join!(first.deploy_mastercopy(&spec), second.deploy_mastercopy(&spec));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.address, b.address);
        assert_eq!(u8::from(a.noop) + u8::from(b.noop), 1);
        assert_eq!(
            chain.module_state(a.address),
            Some(ModuleState::Active(ModuleParams::placeholder()))
        );
    }

    #[tokio::test]
    async fn test_concurrent_proxy_deployments() {
        let chain = network(31337);
        let mastercopy = registry(&chain)
            .deploy_mastercopy(&mastercopy_spec())
            .await
            .unwrap()
            .address;

        let network = Arc::new(Interleaving(chain.clone()));
        let first = ProxyFactory::new(network.clone(), config());
        let second = ProxyFactory::new(network, config());
        let spec = ProxySetupSpec::for_module(mastercopy, &module_params(), U256::from(7));

        let (a, b) = tokio::join!(first.deploy_proxy(&spec), second.deploy_proxy(&spec));
        let (a, b) = (a.unwrap(), b.unwrap());

        assert_eq!(a.address, b.address);
        assert_eq!(u8::from(a.noop) + u8::from(b.noop), 1);
        assert!(is_proxy_for(&chain.code_at(a.address), mastercopy));
        assert_eq!(chain.module_state(a.address), Some(ModuleState::Active(module_params())));
    }

    // =========================================================================
    // CROSS-CHAIN DETERMINISM
    // =========================================================================

    #[tokio::test]
    async fn test_same_addresses_on_every_chain() {
        let mainnet = network(1);
        let gnosis = network(100);

        let on_mainnet = deploy_module(&mainnet, 0xfa).await;
        let on_gnosis = deploy_module(&gnosis, 0xfa).await;

        assert_eq!(on_mainnet, on_gnosis);
        assert_ne!(mainnet.chain_id().await.unwrap(), gnosis.chain_id().await.unwrap());
    }

    // =========================================================================
    // ARTIFACTS
    // =========================================================================

    #[tokio::test]
    async fn test_records_redeploy_on_a_fresh_chain() {
        let dir = tempfile::tempdir().unwrap();
        let file_config = DeployerConfig {
            artifacts_path: dir.path().join("mastercopies.json"),
            ..config()
        };

        let source = network(1);
        let extractor = MastercopyRegistry::new(
            source.clone(),
            Arc::new(JsonArtifactStore::from_config(&file_config)),
            file_config.clone(),
        );
        for (version, salt) in [("1.0.0", Hash::ZERO), ("1.1.0", Hash::new([1u8; 32]))] {
            let record = extractor
                .extract_mastercopy(
                    "ConnextModule",
                    version,
                    Some("contracts/ConnextModule.sol"),
                    module_bytecode(),
                    ModuleParams::placeholder().constructor_args(),
                    salt,
                )
                .await
                .unwrap();
            check_record_reproducible(&record).unwrap();
        }

        // a different chain, reading the same file
        let target = network(100);
        let deployer = MastercopyRegistry::new(
            target.clone(),
            Arc::new(JsonArtifactStore::from_config(&file_config)),
            file_config.clone(),
        );
        let deployed = deployer.deploy_all_recorded().await.unwrap();
        assert_eq!(deployed.len(), 2);

        let latest = deployer.read_mastercopy_record("ConnextModule", None).await.unwrap();
        assert_eq!(latest.version, "1.1.0");
        assert_eq!(deployed[1].outcome.address, latest.address);
        assert_eq!(deployed[0].outcome.address, extractor.derive_address(&mastercopy_spec()));
        assert!(deployed.iter().all(|d| !target.code_at(d.outcome.address).is_empty()));

        // extraction never touched the source chain
        assert_eq!(source.transaction_count(), 0);
    }

    #[tokio::test]
    async fn test_conflicting_record_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(JsonArtifactStore::new(dir.path().join("mastercopies.json")));
        let registry = MastercopyRegistry::new(network(1), store, config());

        let record = registry
            .extract_mastercopy(
                "ConnextModule",
                "1.0.0",
                None,
                module_bytecode(),
                ModuleParams::placeholder().constructor_args(),
                Hash::ZERO,
            )
            .await
            .unwrap();

        let mut changed = record.clone();
        changed.salt = Hash::new([9u8; 32]);
        changed.address = changed.deployment_spec().unwrap().derive_address(changed.factory);

        let err = registry.write_mastercopy_record(changed).await.unwrap_err();
        assert!(err.to_string().contains("duplicate version ConnextModule@1.0.0"), "{err}");
        assert_eq!(
            registry.read_mastercopy_record("ConnextModule", Some("1.0.0")).await.unwrap(),
            record
        );
    }

    // =========================================================================
    // FACTORIES AND RAW DEPLOYMENT
    // =========================================================================

    #[tokio::test]
    async fn test_self_deployed_proxy_factory() {
        let chain = network(31337);
        let registry = registry(&chain);

        let factory = registry
            .deploy_factories(&Bytes::from_slice(&PROXY_FACTORY_BYTECODE))
            .await
            .unwrap();
        assert!(!factory.noop);
        let mastercopy = registry.deploy_mastercopy(&mastercopy_spec()).await.unwrap().address;

        let mut config = config();
        config.module_proxy_factory = factory.address;
        let proxies = ProxyFactory::new(chain.clone(), config);
        let spec = ProxySetupSpec::for_module(mastercopy, &module_params(), U256::from(0xfa));
        let proxy = proxies.deploy_proxy(&spec).await.unwrap();

        assert_eq!(proxy.address, spec.predict(factory.address));
        assert_ne!(proxy.address, proxy_factory(&chain).predict_proxy_address(&spec));

        wire_module(&chain, proxy.address, 10);
        let receipt = relay(
            &chain,
            CONNEXT,
            proxy.address,
            &relay_message(ORIGIN, ORIGIN_SENDER, 10, push_counter()),
        );
        assert!(receipt.is_success());
        assert_eq!(chain.counter_pushes(COUNTER), 1);
    }

    #[tokio::test]
    async fn test_raw_deployment_of_configured_module() {
        let chain = network(31337);
        let registry = registry(&chain);
        let nonce = chain.get_nonce(DEPLOYER).await.unwrap();

        let outcome = registry
            .deploy_raw(&module_bytecode(), &module_params().constructor_args())
            .await
            .unwrap();
        assert_eq!(outcome.address, compute_contract_address(DEPLOYER, nonce));
        assert_eq!(chain.module_state(outcome.address), Some(ModuleState::Active(module_params())));

        wire_module(&chain, outcome.address, 50);
        let receipt = relay(
            &chain,
            CONNEXT,
            outcome.address,
            &relay_message(ORIGIN, ORIGIN_SENDER, 50, push_counter()),
        );
        assert!(receipt.is_success());
        assert_eq!(chain.token_balance(TOKEN, AVATAR), U256::from(50));

        let stats = registry.stats().await;
        assert_eq!(stats.transactions_submitted, 1);
        assert_eq!(stats.contracts_created, 1);
    }
}
