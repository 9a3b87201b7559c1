//! Shared test world.
//!
//! A chain with both factories, an avatar, a counter owned by the avatar and
//! an ERC-20, plus helpers to deploy the module and relay messages to it.

use std::sync::Arc;
use zc_deployment::adapters::{Blueprint, InMemoryArtifactStore, InMemoryChain};
use zc_deployment::domain::abi::{IAvatar, ICounter, SolCall, IERC20};
use zc_deployment::domain::{to_sol_u256, Receipt, TransactionIntent};
use zc_deployment::prelude::*;
use zc_telemetry::{init_test_logging, log_deploy_event};

pub const DEPLOYER: Address = Address::new([0xde; 20]);
pub const AVATAR: Address = Address::new([0xaa; 20]);
pub const CONNEXT: Address = Address::new([0xcc; 20]);
pub const ORIGIN_SENDER: Address = Address::new([0x05; 20]);
pub const COUNTER: Address = Address::new([0xc0; 20]);
pub const TOKEN: Address = Address::new([0x70; 20]);
pub const ORIGIN: u32 = 1337;
pub const TOKEN_SUPPLY: u64 = 1_000_000;

/// Stand-in creation code of the compiled module.
pub const MODULE_BYTECODE: [u8; 6] = [0x60, 0x80, 0x60, 0x40, 0x52, 0x34];

/// Stand-in creation code of the module proxy factory.
pub const PROXY_FACTORY_BYTECODE: [u8; 6] = [0x60, 0x80, 0x60, 0x40, 0xfa, 0xc7];

pub fn module_bytecode() -> Bytes {
    Bytes::from_slice(&MODULE_BYTECODE)
}

pub fn config() -> DeployerConfig {
    DeployerConfig::default().with_deployer(DEPLOYER)
}

/// Parameters the proxy is set up with.
pub fn module_params() -> ModuleParams {
    ModuleParams {
        owner: DEPLOYER,
        avatar: AVATAR,
        target: AVATAR,
        origin_sender: ORIGIN_SENDER,
        origin: ORIGIN,
        connext: CONNEXT,
    }
}

/// Mastercopy spec: placeholder constructor arguments, salt zero.
pub fn mastercopy_spec() -> DeploymentSpec {
    DeploymentSpec::new(
        Bytes::from_vec(
            [
                MODULE_BYTECODE.as_slice(),
                ModuleParams::placeholder().encode().as_slice(),
            ]
            .concat(),
        ),
        Hash::ZERO,
    )
}

/// Chain with the canonical factories and the fixtures installed.
pub fn network(chain_id: u64) -> Arc<InMemoryChain> {
    init_test_logging();
    let chain = InMemoryChain::new(chain_id);
    let config = config();
    chain.install_singleton_factory(config.singleton_factory);
    chain.install_module_proxy_factory(config.module_proxy_factory);
    chain.register_blueprint(&module_bytecode(), Blueprint::RelayModule);
    chain.register_blueprint(
        &Bytes::from_slice(&PROXY_FACTORY_BYTECODE),
        Blueprint::ModuleProxyFactory,
    );
    chain.install_avatar(AVATAR);
    chain.install_counter(COUNTER, Some(AVATAR));
    chain.install_token(TOKEN, DEPLOYER, U256::from(TOKEN_SUPPLY));
    Arc::new(chain)
}

pub fn registry(chain: &Arc<InMemoryChain>) -> MastercopyRegistry<InMemoryChain, InMemoryArtifactStore> {
    MastercopyRegistry::new(chain.clone(), Arc::new(InMemoryArtifactStore::new()), config())
}

pub fn proxy_factory(chain: &Arc<InMemoryChain>) -> ProxyFactory<InMemoryChain> {
    ProxyFactory::new(chain.clone(), config())
}

/// Deploys the mastercopy and a proxy with [`module_params`] and `salt_nonce`.
/// Returns (mastercopy, proxy).
pub async fn deploy_module(chain: &Arc<InMemoryChain>, salt_nonce: u64) -> (Address, Address) {
    let mastercopy = registry(chain)
        .deploy_mastercopy(&mastercopy_spec())
        .await
        .unwrap()
        .address;
    let spec = ProxySetupSpec::for_module(mastercopy, &module_params(), U256::from(salt_nonce));
    let proxy = proxy_factory(chain).deploy_proxy(&spec).await.unwrap().address;
    log_deploy_event!(debug, "fixtures", "module deployed", proxy, mastercopy = %mastercopy);
    (mastercopy, proxy)
}

/// Sends a transaction from `from` to `to`.
pub fn send(chain: &InMemoryChain, from: Address, to: Address, data: Vec<u8>) -> Receipt {
    chain.execute(&TransactionIntent::call(from, to, data))
}

/// Enables `module` on the avatar and funds it with `amount` tokens.
pub fn wire_module(chain: &InMemoryChain, module: Address, amount: u64) {
    let enable = IAvatar::enableModuleCall {
        module: module.into(),
    };
    assert!(send(chain, DEPLOYER, AVATAR, enable.abi_encode()).is_success());

    let fund = IERC20::transferCall {
        to: module.into(),
        amount: to_sol_u256(U256::from(amount)),
    };
    assert!(send(chain, DEPLOYER, TOKEN, fund.abi_encode()).is_success());
}

/// Instruction that pushes the counter once.
pub fn push_counter() -> Bytes {
    Bytes::from_vec(
        Instruction::call(COUNTER, Bytes::from_vec(ICounter::pushCall {}.abi_encode())).encode(),
    )
}

pub fn relay_message(origin: u32, origin_sender: Address, amount: u64, call_data: Bytes) -> RelayMessage {
    RelayMessage {
        transfer_id: Hash::new([0x11; 32]),
        amount: U256::from(amount),
        asset: TOKEN,
        origin_sender,
        origin,
        call_data,
    }
}

/// `xReceive` on `module`, sent by `relayer`.
pub fn relay(chain: &InMemoryChain, relayer: Address, module: Address, message: &RelayMessage) -> Receipt {
    send(chain, relayer, module, message.encode_call())
}
