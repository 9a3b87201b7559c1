//! # In-Memory Chain
//!
//! A deterministic fake network implementing [`NetworkClient`]. It executes
//! the singleton factory, the module proxy factory, relay modules (direct and
//! behind minimal proxies) and the fixtures in [`super::fixtures`].
//!
//! Transactions are serialized behind a mutex. Every call frame runs against
//! a snapshot of the world and is restored on revert, so a failed transaction
//! leaves nothing behind except the sender's nonce bump.
//!
//! Contracts created from a registered [`Blueprint`] keep their creation code
//! as runtime code; proxies get the real EIP-1167 runtime.

use super::fixtures::{fixture_code, Blueprint, Contract, Counter, TestAvatar, TestToken};
use crate::domain::abi::{
    IAvatar, IConnextModule, ICounter, IERC20, IModuleProxyFactory, ISingletonFactory, SolCall,
    SolInterface,
};
use crate::domain::entities::{
    Instruction, Log, ModuleParams, Operation, Receipt, ReceiptStatus, RelayMessage, TransactionIntent,
};
use crate::domain::relay::{ModuleState, RelayModule};
use crate::domain::services::{
    compute_contract_address, derive_address_from_init_code, keccak256, minimal_proxy_init_code,
    minimal_proxy_runtime_code, proxy_salt,
};
use crate::domain::value_objects::{from_sol_u256, to_sol_u256, Address, Bytes, Hash, U256};
use crate::errors::{ModuleError, NetworkError};
use crate::events::{module_proxy_creation_log, sol_log, ModuleEvent};
use crate::ports::outbound::{ModuleExecutor, NetworkClient};
use alloy_primitives::Address as SolAddress;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use tracing::{debug, warn};

type CallResult = Result<Vec<u8>, String>;

// =============================================================================
// WORLD STATE
// =============================================================================

#[derive(Clone, Debug)]
struct Account {
    code: Bytes,
    contract: Contract,
}

#[derive(Clone, Debug, Default)]
struct World {
    accounts: HashMap<Address, Account>,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    /// Logs of the running transaction.
    logs: Vec<Log>,
    /// Last contract created by the running transaction.
    created: Option<Address>,
}

impl World {
    fn has_code(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .is_some_and(|a| !a.code.is_empty())
    }

    fn is_occupied(&self, address: Address) -> bool {
        self.has_code(address) || self.nonces.get(&address).copied().unwrap_or(0) > 0
    }
}

#[derive(Default)]
struct ChainState {
    world: World,
    blueprints: Vec<(Bytes, Blueprint)>,
    receipts: HashMap<Hash, Receipt>,
}

impl ChainState {
    fn execute(&mut self, intent: &TransactionIntent) -> (Hash, Receipt) {
        let nonce = self.world.nonces.get(&intent.from).copied().unwrap_or(0);
        self.world.nonces.insert(intent.from, nonce + 1);
        self.world.logs.clear();
        self.world.created = None;

        let mut preimage = intent.from.as_bytes().to_vec();
        preimage.extend_from_slice(&nonce.to_be_bytes());
        preimage.extend_from_slice(intent.data.as_slice());
        let hash = keccak256(&preimage);

        let mut machine = Machine {
            blueprints: &self.blueprints,
            world: &mut self.world,
        };
        let result = match intent.to {
            Some(to) => machine
                .call(intent.from, to, intent.value, intent.data.as_slice())
                .map(|_| ()),
            None => {
                let address = compute_contract_address(intent.from, nonce);
                machine.create_with_value(intent.from, address, intent.value, intent.data.as_slice())
            }
        };

        let receipt = match result {
            Ok(()) => Receipt {
                transaction_hash: hash,
                status: ReceiptStatus::Success,
                logs: std::mem::take(&mut self.world.logs),
                created_address: self.world.created.take(),
                revert_reason: None,
            },
            Err(reason) => {
                debug!(tx = ?hash, %reason, "transaction reverted");
                self.world.logs.clear();
                self.world.created = None;
                Receipt {
                    transaction_hash: hash,
                    status: ReceiptStatus::Reverted,
                    logs: Vec::new(),
                    created_address: None,
                    revert_reason: Some(reason),
                }
            }
        };
        (hash, receipt)
    }
}

// =============================================================================
// EXECUTION
// =============================================================================

struct Machine<'a> {
    blueprints: &'a [(Bytes, Blueprint)],
    world: &'a mut World,
}

impl Machine<'_> {
    /// Runs one call frame, restoring the world if it reverts.
    fn call(&mut self, caller: Address, to: Address, value: U256, data: &[u8]) -> CallResult {
        let snapshot = self.world.clone();
        let result = self
            .transfer_value(caller, to, value)
            .and_then(|()| self.dispatch(caller, to, data));
        if result.is_err() {
            *self.world = snapshot;
        }
        result
    }

    fn create_with_value(
        &mut self,
        creator: Address,
        address: Address,
        value: U256,
        init_code: &[u8],
    ) -> Result<(), String> {
        let snapshot = self.world.clone();
        let result = self
            .transfer_value(creator, address, value)
            .and_then(|()| self.create(address, init_code));
        if result.is_err() {
            *self.world = snapshot;
        }
        result
    }

    /// Instantiates `init_code` at `address`. Fails on collision or when the
    /// constructor rejects its arguments.
    fn create(&mut self, address: Address, init_code: &[u8]) -> Result<(), String> {
        if self.world.is_occupied(address) {
            return Err(format!("address collision at {address:?}"));
        }
        self.world.nonces.insert(address, 1);
        if init_code.is_empty() {
            return Ok(());
        }

        let blueprints = self.blueprints;
        let blueprint = blueprints
            .iter()
            .filter(|(code, _)| init_code.starts_with(code.as_slice()))
            .max_by_key(|(code, _)| code.len());

        let contract = match blueprint {
            Some((code, Blueprint::RelayModule)) => {
                let params = ModuleParams::decode(&init_code[code.len()..])
                    .map_err(|e| format!("constructor: {e}"))?;
                let (module, events) = RelayModule::construct(params);
                self.emit(address, &events);
                Contract::RelayModule(module)
            }
            Some((_, Blueprint::ModuleProxyFactory)) => Contract::ModuleProxyFactory,
            Some((_, Blueprint::Counter)) => Contract::Counter(Counter::default()),
            None => Contract::Opaque,
        };

        self.world.accounts.insert(
            address,
            Account {
                code: Bytes::from_slice(init_code),
                contract,
            },
        );
        self.world.created = Some(address);
        Ok(())
    }

    fn transfer_value(&mut self, from: Address, to: Address, value: U256) -> Result<(), String> {
        if value.is_zero() {
            return Ok(());
        }
        let available = self.world.balances.get(&from).copied().unwrap_or_default();
        if available < value {
            return Err("insufficient balance for value transfer".to_string());
        }
        self.world.balances.insert(from, available - value);
        let credited = self.world.balances.get(&to).copied().unwrap_or_default() + value;
        self.world.balances.insert(to, credited);
        Ok(())
    }

    fn emit(&mut self, emitter: Address, events: &[ModuleEvent]) {
        self.world
            .logs
            .extend(events.iter().map(|e| e.to_log(emitter)));
    }

    fn set_contract(&mut self, address: Address, contract: Contract) {
        if let Some(account) = self.world.accounts.get_mut(&address) {
            account.contract = contract;
        }
    }

    fn dispatch(&mut self, caller: Address, to: Address, data: &[u8]) -> CallResult {
        let Some(account) = self.world.accounts.get(&to) else {
            // plain account
            return Ok(Vec::new());
        };
        let contract = account.contract.clone();

        match contract {
            Contract::SingletonFactory => self.singleton_factory(to, decode_calls(data)?),
            Contract::ModuleProxyFactory => self.module_proxy_factory(to, decode_calls(data)?),
            Contract::RelayModule(module) => {
                self.relay_module(to, module, caller, decode_calls(data)?)
            }
            Contract::ModuleProxy {
                implementation,
                storage,
            } => {
                let is_module = matches!(
                    self.world.accounts.get(&implementation).map(|a| &a.contract),
                    Some(Contract::RelayModule(_))
                );
                if !is_module {
                    return Err("delegatecall target is not a module".to_string());
                }
                self.relay_module(to, storage, caller, decode_calls(data)?)
            }
            Contract::Avatar(avatar) => self.avatar(to, avatar, caller, decode_calls(data)?),
            Contract::Counter(counter) => self.counter(to, counter, caller, decode_calls(data)?),
            Contract::Token(token) => self.token(to, token, caller, decode_calls(data)?),
            Contract::Opaque => Err("function selector was not recognized".to_string()),
        }
    }

    // =========================================================================
    // FACTORIES
    // =========================================================================

    /// ERC-2470 `deploy(bytes,bytes32)`: returns the zero address instead of
    /// reverting when creation fails.
    fn singleton_factory(&mut self, this: Address, call: ISingletonFactory::ISingletonFactoryCalls) -> CallResult {
        let ISingletonFactory::ISingletonFactoryCalls::deploy(call) = call;
        let address = derive_address_from_init_code(this, call.salt.into(), &call.initCode);

        let snapshot = self.world.clone();
        let created = match self.create(address, &call.initCode) {
            Ok(()) if self.world.has_code(address) => address,
            Ok(()) => Address::ZERO,
            Err(reason) => {
                warn!(%reason, "create2 failed");
                *self.world = snapshot;
                Address::ZERO
            }
        };
        Ok(ISingletonFactory::deployCall::abi_encode_returns(&(SolAddress::from(created),)))
    }

    /// `deployModule(address,bytes,uint256)`: create proxy, then set it up.
    fn module_proxy_factory(
        &mut self,
        this: Address,
        call: IModuleProxyFactory::IModuleProxyFactoryCalls,
    ) -> CallResult {
        let IModuleProxyFactory::IModuleProxyFactoryCalls::deployModule(call) = call;
        let mastercopy = Address::from(call.masterCopy);

        if !self.world.has_code(mastercopy) {
            return Err(format!("TargetHasNoCode({mastercopy:?})"));
        }
        let salt = proxy_salt(&call.initializer, from_sol_u256(call.saltNonce));
        let proxy = derive_address_from_init_code(this, salt, &minimal_proxy_init_code(mastercopy));
        if self.world.is_occupied(proxy) {
            return Err(format!("TakenAddress({proxy:?})"));
        }

        self.world.nonces.insert(proxy, 1);
        self.world.accounts.insert(
            proxy,
            Account {
                code: Bytes::from_vec(minimal_proxy_runtime_code(mastercopy)),
                contract: Contract::ModuleProxy {
                    implementation: mastercopy,
                    storage: RelayModule::uninitialized(),
                },
            },
        );
        self.world.created = Some(proxy);

        self.call(this, proxy, U256::zero(), &call.initializer)
            .map_err(|reason| format!("FailedInitialization: {reason}"))?;

        self.world
            .logs
            .push(module_proxy_creation_log(this, proxy, mastercopy));
        Ok(IModuleProxyFactory::deployModuleCall::abi_encode_returns(&(SolAddress::from(proxy),)))
    }

    // =========================================================================
    // RELAY MODULE
    // =========================================================================

    fn store_module(&mut self, address: Address, module: RelayModule) {
        if let Some(account) = self.world.accounts.get_mut(&address) {
            match &mut account.contract {
                Contract::RelayModule(stored) | Contract::ModuleProxy { storage: stored, .. } => {
                    *stored = module;
                }
                _ => {}
            }
        }
    }

    fn relay_module(
        &mut self,
        this: Address,
        mut module: RelayModule,
        caller: Address,
        call: IConnextModule::IConnextModuleCalls,
    ) -> CallResult {
        use IConnextModule::IConnextModuleCalls as Call;

        let config = module.config().copied().unwrap_or(ModuleParams {
            owner: Address::ZERO,
            avatar: Address::ZERO,
            target: Address::ZERO,
            origin_sender: Address::ZERO,
            origin: 0,
            connext: Address::ZERO,
        });
        let event = match call {
            Call::xReceive(call) => {
                let message = RelayMessage::from(call);
                let mut context = ModuleContext {
                    machine: self,
                    module: this,
                };
                let ret = module
                    .receive_message(caller, &message, &mut context)
                    .map_err(|e| e.to_string())?;
                return Ok(IConnextModule::xReceiveCall::abi_encode_returns(&(
                    alloy_primitives::Bytes::from(ret),
                )));
            }
            Call::setUp(call) => {
                let params = ModuleParams::decode(&call.initParams).map_err(|e| e.to_string())?;
                let events = module.set_up(params).map_err(|e| e.to_string())?;
                self.emit(this, &events);
                self.store_module(this, module);
                return Ok(Vec::new());
            }
            Call::owner(_) => return Ok(address_return(config.owner)),
            Call::avatar(_) => return Ok(address_return(config.avatar)),
            Call::target(_) => return Ok(address_return(config.target)),
            Call::originSender(_) => return Ok(address_return(config.origin_sender)),
            Call::connext(_) => return Ok(address_return(config.connext)),
            Call::origin(_) => {
                return Ok(IConnextModule::originCall::abi_encode_returns(&(config.origin,)))
            }
            Call::setOrigin(call) => module.set_origin(caller, call.origin),
            Call::setOriginSender(call) => module.set_origin_sender(caller, call.originSender.into()),
            Call::setConnext(call) => module.set_connext(caller, call.connext.into()),
            Call::setAvatar(call) => module.set_avatar(caller, call.avatar.into()),
            Call::setTarget(call) => module.set_target(caller, call.target.into()),
            Call::transferOwnership(call) => module.transfer_ownership(caller, call.newOwner.into()),
        }
        .map_err(|e| e.to_string())?;

        self.emit(this, &[event]);
        self.store_module(this, module);
        Ok(Vec::new())
    }

    // =========================================================================
    // FIXTURES
    // =========================================================================

    fn avatar(
        &mut self,
        this: Address,
        mut avatar: TestAvatar,
        caller: Address,
        call: IAvatar::IAvatarCalls,
    ) -> CallResult {
        let call = match call {
            IAvatar::IAvatarCalls::enableModule(call) => {
                avatar.modules.insert(call.module.into());
                self.set_contract(this, Contract::Avatar(avatar));
                return Ok(Vec::new());
            }
            IAvatar::IAvatarCalls::execTransactionFromModuleReturnData(call) => call,
        };
        if !avatar.modules.contains(&caller) {
            return Err("Not authorized".to_string());
        }

        let operation = Operation::try_from(call.operation).map_err(|e| e.to_string())?;
        let (success, data) = if operation == Operation::DelegateCall {
            (false, b"delegatecall not supported".to_vec())
        } else {
            match self.call(this, call.to.into(), from_sol_u256(call.value), &call.data) {
                Ok(ret) => (true, ret),
                Err(reason) => (false, reason.into_bytes()),
            }
        };
        Ok(IAvatar::execTransactionFromModuleReturnDataCall::abi_encode_returns(&(
            success,
            alloy_primitives::Bytes::from(data),
        )))
    }

    fn counter(
        &mut self,
        this: Address,
        mut counter: Counter,
        caller: Address,
        call: ICounter::ICounterCalls,
    ) -> CallResult {
        if let ICounter::ICounterCalls::pushes(_) = call {
            return Ok(ICounter::pushesCall::abi_encode_returns(&(to_sol_u256(U256::from(
                counter.pushes,
            )),)));
        }
        if counter.owner.is_some_and(|owner| owner != caller) {
            return Err("Ownable: caller is not the owner".to_string());
        }
        counter.pushes += 1;
        counter.last_pusher = Some(caller);
        self.set_contract(this, Contract::Counter(counter));
        self.world.logs.push(sol_log(
            this,
            &ICounter::ButtonPushed {
                pusher: caller.into(),
            },
        ));
        Ok(Vec::new())
    }

    fn token(
        &mut self,
        this: Address,
        mut token: TestToken,
        caller: Address,
        call: IERC20::IERC20Calls,
    ) -> CallResult {
        let call = match call {
            IERC20::IERC20Calls::balanceOf(call) => {
                let balance = token.balance_of(call.account.into());
                return Ok(IERC20::balanceOfCall::abi_encode_returns(&(to_sol_u256(balance),)));
            }
            IERC20::IERC20Calls::transfer(call) => call,
        };
        if token.frozen {
            return Ok(IERC20::transferCall::abi_encode_returns(&(false,)));
        }
        token.transfer(caller, call.to.into(), from_sol_u256(call.amount))?;
        self.set_contract(this, Contract::Token(token));
        Ok(IERC20::transferCall::abi_encode_returns(&(true,)))
    }
}

fn decode_calls<C: SolInterface>(data: &[u8]) -> Result<C, String> {
    C::abi_decode(data, true).map_err(|e| e.to_string())
}

fn address_return(address: Address) -> Vec<u8> {
    IConnextModule::ownerCall::abi_encode_returns(&(SolAddress::from(address),))
}

// =============================================================================
// MODULE EXECUTOR
// =============================================================================

/// Executes a module's outgoing calls inside the running transaction.
struct ModuleContext<'m, 'a> {
    machine: &'m mut Machine<'a>,
    module: Address,
}

impl ModuleExecutor for ModuleContext<'_, '_> {
    /// `safeTransfer` semantics: the asset must have code, and a returned
    /// boolean must be `true`. Tokens that return nothing are accepted.
    fn transfer_asset(
        &mut self,
        asset: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), ModuleError> {
        if !self.machine.world.has_code(asset) {
            return Err(ModuleError::ExecutionFailed {
                reason: format!("asset {asset} has no code"),
            });
        }
        let data = IERC20::transferCall {
            to: to.into(),
            amount: to_sol_u256(amount),
        }
        .abi_encode();
        let ret = self
            .machine
            .call(self.module, asset, U256::zero(), &data)
            .map_err(|reason| ModuleError::ExecutionFailed { reason })?;
        if ret.is_empty() {
            return Ok(());
        }
        let accepted = IERC20::transferCall::abi_decode_returns(&ret, true)
            .map(|ret| ret.success)
            .unwrap_or(false);
        if accepted {
            Ok(())
        } else {
            Err(ModuleError::ExecutionFailed {
                reason: format!("asset {asset} transfer returned false"),
            })
        }
    }

    fn exec_transaction_from_module(
        &mut self,
        target: Address,
        instruction: &Instruction,
    ) -> Result<Bytes, ModuleError> {
        let data = IAvatar::execTransactionFromModuleReturnDataCall {
            to: instruction.to.into(),
            value: to_sol_u256(instruction.value),
            data: instruction.data.clone().into(),
            operation: instruction.operation as u8,
        }
        .abi_encode();

        let ret = self
            .machine
            .call(self.module, target, U256::zero(), &data)
            .map_err(|reason| ModuleError::ExecutionFailed { reason })?;
        let ret = IAvatar::execTransactionFromModuleReturnDataCall::abi_decode_returns(&ret, true)
            .map_err(|e| ModuleError::ExecutionFailed {
                reason: format!("unexpected return data: {e}"),
            })?;
        if ret.success {
            Ok(ret.returnData.into())
        } else {
            Err(ModuleError::ExecutionFailed {
                reason: format!(
                    "Module transaction failed: {}",
                    String::from_utf8_lossy(&ret.returnData)
                ),
            })
        }
    }
}

// =============================================================================
// IN-MEMORY CHAIN
// =============================================================================

/// Fake network for tests and dry runs.
pub struct InMemoryChain {
    chain_id: u64,
    state: Mutex<ChainState>,
}

impl InMemoryChain {
    /// Empty chain with the given id.
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            state: Mutex::new(ChainState::default()),
        }
    }

    /// Executes `intent` synchronously and returns its receipt.
    pub fn execute(&self, intent: &TransactionIntent) -> Receipt {
        let mut state = self.state.lock();
        let (hash, receipt) = state.execute(intent);
        state.receipts.insert(hash, receipt.clone());
        receipt
    }

    /// Makes creation code recognisable: deployments whose init code starts
    /// with `bytecode` become contracts of this kind.
    pub fn register_blueprint(&self, bytecode: &Bytes, blueprint: Blueprint) {
        self.state
            .lock()
            .blueprints
            .push((bytecode.clone(), blueprint));
    }

    fn install(&self, address: Address, code: Bytes, contract: Contract) {
        let mut state = self.state.lock();
        state.world.nonces.insert(address, 1);
        state
            .world
            .accounts
            .insert(address, Account { code, contract });
    }

    /// Puts an ERC-2470 factory at `address` (normally pre-deployed on a network).
    pub fn install_singleton_factory(&self, address: Address) {
        self.install(address, fixture_code("SingletonFactory"), Contract::SingletonFactory);
    }

    pub fn install_module_proxy_factory(&self, address: Address) {
        self.install(
            address,
            fixture_code("ModuleProxyFactory"),
            Contract::ModuleProxyFactory,
        );
    }

    pub fn install_avatar(&self, address: Address) {
        self.install(
            address,
            fixture_code("TestAvatar"),
            Contract::Avatar(TestAvatar::default()),
        );
    }

    /// Counter whose `push()` only `owner` may call, when set.
    pub fn install_counter(&self, address: Address, owner: Option<Address>) {
        self.install(
            address,
            fixture_code("Counter"),
            Contract::Counter(Counter {
                owner,
                ..Counter::default()
            }),
        );
    }

    pub fn install_token(&self, address: Address, holder: Address, supply: U256) {
        let mut token = TestToken::default();
        token.balances.insert(holder, supply);
        self.install(address, fixture_code("TestToken"), Contract::Token(token));
    }

    /// Makes every later `transfer` on `token` return `false`. False when
    /// `token` is not one.
    pub fn freeze_token(&self, token: Address) -> bool {
        let mut state = self.state.lock();
        match state.world.accounts.get_mut(&token).map(|a| &mut a.contract) {
            Some(Contract::Token(fixture)) => {
                fixture.frozen = true;
                true
            }
            _ => false,
        }
    }

    /// Arbitrary code with no behaviour.
    pub fn install_code(&self, address: Address, code: Bytes) {
        self.install(address, code, Contract::Opaque);
    }

    /// Native balance credit.
    pub fn fund(&self, address: Address, amount: U256) {
        let mut state = self.state.lock();
        let balance = state.world.balances.get(&address).copied().unwrap_or_default() + amount;
        state.world.balances.insert(address, balance);
    }

    /// Lets `module` execute through `avatar`. False when `avatar` is not one.
    pub fn enable_module(&self, avatar: Address, module: Address) -> bool {
        let mut state = self.state.lock();
        match state.world.accounts.get_mut(&avatar).map(|a| &mut a.contract) {
            Some(Contract::Avatar(fixture)) => {
                fixture.modules.insert(module);
                true
            }
            _ => false,
        }
    }

    // =========================================================================
    // INSPECTION
    // =========================================================================

    /// Code currently at `address`.
    pub fn code_at(&self, address: Address) -> Bytes {
        self.state
            .lock()
            .world
            .accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default()
    }

    /// Module state at `address`, following a proxy to its own storage.
    pub fn module_state(&self, address: Address) -> Option<ModuleState> {
        match self.state.lock().world.accounts.get(&address).map(|a| &a.contract) {
            Some(Contract::RelayModule(module) | Contract::ModuleProxy { storage: module, .. }) => {
                Some(*module.state())
            }
            _ => None,
        }
    }

    pub fn counter_pushes(&self, address: Address) -> u64 {
        match self.state.lock().world.accounts.get(&address).map(|a| &a.contract) {
            Some(Contract::Counter(counter)) => counter.pushes,
            _ => 0,
        }
    }

    pub fn counter_last_pusher(&self, address: Address) -> Option<Address> {
        match self.state.lock().world.accounts.get(&address).map(|a| &a.contract) {
            Some(Contract::Counter(counter)) => counter.last_pusher,
            _ => None,
        }
    }

    pub fn token_balance(&self, token: Address, holder: Address) -> U256 {
        match self.state.lock().world.accounts.get(&token).map(|a| &a.contract) {
            Some(Contract::Token(fixture)) => fixture.balance_of(holder),
            _ => U256::zero(),
        }
    }

    pub fn balance(&self, address: Address) -> U256 {
        self.state
            .lock()
            .world
            .balances
            .get(&address)
            .copied()
            .unwrap_or_default()
    }

    /// Number of transactions executed so far.
    pub fn transaction_count(&self) -> usize {
        self.state.lock().receipts.len()
    }
}

impl Default for InMemoryChain {
    fn default() -> Self {
        Self::new(31337)
    }
}

#[async_trait]
impl NetworkClient for InMemoryChain {
    async fn get_code(&self, address: Address) -> Result<Bytes, NetworkError> {
        Ok(self.code_at(address))
    }

    async fn get_nonce(&self, address: Address) -> Result<u64, NetworkError> {
        Ok(self
            .state
            .lock()
            .world
            .nonces
            .get(&address)
            .copied()
            .unwrap_or(0))
    }

    async fn send_transaction(&self, intent: TransactionIntent) -> Result<Hash, NetworkError> {
        let receipt = self.execute(&intent);
        debug!(
            tx = ?receipt.transaction_hash,
            status = ?receipt.status,
            created = ?receipt.created_address,
            "transaction mined"
        );
        Ok(receipt.transaction_hash)
    }

    async fn wait_for_receipt(&self, hash: Hash) -> Result<Receipt, NetworkError> {
        self.state
            .lock()
            .receipts
            .get(&hash)
            .cloned()
            .ok_or(NetworkError::ReceiptNotFound(hash))
    }

    async fn chain_id(&self) -> Result<u64, NetworkError> {
        Ok(self.chain_id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
