//! Contract fixtures hosted by [`InMemoryChain`](super::InMemoryChain).
//!
//! Just enough behaviour to exercise a relay module end to end: an avatar
//! that executes calls for enabled modules, a counter guarded by an owner and
//! a minimal ERC-20.

use crate::domain::relay::RelayModule;
use crate::domain::value_objects::{Address, Bytes, U256};
use std::collections::{HashMap, HashSet};

/// Contract kinds the in-memory chain knows how to execute.
#[derive(Clone, Debug)]
pub enum Contract {
    /// ERC-2470 CREATE2 factory.
    SingletonFactory,
    /// Creates minimal proxies with an atomic setup call.
    ModuleProxyFactory,
    /// A relay module deployed directly (the mastercopy or a raw deployment).
    RelayModule(RelayModule),
    /// Minimal proxy: logic from `implementation`, storage of its own.
    ModuleProxy {
        implementation: Address,
        storage: RelayModule,
    },
    Avatar(TestAvatar),
    Counter(Counter),
    Token(TestToken),
    /// Code with no known behaviour; every call reverts.
    Opaque,
}

/// Creation code the chain recognises when it is deployed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Blueprint {
    /// Constructor arguments decode as `ModuleParams`.
    RelayModule,
    ModuleProxyFactory,
    /// `Counter` with no owner restriction.
    Counter,
}

/// Avatar that lets enabled modules execute calls.
#[derive(Clone, Debug, Default)]
pub struct TestAvatar {
    pub modules: HashSet<Address>,
}

/// Push counter, optionally restricted to an owner.
#[derive(Clone, Debug, Default)]
pub struct Counter {
    pub pushes: u64,
    pub owner: Option<Address>,
    pub last_pusher: Option<Address>,
}

/// Minimal ERC-20.
#[derive(Clone, Debug, Default)]
pub struct TestToken {
    pub balances: HashMap<Address, U256>,
    /// `transfer` returns `false` and moves nothing.
    pub frozen: bool,
}

impl TestToken {
    #[must_use]
    pub fn balance_of(&self, holder: Address) -> U256 {
        self.balances.get(&holder).copied().unwrap_or_default()
    }

    /// Moves `amount` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// The revert reason when `from` holds less than `amount`.
    pub fn transfer(&mut self, from: Address, to: Address, amount: U256) -> Result<(), String> {
        let available = self.balance_of(from);
        if available < amount {
            return Err(format!(
                "ERC20: transfer amount {amount} exceeds balance {available}"
            ));
        }
        self.balances.insert(from, available - amount);
        let credited = self.balance_of(to) + amount;
        self.balances.insert(to, credited);
        Ok(())
    }
}

/// Stand-in runtime code for fixtures installed without a deployment.
#[must_use]
pub fn fixture_code(name: &str) -> Bytes {
    Bytes::from_slice(name.as_bytes())
}
