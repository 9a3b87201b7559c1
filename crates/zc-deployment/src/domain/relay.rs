//! # Relay Module
//!
//! Storage and behaviour of one relay module instance: either the mastercopy
//! itself (constructed `Active`) or a proxy's own storage (`Uninitialized`
//! until `set_up`).
//!
//! Dispatch authenticates in a fixed order: relayer, origin domain, origin
//! sender. Only then is the instruction decoded and forwarded.

use crate::domain::entities::{Instruction, ModuleParams, RelayMessage};
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::ModuleError;
use crate::events::ModuleEvent;
use crate::ports::outbound::ModuleExecutor;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Lifecycle of a module instance. `Active` is terminal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleState {
    /// Fresh proxy storage. Every guard fails.
    #[default]
    Uninitialized,
    Active(ModuleParams),
}

impl ModuleState {
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

/// A relay module instance.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RelayModule {
    state: ModuleState,
}

impl RelayModule {
    /// Zero-valued storage as seen through a fresh proxy.
    #[must_use]
    pub fn uninitialized() -> Self {
        Self::default()
    }

    /// Constructor path: active immediately.
    #[must_use]
    pub fn construct(params: ModuleParams) -> (Self, Vec<ModuleEvent>) {
        let mut module = Self::default();
        let events = module.initialize(params);
        (module, events)
    }

    /// One-time initializer for proxy storage.
    ///
    /// # Errors
    ///
    /// `AlreadyInitialized` on any instance that is already active; the
    /// stored configuration is left untouched.
    pub fn set_up(&mut self, params: ModuleParams) -> Result<Vec<ModuleEvent>, ModuleError> {
        if self.state.is_active() {
            return Err(ModuleError::AlreadyInitialized);
        }
        Ok(self.initialize(params))
    }

    fn initialize(&mut self, params: ModuleParams) -> Vec<ModuleEvent> {
        self.state = ModuleState::Active(params);
        vec![
            ModuleEvent::OwnershipTransferred {
                previous_owner: Address::ZERO,
                new_owner: params.owner,
            },
            ModuleEvent::AvatarSet {
                previous_avatar: Address::ZERO,
                new_avatar: params.avatar,
            },
            ModuleEvent::TargetSet {
                previous_target: Address::ZERO,
                new_target: params.target,
            },
            ModuleEvent::ModuleSetUp(params),
        ]
    }

    #[must_use]
    pub fn state(&self) -> &ModuleState {
        &self.state
    }

    /// Current configuration, `None` while uninitialized.
    #[must_use]
    pub fn config(&self) -> Option<&ModuleParams> {
        match &self.state {
            ModuleState::Active(params) => Some(params),
            ModuleState::Uninitialized => None,
        }
    }

    /// Stored values, all zero while uninitialized.
    fn stored(&self) -> ModuleParams {
        self.config().copied().unwrap_or(ModuleParams {
            owner: Address::ZERO,
            avatar: Address::ZERO,
            target: Address::ZERO,
            origin_sender: Address::ZERO,
            origin: 0,
            connext: Address::ZERO,
        })
    }

    // =========================================================================
    // DISPATCH
    // =========================================================================

    /// Checks relayer, origin domain and origin sender, in that order.
    ///
    /// # Errors
    ///
    /// `RelayerOnly`, `OriginOnly` or `OriginSenderOnly` for the first check
    /// that fails. An uninitialized instance always fails the relayer check.
    pub fn authenticate(
        &self,
        caller: Address,
        origin: u32,
        origin_sender: Address,
    ) -> Result<(), ModuleError> {
        let stored = self.stored();
        let active = self.state.is_active();

        if !active || caller != stored.connext {
            return Err(ModuleError::RelayerOnly {
                caller,
                expected: stored.connext,
            });
        }
        if origin != stored.origin {
            return Err(ModuleError::OriginOnly {
                origin,
                expected: stored.origin,
            });
        }
        if origin_sender != stored.origin_sender {
            return Err(ModuleError::OriginSenderOnly {
                sender: origin_sender,
                expected: stored.origin_sender,
            });
        }
        Ok(())
    }

    /// Authenticates `message`, forwards the bridged amount to the avatar and
    /// executes the decoded instruction through the target.
    ///
    /// The executor is expected to discard all effects when this returns an
    /// error.
    ///
    /// # Errors
    ///
    /// Authentication errors from [`Self::authenticate`], `MalformedInstruction`
    /// when the call data does not decode, and `ExecutionFailed` from the
    /// asset transfer or the instruction.
    pub fn receive_message<E: ModuleExecutor + ?Sized>(
        &self,
        caller: Address,
        message: &RelayMessage,
        executor: &mut E,
    ) -> Result<Bytes, ModuleError> {
        self.authenticate(caller, message.origin, message.origin_sender)?;

        let instruction = Instruction::decode(message.call_data.as_slice())
            .map_err(ModuleError::MalformedInstruction)?;
        let stored = self.stored();

        if !message.amount.is_zero() {
            executor.transfer_asset(message.asset, stored.avatar, message.amount)?;
        }

        debug!(
            transfer_id = ?message.transfer_id,
            to = ?instruction.to,
            operation = ?instruction.operation,
            "forwarding relayed instruction"
        );
        executor.exec_transaction_from_module(stored.target, &instruction)
    }

    // =========================================================================
    // OWNER SETTERS
    // =========================================================================

    /// Stored configuration for the owner to mutate. An uninitialized
    /// instance reports a zero owner.
    fn only_owner(&mut self, caller: Address) -> Result<&mut ModuleParams, ModuleError> {
        let owner = self.stored().owner;
        match &mut self.state {
            ModuleState::Active(params) if owner == caller => Ok(params),
            _ => Err(ModuleError::OwnerOnly { caller, owner }),
        }
    }

    /// Owner-only update of the stored origin sender.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn set_origin_sender(
        &mut self,
        caller: Address,
        origin_sender: Address,
    ) -> Result<ModuleEvent, ModuleError> {
        self.only_owner(caller)?.origin_sender = origin_sender;
        Ok(ModuleEvent::OriginSenderSet { origin_sender })
    }

    /// Owner-only update of the stored origin.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn set_origin(&mut self, caller: Address, origin: u32) -> Result<ModuleEvent, ModuleError> {
        self.only_owner(caller)?.origin = origin;
        Ok(ModuleEvent::OriginSet { origin })
    }

    /// Owner-only update of the stored connext.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn set_connext(
        &mut self,
        caller: Address,
        connext: Address,
    ) -> Result<ModuleEvent, ModuleError> {
        self.only_owner(caller)?.connext = connext;
        Ok(ModuleEvent::ConnextSet { connext })
    }

    /// Owner-only update of the stored avatar.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn set_avatar(&mut self, caller: Address, avatar: Address) -> Result<ModuleEvent, ModuleError> {
        let params = self.only_owner(caller)?;
        let previous_avatar = std::mem::replace(&mut params.avatar, avatar);
        Ok(ModuleEvent::AvatarSet {
            previous_avatar,
            new_avatar: avatar,
        })
    }

    /// Owner-only update of the stored target.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn set_target(&mut self, caller: Address, target: Address) -> Result<ModuleEvent, ModuleError> {
        let params = self.only_owner(caller)?;
        let previous_target = std::mem::replace(&mut params.target, target);
        Ok(ModuleEvent::TargetSet {
            previous_target,
            new_target: target,
        })
    }

    /// Hands the owner guard to `new_owner`.
    ///
    /// # Errors
    ///
    /// `OwnerOnly` unless `caller` is the current owner.
    pub fn transfer_ownership(
        &mut self,
        caller: Address,
        new_owner: Address,
    ) -> Result<ModuleEvent, ModuleError> {
        let params = self.only_owner(caller)?;
        let previous_owner = std::mem::replace(&mut params.owner, new_owner);
        Ok(ModuleEvent::OwnershipTransferred {
            previous_owner,
            new_owner,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
