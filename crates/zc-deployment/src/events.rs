//! # Event Schema
//!
//! Events emitted by the relay module and the factories, and their log
//! encoding. Indexed parameters go to topics; the rest is ABI-encoded data.
//!
//! | Event | Emitted by |
//! |-------|------------|
//! | `OwnershipTransferred` | construction, setup, `transfer_ownership` |
//! | `AvatarSet` / `TargetSet` | construction, setup, setters |
//! | `ModuleSetUp` | construction, setup |
//! | `OriginSenderSet` / `OriginSet` / `ConnextSet` | owner setters |
//! | `ModuleProxyCreation` | module proxy factory |

use crate::domain::abi::{IConnextModule, IModuleProxyFactory, SolEvent};
use crate::domain::entities::{Log, ModuleParams};
use crate::domain::value_objects::{Address, Bytes, Hash};
use serde::{Deserialize, Serialize};

/// State changes of a relay module instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleEvent {
    OwnershipTransferred {
        previous_owner: Address,
        new_owner: Address,
    },
    AvatarSet {
        previous_avatar: Address,
        new_avatar: Address,
    },
    TargetSet {
        previous_target: Address,
        new_target: Address,
    },
    ModuleSetUp(ModuleParams),
    OriginSenderSet {
        origin_sender: Address,
    },
    OriginSet {
        origin: u32,
    },
    ConnextSet {
        connext: Address,
    },
}

impl ModuleEvent {
    /// Topic 0 of the emitted log.
    #[must_use]
    pub fn topic(&self) -> Hash {
        let hash = match self {
            Self::OwnershipTransferred { .. } => IConnextModule::OwnershipTransferred::SIGNATURE_HASH,
            Self::AvatarSet { .. } => IConnextModule::AvatarSet::SIGNATURE_HASH,
            Self::TargetSet { .. } => IConnextModule::TargetSet::SIGNATURE_HASH,
            Self::ModuleSetUp(_) => IConnextModule::ModuleSetUp::SIGNATURE_HASH,
            Self::OriginSenderSet { .. } => IConnextModule::OriginSenderSet::SIGNATURE_HASH,
            Self::OriginSet { .. } => IConnextModule::OriginSet::SIGNATURE_HASH,
            Self::ConnextSet { .. } => IConnextModule::ConnextSet::SIGNATURE_HASH,
        };
        hash.into()
    }

    /// Encodes the event as a log emitted by `emitter`.
    #[must_use]
    pub fn to_log(&self, emitter: Address) -> Log {
        match self {
            Self::OwnershipTransferred {
                previous_owner,
                new_owner,
            } => sol_log(
                emitter,
                &IConnextModule::OwnershipTransferred {
                    previousOwner: (*previous_owner).into(),
                    newOwner: (*new_owner).into(),
                },
            ),
            Self::AvatarSet {
                previous_avatar,
                new_avatar,
            } => sol_log(
                emitter,
                &IConnextModule::AvatarSet {
                    previousAvatar: (*previous_avatar).into(),
                    newAvatar: (*new_avatar).into(),
                },
            ),
            Self::TargetSet {
                previous_target,
                new_target,
            } => sol_log(
                emitter,
                &IConnextModule::TargetSet {
                    previousTarget: (*previous_target).into(),
                    newTarget: (*new_target).into(),
                },
            ),
            Self::ModuleSetUp(params) => sol_log(
                emitter,
                &IConnextModule::ModuleSetUp {
                    owner: params.owner.into(),
                    avatar: params.avatar.into(),
                    target: params.target.into(),
                    originSender: params.origin_sender.into(),
                    origin: params.origin,
                    connext: params.connext.into(),
                },
            ),
            Self::OriginSenderSet { origin_sender } => sol_log(
                emitter,
                &IConnextModule::OriginSenderSet {
                    originSender: (*origin_sender).into(),
                },
            ),
            Self::OriginSet { origin } => {
                sol_log(emitter, &IConnextModule::OriginSet { origin: *origin })
            }
            Self::ConnextSet { connext } => sol_log(
                emitter,
                &IConnextModule::ConnextSet {
                    connext: (*connext).into(),
                },
            ),
        }
    }
}

/// `ModuleProxyCreation(address indexed proxy, address indexed masterCopy)`.
#[must_use]
pub fn module_proxy_creation_log(factory: Address, proxy: Address, mastercopy: Address) -> Log {
    sol_log(
        factory,
        &IModuleProxyFactory::ModuleProxyCreation {
            proxy: proxy.into(),
            masterCopy: mastercopy.into(),
        },
    )
}

/// Any bound event as a log emitted by `emitter`.
#[must_use]
pub fn sol_log<E: SolEvent>(emitter: Address, event: &E) -> Log {
    let encoded = event.encode_log_data();
    Log {
        address: emitter,
        topics: encoded.topics().iter().map(|topic| Hash::from(*topic)).collect(),
        data: Bytes::from(encoded.data),
    }
}

/// Left-pads an address into a 32-byte topic.
#[cfg(test)]
pub(crate) fn address_topic(address: Address) -> Hash {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_bytes());
    Hash::new(word)
}
