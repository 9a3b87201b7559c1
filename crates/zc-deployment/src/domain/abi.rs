//! # ABI Bindings
//!
//! Solidity interfaces of every contract the deployer, the module and the
//! in-memory chain talk to, generated with `alloy-sol-types`. Calls, returns
//! and events are encoded and decoded through these bindings only.
//!
//! Constructor arguments recorded in artifact files are typed at runtime, so
//! they go through `alloy-dyn-abi` behind the serde-facing [`AbiType`] and
//! [`AbiValue`] wrappers.

use crate::domain::value_objects::{to_sol_u256, Address, Bytes, Hash, U256};
use crate::errors::AbiError;
use alloy_dyn_abi::{DynSolType, DynSolValue};
use alloy_sol_types::{sol, sol_data};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use alloy_sol_types::{SolCall, SolEvent, SolInterface, SolType};

// =============================================================================
// CONTRACT INTERFACES
// =============================================================================

sol! {
    /// ERC-2470 singleton factory. Returns the zero address when creation fails.
    interface ISingletonFactory {
        function deploy(bytes initCode, bytes32 salt) external returns (address createdContract);
    }

    /// Zodiac module proxy factory.
    interface IModuleProxyFactory {
        event ModuleProxyCreation(address indexed proxy, address indexed masterCopy);

        function deployModule(address masterCopy, bytes initializer, uint256 saltNonce)
            external
            returns (address proxy);
    }

    /// The Connext relay module.
    interface IConnextModule {
        event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);
        event AvatarSet(address indexed previousAvatar, address indexed newAvatar);
        event TargetSet(address indexed previousTarget, address indexed newTarget);
        event ModuleSetUp(
            address owner,
            address avatar,
            address target,
            address originSender,
            uint32 origin,
            address connext
        );
        event OriginSenderSet(address originSender);
        event OriginSet(uint32 origin);
        event ConnextSet(address connext);

        function setUp(bytes initParams) external;
        function xReceive(
            bytes32 transferId,
            uint256 amount,
            address asset,
            address originSender,
            uint32 origin,
            bytes callData
        ) external returns (bytes returnData);

        function setOriginSender(address originSender) external;
        function setOrigin(uint32 origin) external;
        function setConnext(address connext) external;
        function setAvatar(address avatar) external;
        function setTarget(address target) external;
        function transferOwnership(address newOwner) external;

        function owner() external view returns (address);
        function avatar() external view returns (address);
        function target() external view returns (address);
        function originSender() external view returns (address);
        function origin() external view returns (uint32);
        function connext() external view returns (address);
    }

    /// Safe-style avatar capability used by enabled modules.
    interface IAvatar {
        function enableModule(address module) external;
        function execTransactionFromModuleReturnData(
            address to,
            uint256 value,
            bytes data,
            uint8 operation
        ) external returns (bool success, bytes returnData);
    }

    /// ERC-20 subset used for bridged asset forwarding.
    interface IERC20 {
        function transfer(address to, uint256 amount) external returns (bool success);
        function balanceOf(address account) external view returns (uint256 balance);
    }

    /// Owned counter used as an instruction target.
    interface ICounter {
        event ButtonPushed(address indexed pusher);

        function push() external;
        function pushes() external view returns (uint256 count);
    }
}

/// `(owner, avatar, target, originSender, origin, connext)` as passed to the
/// constructor and encoded inside `setUp(bytes)`.
pub type ModuleParamsAbi = (
    sol_data::Address,
    sol_data::Address,
    sol_data::Address,
    sol_data::Address,
    sol_data::Uint<32>,
    sol_data::Address,
);

/// `(to, value, data, operation)` carried in a relay message.
pub type InstructionAbi = (
    sol_data::Address,
    sol_data::Uint<256>,
    sol_data::Bytes,
    sol_data::Uint<8>,
);

// =============================================================================
// RUNTIME TYPES
// =============================================================================

/// Solidity type of one recorded constructor argument. Serializes as its
/// canonical type name (`"address"`, `"uint32"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiType(DynSolType);

impl AbiType {
    pub const ADDRESS: Self = Self(DynSolType::Address);
    pub const BOOL: Self = Self(DynSolType::Bool);
    pub const BYTES32: Self = Self(DynSolType::FixedBytes(32));
    pub const BYTES: Self = Self(DynSolType::Bytes);
    pub const STRING: Self = Self(DynSolType::String);

    /// Unsigned integer of `bits` width.
    #[must_use]
    pub const fn uint(bits: usize) -> Self {
        Self(DynSolType::Uint(bits))
    }

    #[must_use]
    pub fn as_sol(&self) -> &DynSolType {
        &self.0
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.sol_type_name())
    }
}

impl FromStr for AbiType {
    type Err = AbiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DynSolType::parse(s)
            .map(Self)
            .map_err(|_| AbiError::UnknownType(s.to_string()))
    }
}

impl Serialize for AbiType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for AbiType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

/// One recorded constructor argument, tagged by kind in artifact JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum AbiValue {
    Address(Address),
    Uint(U256),
    Bool(bool),
    Bytes32(Hash),
    Bytes(Bytes),
    String(String),
}

impl AbiValue {
    #[must_use]
    pub fn uint(value: u64) -> Self {
        Self::Uint(U256::from(value))
    }

    /// The dynamic value for `ty`, or `None` when the kinds disagree or an
    /// integer does not fit the declared width.
    fn to_sol(&self, ty: &DynSolType) -> Option<DynSolValue> {
        match (self, ty) {
            (Self::Address(a), DynSolType::Address) => Some(DynSolValue::Address((*a).into())),
            (Self::Uint(v), DynSolType::Uint(bits)) if v.bits() <= *bits => {
                Some(DynSolValue::Uint(to_sol_u256(*v), *bits))
            }
            (Self::Bool(b), DynSolType::Bool) => Some(DynSolValue::Bool(*b)),
            (Self::Bytes32(h), DynSolType::FixedBytes(32)) => {
                Some(DynSolValue::FixedBytes((*h).into(), 32))
            }
            (Self::Bytes(b), DynSolType::Bytes) => Some(DynSolValue::Bytes(b.as_slice().to_vec())),
            (Self::String(s), DynSolType::String) => Some(DynSolValue::String(s.clone())),
            _ => None,
        }
    }
}

/// `abi.encode(values...)` with each value checked against its type.
///
/// # Errors
///
/// `ArityMismatch` when the lists differ in length, `TypeMismatch` for the
/// first value that does not fit its type.
pub fn encode_params(types: &[AbiType], values: &[AbiValue]) -> Result<Vec<u8>, AbiError> {
    if types.len() != values.len() {
        return Err(AbiError::ArityMismatch {
            types: types.len(),
            values: values.len(),
        });
    }
    let tokens = types
        .iter()
        .zip(values)
        .enumerate()
        .map(|(index, (ty, value))| {
            value.to_sol(ty.as_sol()).ok_or_else(|| AbiError::TypeMismatch {
                index,
                expected: ty.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DynSolValue::Tuple(tokens).abi_encode_params())
}

// =============================================================================
// TESTS
// =============================================================================
