//! # Core Domain Entities
//!
//! Deployment requests, artifact records, relay messages and the receipts the
//! network hands back.

use crate::domain::abi::{
    self, AbiType, AbiValue, IConnextModule, InstructionAbi, ModuleParamsAbi, SolCall, SolType,
};
use crate::domain::services::{derive_address_from_init_code, keccak256, predict_proxy_address, proxy_salt};
use crate::domain::value_objects::{from_sol_u256, to_sol_u256, Address, Bytes, Hash, U256};
use crate::errors::AbiError;
use serde::{Deserialize, Serialize};

// =============================================================================
// DEPLOYMENT SPEC
// =============================================================================

/// Creation code plus salt for a CREATE2 deployment.
///
/// Identical `init_code` and `salt` derive the same address on every chain
/// that has the factory at the same address.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentSpec {
    /// Creation bytecode followed by encoded constructor arguments.
    pub init_code: Bytes,
    pub salt: Hash,
}

impl DeploymentSpec {
    #[must_use]
    pub fn new(init_code: Bytes, salt: Hash) -> Self {
        Self { init_code, salt }
    }

    /// Concatenates `bytecode` with the encoded constructor arguments.
    ///
    /// # Errors
    ///
    /// Fails when the constructor arguments do not encode.
    pub fn from_parts(
        bytecode: &Bytes,
        constructor_args: &ConstructorArgs,
        salt: Hash,
    ) -> Result<Self, AbiError> {
        let mut init_code = bytecode.as_slice().to_vec();
        init_code.extend_from_slice(&constructor_args.encode()?);
        Ok(Self::new(Bytes::from_vec(init_code), salt))
    }

    #[must_use]
    pub fn init_code_hash(&self) -> Hash {
        keccak256(self.init_code.as_slice())
    }

    /// Address this spec lands on when deployed through `factory`.
    #[must_use]
    pub fn derive_address(&self, factory: Address) -> Address {
        derive_address_from_init_code(factory, self.salt, self.init_code.as_slice())
    }
}

// =============================================================================
// CONSTRUCTOR ARGUMENTS
// =============================================================================

/// Typed constructor argument list, as recorded in artifact files.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstructorArgs {
    pub types: Vec<AbiType>,
    pub values: Vec<AbiValue>,
}

impl ConstructorArgs {
    #[must_use]
    pub fn new(types: Vec<AbiType>, values: Vec<AbiValue>) -> Self {
        Self { types, values }
    }

    /// No constructor arguments.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `abi.encode(values...)`.
    ///
    /// # Errors
    ///
    /// `ArityMismatch` or `TypeMismatch` when the lists disagree.
    pub fn encode(&self) -> Result<Vec<u8>, AbiError> {
        abi::encode_params(&self.types, &self.values)
    }
}

// =============================================================================
// MASTERCOPY RECORD
// =============================================================================

/// Everything needed to reproduce a mastercopy deployment on another chain.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MastercopyRecord {
    pub contract_name: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    pub factory: Address,
    pub address: Address,
    pub bytecode: Bytes,
    pub constructor_args: ConstructorArgs,
    pub salt: Hash,
}

impl MastercopyRecord {
    /// Rebuilds the deployment spec from the recorded parts.
    ///
    /// # Errors
    ///
    /// Fails when the recorded constructor arguments do not encode.
    pub fn deployment_spec(&self) -> Result<DeploymentSpec, AbiError> {
        DeploymentSpec::from_parts(&self.bytecode, &self.constructor_args, self.salt)
    }
}

// =============================================================================
// MODULE PARAMETERS
// =============================================================================

/// Initialization parameters of the relay module, shared by its constructor
/// and `setUp(bytes)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleParams {
    pub owner: Address,
    pub avatar: Address,
    pub target: Address,
    pub origin_sender: Address,
    pub origin: u32,
    /// Trusted relayer.
    pub connext: Address,
}

impl ModuleParams {
    /// ABI layout `(address,address,address,address,uint32,address)`.
    pub const TYPES: [AbiType; 6] = [
        AbiType::ADDRESS,
        AbiType::ADDRESS,
        AbiType::ADDRESS,
        AbiType::ADDRESS,
        AbiType::uint(32),
        AbiType::ADDRESS,
    ];

    /// Argument set used for the mastercopy: every address `0x..01`, origin 0.
    #[must_use]
    pub const fn placeholder() -> Self {
        Self {
            owner: Address::ONE,
            avatar: Address::ONE,
            target: Address::ONE,
            origin_sender: Address::ONE,
            origin: 0,
            connext: Address::ONE,
        }
    }

    #[must_use]
    pub fn to_values(&self) -> Vec<AbiValue> {
        vec![
            AbiValue::Address(self.owner),
            AbiValue::Address(self.avatar),
            AbiValue::Address(self.target),
            AbiValue::Address(self.origin_sender),
            AbiValue::uint(u64::from(self.origin)),
            AbiValue::Address(self.connext),
        ]
    }

    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let value: <ModuleParamsAbi as SolType>::RustType = (
            self.owner.into(),
            self.avatar.into(),
            self.target.into(),
            self.origin_sender.into(),
            self.origin,
            self.connext.into(),
        );
        ModuleParamsAbi::abi_encode_params(&value)
    }

    /// Decodes constructor arguments or `setUp` parameters.
    ///
    /// # Errors
    ///
    /// `Decode` when `data` is not exactly the six-word layout.
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let (owner, avatar, target, origin_sender, origin, connext) =
            ModuleParamsAbi::abi_decode_params(data, true)?;
        Ok(Self {
            owner: owner.into(),
            avatar: avatar.into(),
            target: target.into(),
            origin_sender: origin_sender.into(),
            origin,
            connext: connext.into(),
        })
    }

    #[must_use]
    pub fn constructor_args(&self) -> ConstructorArgs {
        ConstructorArgs::new(Self::TYPES.to_vec(), self.to_values())
    }
}

// =============================================================================
// PROXY SETUP
// =============================================================================

/// A proxy deployment: mastercopy, setup call and salt nonce.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxySetupSpec {
    pub mastercopy: Address,
    /// Full `setUp(bytes)` calldata including the selector.
    pub setup_calldata: Bytes,
    pub salt_nonce: U256,
}

impl ProxySetupSpec {
    #[must_use]
    pub fn new(mastercopy: Address, setup_calldata: Bytes, salt_nonce: U256) -> Self {
        Self {
            mastercopy,
            setup_calldata,
            salt_nonce,
        }
    }

    /// `setUp(abi.encode(params))` against `mastercopy`.
    #[must_use]
    pub fn for_module(mastercopy: Address, params: &ModuleParams, salt_nonce: U256) -> Self {
        Self::new(mastercopy, setup_calldata(&params.encode()), salt_nonce)
    }

    /// `setUp(abi.encode(args))` for any module with a typed argument list.
    ///
    /// # Errors
    ///
    /// Propagates [`ConstructorArgs::encode`] failures.
    pub fn from_setup_args(
        mastercopy: Address,
        args: &ConstructorArgs,
        salt_nonce: U256,
    ) -> Result<Self, AbiError> {
        Ok(Self::new(mastercopy, setup_calldata(&args.encode()?), salt_nonce))
    }

    #[must_use]
    pub fn salt(&self) -> Hash {
        proxy_salt(self.setup_calldata.as_slice(), self.salt_nonce)
    }

    #[must_use]
    pub fn predict(&self, factory: Address) -> Address {
        predict_proxy_address(
            factory,
            self.mastercopy,
            self.setup_calldata.as_slice(),
            self.salt_nonce,
        )
    }
}

fn setup_calldata(init_params: &[u8]) -> Bytes {
    let call = IConnextModule::setUpCall {
        initParams: init_params.to_vec().into(),
    };
    Bytes::from_vec(call.abi_encode())
}

// =============================================================================
// RELAYED INSTRUCTIONS
// =============================================================================

/// How the avatar executes an instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Call = 0,
    DelegateCall = 1,
}

impl TryFrom<u8> for Operation {
    type Error = AbiError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Call),
            1 => Ok(Self::DelegateCall),
            other => Err(AbiError::InvalidValue {
                ty: AbiType::uint(8),
                reason: format!("unknown operation {other}"),
            }),
        }
    }
}

/// Decoded `(to, value, data, operation)` carried in a relay message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub to: Address,
    pub value: U256,
    pub data: Bytes,
    pub operation: Operation,
}

impl Instruction {
    /// A plain call with no value.
    #[must_use]
    pub fn call(to: Address, data: Bytes) -> Self {
        Self {
            to,
            value: U256::zero(),
            data,
            operation: Operation::Call,
        }
    }

    /// `abi.encode(to, value, data, operation)`.
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let value: <InstructionAbi as SolType>::RustType = (
            self.to.into(),
            to_sol_u256(self.value),
            self.data.clone().into(),
            self.operation as u8,
        );
        InstructionAbi::abi_encode_params(&value)
    }

    /// # Errors
    ///
    /// `Decode` for anything but `(address, uint256, bytes, uint8)`, and
    /// `InvalidValue` for an unknown operation.
    pub fn decode(data: &[u8]) -> Result<Self, AbiError> {
        let (to, value, data, operation) = InstructionAbi::abi_decode_params(data, true)?;
        Ok(Self {
            to: to.into(),
            value: from_sol_u256(value),
            data: data.into(),
            operation: Operation::try_from(operation)?,
        })
    }
}

/// Parameters of one `xReceive` invocation by the relayer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    pub transfer_id: Hash,
    pub amount: U256,
    pub asset: Address,
    pub origin_sender: Address,
    pub origin: u32,
    pub call_data: Bytes,
}

impl RelayMessage {
    /// `xReceive(...)` calldata for this message.
    #[must_use]
    pub fn encode_call(&self) -> Vec<u8> {
        IConnextModule::xReceiveCall {
            transferId: self.transfer_id.into(),
            amount: to_sol_u256(self.amount),
            asset: self.asset.into(),
            originSender: self.origin_sender.into(),
            origin: self.origin,
            callData: self.call_data.clone().into(),
        }
        .abi_encode()
    }

    /// Decodes full `xReceive` calldata, selector included.
    ///
    /// # Errors
    ///
    /// `Decode` on a foreign selector or malformed arguments.
    pub fn decode_call(calldata: &[u8]) -> Result<Self, AbiError> {
        Ok(IConnextModule::xReceiveCall::abi_decode(calldata, true)?.into())
    }
}

impl From<IConnextModule::xReceiveCall> for RelayMessage {
    fn from(call: IConnextModule::xReceiveCall) -> Self {
        Self {
            transfer_id: call.transferId.into(),
            amount: from_sol_u256(call.amount),
            asset: call.asset.into(),
            origin_sender: call.originSender.into(),
            origin: call.origin,
            call_data: call.callData.into(),
        }
    }
}

// =============================================================================
// DEPLOYMENT RESULTS
// =============================================================================

/// Result of a mastercopy or proxy deployment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployOutcome {
    pub address: Address,
    /// True when code already existed and nothing new was created.
    pub noop: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transaction_hash: Option<Hash>,
}

impl DeployOutcome {
    #[must_use]
    pub fn created(address: Address, transaction_hash: Hash) -> Self {
        Self {
            address,
            noop: false,
            transaction_hash: Some(transaction_hash),
        }
    }

    #[must_use]
    pub fn noop(address: Address, transaction_hash: Option<Hash>) -> Self {
        Self {
            address,
            noop: true,
            transaction_hash,
        }
    }
}

/// A transaction ready for signing and submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionIntent {
    pub from: Address,
    /// None for contract creation.
    pub to: Option<Address>,
    pub value: U256,
    pub data: Bytes,
}

impl TransactionIntent {
    #[must_use]
    pub fn call(from: Address, to: Address, data: Vec<u8>) -> Self {
        Self {
            from,
            to: Some(to),
            value: U256::zero(),
            data: Bytes::from_vec(data),
        }
    }

    #[must_use]
    pub fn create(from: Address, init_code: Bytes) -> Self {
        Self {
            from,
            to: None,
            value: U256::zero(),
            data: init_code,
        }
    }
}

/// Final status of a mined transaction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Log emitted during execution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
    /// Contract that emitted the log.
    pub address: Address,
    /// Topic 0 is the event signature hash.
    pub topics: Vec<Hash>,
    pub data: Bytes,
}

/// Receipt returned by the network once a transaction is mined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub transaction_hash: Hash,
    pub status: ReceiptStatus,
    pub logs: Vec<Log>,
    /// Last contract created by this transaction, if any.
    #[serde(default)]
    pub created_address: Option<Address>,
    #[serde(default)]
    pub revert_reason: Option<String>,
}

impl Receipt {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == ReceiptStatus::Success
    }

    /// Logs with the given topic 0.
    pub fn logs_with_topic(&self, topic: Hash) -> impl Iterator<Item = &Log> {
        self.logs
            .iter()
            .filter(move |log| log.topics.first() == Some(&topic))
    }
}

// =============================================================================
// TESTS
// =============================================================================
