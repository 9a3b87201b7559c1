//! # Error Types
//!
//! All error types for deployment, artifact bookkeeping and relay dispatch.
//!
//! Address-existence checks are never errors: they fold into a `noop` outcome.
//! Everything below is surfaced to the caller verbatim.

use crate::domain::abi::AbiType;
use crate::domain::value_objects::{Address, Hash};
use thiserror::Error;

// =============================================================================
// DEPLOYMENT ERRORS
// =============================================================================

/// Errors from mastercopy and proxy deployment.
#[derive(Debug, Error, Clone)]
pub enum DeploymentError {
    /// The submitted transaction reverted, or no code exists at the target
    /// address after confirmation.
    #[error("deployment failed at {address:?}: {reason}")]
    DeploymentFailed { address: Address, reason: String },

    /// A recorded mastercopy no longer derives the recorded address.
    #[error("address mismatch: recorded {expected:?}, derived {actual:?}")]
    AddressMismatch { expected: Address, actual: Address },

    /// A record was derived behind a different singleton factory than the
    /// one this deployer targets.
    #[error("factory mismatch: recorded {recorded:?}, configured {configured:?}")]
    FactoryMismatch { recorded: Address, configured: Address },

    /// A required factory contract has no code on the target network.
    #[error("factory not deployed at {0:?}")]
    FactoryMissing(Address),

    /// Network adapter failure.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Constructor or setup argument encoding failed.
    #[error("abi error: {0}")]
    Abi(#[from] AbiError),

    /// Artifact store failure.
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),
}

// =============================================================================
// ARTIFACT ERRORS
// =============================================================================

/// Errors from the mastercopy artifact store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// No record for the requested name/version.
    #[error("no mastercopy record for {contract_name}@{}", version.as_deref().unwrap_or("latest"))]
    NotFound {
        contract_name: String,
        version: Option<String>,
    },

    /// The same declared version already derives a different address.
    #[error(
        "duplicate version {contract_name}@{version}: recorded {recorded:?}, attempted {attempted:?}"
    )]
    DuplicateVersion {
        contract_name: String,
        version: String,
        recorded: Address,
        attempted: Address,
    },

    /// Reading or writing the backing file failed.
    #[error("artifact io error: {0}")]
    Io(String),

    /// The backing file could not be parsed or produced.
    #[error("artifact serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// MODULE ERRORS
// =============================================================================

/// Errors raised by the relay module state machine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModuleError {
    /// Setup called on an instance that is already active.
    #[error("module already initialized")]
    AlreadyInitialized,

    /// Dispatch caller is not the trusted relayer.
    #[error("relayer only: caller {caller:?}, expected {expected:?}")]
    RelayerOnly { caller: Address, expected: Address },

    /// Message claims an untrusted origin domain.
    #[error("origin only: got {origin}, expected {expected}")]
    OriginOnly { origin: u32, expected: u32 },

    /// Message claims an untrusted origin sender.
    #[error("origin sender only: got {sender:?}, expected {expected:?}")]
    OriginSenderOnly { sender: Address, expected: Address },

    /// Guarded setter called by someone other than the owner.
    #[error("owner only: caller {caller:?}, owner {owner:?}")]
    OwnerOnly { caller: Address, owner: Address },

    /// Call data does not decode as `(address, uint256, bytes, uint8)`.
    #[error("malformed instruction: {0}")]
    MalformedInstruction(AbiError),

    /// The avatar (or the asset transfer) rejected the forwarded instruction.
    #[error("module transaction failed: {reason}")]
    ExecutionFailed { reason: String },
}

// =============================================================================
// NETWORK ERRORS
// =============================================================================

/// Errors from the network client port.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Node unreachable or returned an unusable response.
    #[error("network unavailable: {0}")]
    Unavailable(String),

    /// No receipt within the configured window.
    #[error("receipt timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Unknown transaction hash.
    #[error("receipt not found for {0:?}")]
    ReceiptNotFound(Hash),

    /// Submission rejected before inclusion.
    #[error("transaction rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// ABI ERRORS
// =============================================================================

/// Errors from ABI encoding and decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Calldata, return data or parameters are not a valid encoding.
    #[error("abi decoding failed: {0}")]
    Decode(String),

    /// A decoded value is outside the domain of its field.
    #[error("invalid {ty} value: {reason}")]
    InvalidValue { ty: AbiType, reason: String },

    /// A value does not match its declared type.
    #[error("type mismatch at index {index}: expected {expected}")]
    TypeMismatch { index: usize, expected: AbiType },

    /// Different number of types and values.
    #[error("arity mismatch: {types} types, {values} values")]
    ArityMismatch { types: usize, values: usize },

    /// Unrecognised type name.
    #[error("unknown abi type: {0}")]
    UnknownType(String),
}

impl From<alloy_sol_types::Error> for AbiError {
    fn from(err: alloy_sol_types::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

// =============================================================================
// TESTS
// =============================================================================
