//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the deployment services and the relay module depend on.
//! Adapters implement these traits for a live node, a JSON file or the
//! in-memory chain.

use crate::domain::entities::{Instruction, MastercopyRecord, Receipt, TransactionIntent};
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::{ArtifactError, ModuleError, NetworkError};
use async_trait::async_trait;

// =============================================================================
// NETWORK ACCESS
// =============================================================================

/// Read code, submit transactions and await receipts.
///
/// Signing is the adapter's concern: `send_transaction` takes an unsigned
/// intent and returns the hash of the submitted transaction.
#[async_trait]
pub trait NetworkClient: Send + Sync {
    /// Deployed runtime code at `address` (empty when none).
    async fn get_code(&self, address: Address) -> Result<Bytes, NetworkError>;

    /// Number of transactions sent from `address`.
    async fn get_nonce(&self, address: Address) -> Result<u64, NetworkError>;

    /// Signs and submits a transaction.
    async fn send_transaction(&self, intent: TransactionIntent) -> Result<Hash, NetworkError>;

    /// Waits until the transaction is mined.
    ///
    /// # Returns
    ///
    /// * `Receipt` - both for successful and reverted transactions
    /// * `NetworkError::ReceiptNotFound` - unknown hash
    async fn wait_for_receipt(&self, hash: Hash) -> Result<Receipt, NetworkError>;

    async fn chain_id(&self) -> Result<u64, NetworkError>;
}

// =============================================================================
// ARTIFACT STORAGE
// =============================================================================

/// Append-only store of mastercopy records keyed by (contract name, version).
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Reads a record; `None` version selects the highest semantic version.
    async fn read(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, ArtifactError>;

    /// Writes a record.
    ///
    /// Rewriting an existing (name, version) is accepted only when the address
    /// is unchanged; otherwise `ArtifactError::DuplicateVersion`.
    async fn write(&self, record: MastercopyRecord) -> Result<(), ArtifactError>;

    /// All records, ordered by name then version.
    async fn list(&self) -> Result<Vec<MastercopyRecord>, ArtifactError>;
}

// =============================================================================
// AVATAR CAPABILITY
// =============================================================================

/// What the relay module may do on behalf of its avatar.
///
/// Called synchronously from within a single dispatch; an implementation must
/// roll back everything it did when the dispatch as a whole fails.
pub trait ModuleExecutor {
    /// Moves `amount` of the ERC-20 `asset` held by the module to `to`.
    fn transfer_asset(&mut self, asset: Address, to: Address, amount: U256)
        -> Result<(), ModuleError>;

    /// `target.execTransactionFromModuleReturnData(to, value, data, operation)`.
    fn exec_transaction_from_module(
        &mut self,
        target: Address,
        instruction: &Instruction,
    ) -> Result<Bytes, ModuleError>;
}
