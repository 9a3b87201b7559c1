//! # Deployment Services
//!
//! `MastercopyRegistry` and `ProxyFactory` drive the network port: check for
//! existing code, submit, await the receipt and fold the result into a
//! `DeployOutcome`.
//!
//! ## Outcome folding
//!
//! | Receipt | Code at address afterwards | Outcome |
//! |---------|----------------------------|---------|
//! | success, created the address | present | `noop: false` |
//! | anything else | present | `noop: true` (lost a race) |
//! | anything | absent | `DeploymentFailed` |

pub mod factory;
pub mod registry;

pub use factory::*;
pub use registry::*;

use crate::domain::entities::{DeployOutcome, Receipt, TransactionIntent};
use crate::domain::value_objects::Address;
use crate::errors::{DeploymentError, NetworkError};
use crate::ports::outbound::NetworkClient;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Counters kept by each deployment service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DeploymentStats {
    /// Transactions submitted.
    pub transactions_submitted: u64,
    /// Contracts created by our own transactions.
    pub contracts_created: u64,
    /// Requests that found code already in place.
    pub noops: u64,
    /// Requests that ended in `DeploymentFailed`.
    pub failures: u64,
}

impl DeploymentStats {
    pub(crate) fn record(&mut self, result: &Result<DeployOutcome, DeploymentError>) {
        match result {
            Ok(outcome) if outcome.noop => self.noops += 1,
            Ok(_) => self.contracts_created += 1,
            Err(DeploymentError::DeploymentFailed { .. }) => self.failures += 1,
            Err(_) => {}
        }
    }
}

/// Submits `intent` and waits for its receipt, bounded by `timeout_ms`.
pub(crate) async fn submit_and_confirm<N: NetworkClient + ?Sized>(
    network: &N,
    intent: TransactionIntent,
    timeout_ms: u64,
) -> Result<Receipt, DeploymentError> {
    let hash = network.send_transaction(intent).await?;
    debug!(tx = ?hash, "transaction submitted");

    let receipt = tokio::time::timeout(
        Duration::from_millis(timeout_ms),
        network.wait_for_receipt(hash),
    )
    .await
    .map_err(|_| NetworkError::Timeout { timeout_ms })??;
    Ok(receipt)
}

/// Folds a confirmed receipt and the post-confirmation code check.
pub(crate) fn fold_outcome(
    address: Address,
    receipt: &Receipt,
    code_present: bool,
) -> Result<DeployOutcome, DeploymentError> {
    let created_here = receipt.is_success() && receipt.created_address == Some(address);

    match (code_present, created_here) {
        (true, true) => {
            info!(%address, tx = ?receipt.transaction_hash, "contract deployed");
            Ok(DeployOutcome::created(address, receipt.transaction_hash))
        }
        (true, false) => {
            info!(%address, "contract already deployed by another transaction");
            Ok(DeployOutcome::noop(address, Some(receipt.transaction_hash)))
        }
        (false, _) => {
            let reason = receipt
                .revert_reason
                .clone()
                .unwrap_or_else(|| "no code at address after confirmation".to_string());
            warn!(%address, %reason, "deployment failed");
            Err(DeploymentError::DeploymentFailed { address, reason })
        }
    }
}
