//! # Domain Invariants
//!
//! Checks that must hold around every deployment:
//!
//! - A recorded mastercopy still derives its recorded address.
//! - A deployed proxy is a minimal proxy for the requested mastercopy.
//! - Record versions are ordered by semantic version, not lexically.

use crate::domain::entities::MastercopyRecord;
use crate::domain::services::minimal_proxy_implementation;
use crate::domain::value_objects::{Address, Bytes};
use crate::errors::DeploymentError;
use std::cmp::Ordering;

/// Recomputes the record's address behind its own factory.
///
/// # Errors
///
/// `AddressMismatch` when the record no longer reproduces, `Abi` when its
/// constructor arguments do not encode.
pub fn check_record_reproducible(record: &MastercopyRecord) -> Result<(), DeploymentError> {
    let derived = record.deployment_spec()?.derive_address(record.factory);
    if derived != record.address {
        return Err(DeploymentError::AddressMismatch {
            expected: record.address,
            actual: derived,
        });
    }
    Ok(())
}

/// True when `code` is the minimal proxy runtime delegating to `mastercopy`.
#[must_use]
pub fn is_proxy_for(code: &Bytes, mastercopy: Address) -> bool {
    minimal_proxy_implementation(code.as_slice()) == Some(mastercopy)
}

/// Dotted numeric components of a version string; a `v` prefix and any
/// pre-release or build suffix are ignored.
#[must_use]
pub fn version_key(version: &str) -> Vec<u64> {
    let core = version.trim_start_matches('v');
    let core = core.split(['-', '+']).next().unwrap_or_default();
    core.split('.')
        .map(|part| part.parse::<u64>().unwrap_or(0))
        .collect()
}

/// Semantic ordering, falling back to the raw string on ties.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    version_key(a)
        .cmp(&version_key(b))
        .then_with(|| a.cmp(b))
}
