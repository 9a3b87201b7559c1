//! Deployer configuration from environment variables.

use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// ERC-2470 singleton factory, identical on every chain that has it.
pub const SINGLETON_FACTORY: Address = Address::new([
    0xce, 0x00, 0x42, 0xb8, 0x68, 0x30, 0x00, 0x00, 0xd4, 0x4a, 0x59, 0x00, 0x4d, 0xa5, 0x4a, 0x00,
    0x5f, 0xfd, 0xcf, 0x9f,
]);

/// Canonical module proxy factory address.
pub const MODULE_PROXY_FACTORY: Address = Address::new([
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xad, 0xdb, 0x49, 0x79, 0x5b, 0x0f, 0x9b, 0xa5, 0xbc, 0x29,
    0x8c, 0xdd, 0xa2, 0x36,
]);

/// Default receipt wait.
pub const DEFAULT_RECEIPT_TIMEOUT_MS: u64 = 60_000;

/// Addresses and limits used by the deployment services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployerConfig {
    /// Account that signs and pays for deployments.
    pub deployer: Address,

    /// CREATE2 factory used for mastercopies.
    pub singleton_factory: Address,

    /// Factory that creates module proxies.
    pub module_proxy_factory: Address,

    /// Upper bound on waiting for a receipt
    pub receipt_timeout_ms: u64,

    /// Mastercopy artifact file, opened by `JsonArtifactStore::from_config`.
    pub artifacts_path: PathBuf,
}

impl Default for DeployerConfig {
    fn default() -> Self {
        Self {
            deployer: Address::ZERO,
            singleton_factory: SINGLETON_FACTORY,
            module_proxy_factory: MODULE_PROXY_FACTORY,
            receipt_timeout_ms: DEFAULT_RECEIPT_TIMEOUT_MS,
            artifacts_path: PathBuf::from("mastercopies.json"),
        }
    }
}

impl DeployerConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ZC_DEPLOYER`: Deployer account (default: zero address)
    /// - `ZC_SINGLETON_FACTORY`: CREATE2 factory (default: ERC-2470 address)
    /// - `ZC_MODULE_PROXY_FACTORY`: Proxy factory (default: canonical address)
    /// - `ZC_RECEIPT_TIMEOUT_MS`: Receipt wait in ms (default: 60000)
    /// - `ZC_ARTIFACTS_PATH`: Artifact file (default: mastercopies.json)
    ///
    /// Unparseable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            deployer: env_parsed("ZC_DEPLOYER", defaults.deployer),
            singleton_factory: env_parsed("ZC_SINGLETON_FACTORY", defaults.singleton_factory),
            module_proxy_factory: env_parsed(
                "ZC_MODULE_PROXY_FACTORY",
                defaults.module_proxy_factory,
            ),
            receipt_timeout_ms: env_parsed("ZC_RECEIPT_TIMEOUT_MS", defaults.receipt_timeout_ms),
            artifacts_path: env::var("ZC_ARTIFACTS_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.artifacts_path),
        }
    }

    /// Same config with a different deployer.
    #[must_use]
    pub fn with_deployer(mut self, deployer: Address) -> Self {
        self.deployer = deployer;
        self
    }
}

fn env_parsed<T: FromStr>(key: &str, default: T) -> T {
    parse_or_default(key, env::var(key).ok(), default)
}

/// `raw` parsed as `T`; `default` when absent or unparseable.
fn parse_or_default<T: FromStr>(key: &str, raw: Option<String>, default: T) -> T {
    let Some(raw) = raw else {
        return default;
    };
    match raw.parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable environment value, using default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_factories_are_canonical() {
        let config = DeployerConfig::default();
        assert_eq!(
            config.singleton_factory,
            "0xce0042B868300000d44A59004Da54A005ffdcf9f".parse().unwrap()
        );
        assert_eq!(
            config.module_proxy_factory,
            "0x000000000000aDdB49795b0f9bA5BC298cDda236".parse().unwrap()
        );
    }

    #[test]
    fn test_from_env_overrides() {
        env::set_var("ZC_RECEIPT_TIMEOUT_MS", "1500");
        env::set_var("ZC_DEPLOYER", "0x0000000000000000000000000000000000000001");
        env::set_var("ZC_SINGLETON_FACTORY", "not-an-address");

        let config = DeployerConfig::from_env();
        assert_eq!(config.receipt_timeout_ms, 1500);
        assert_eq!(config.deployer, Address::ONE);
        assert_eq!(config.singleton_factory, SINGLETON_FACTORY);

        env::remove_var("ZC_RECEIPT_TIMEOUT_MS");
        env::remove_var("ZC_DEPLOYER");
        env::remove_var("ZC_SINGLETON_FACTORY");
    }

    #[test]
    fn test_unparseable_values_fall_back() {
        let bad_factory = parse_or_default(
            "ZC_MODULE_PROXY_FACTORY",
            Some("0x1234".to_string()),
            MODULE_PROXY_FACTORY,
        );
        assert_eq!(bad_factory, MODULE_PROXY_FACTORY);

        let good_factory = parse_or_default(
            "ZC_MODULE_PROXY_FACTORY",
            Some("0x0000000000000000000000000000000000000001".to_string()),
            MODULE_PROXY_FACTORY,
        );
        assert_eq!(good_factory, Address::ONE);

        assert_eq!(parse_or_default("ZC_RECEIPT_TIMEOUT_MS", Some("soon".to_string()), 7u64), 7);
        assert_eq!(parse_or_default("ZC_RECEIPT_TIMEOUT_MS", None, 7u64), 7);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: DeployerConfig =
            serde_json::from_str(r#"{"receipt_timeout_ms": 10}"#).unwrap();
        assert_eq!(config.receipt_timeout_ms, 10);
        assert_eq!(config.module_proxy_factory, MODULE_PROXY_FACTORY);
    }
}
