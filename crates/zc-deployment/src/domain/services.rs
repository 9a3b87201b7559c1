//! # Domain Services
//!
//! Pure address-derivation functions used by both the mastercopy registry and
//! the proxy factory. These functions are deterministic and have no side effects.
//!
//! Every derivation here must match the on-chain deployer contracts bit for bit;
//! a deviation yields an address where nothing will ever be deployed.

use crate::domain::value_objects::{Address, Hash, U256};
use sha3::{Digest, Keccak256};

// =============================================================================
// KECCAK256 UTILITY
// =============================================================================

/// Computes keccak256 hash of data.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let hash = Keccak256::digest(data);
    Hash::new(hash.into())
}

/// Four-byte function selector for a canonical signature such as `setUp(bytes)`.
#[must_use]
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    let mut out = [0u8; 4];
    out.copy_from_slice(&hash.0[..4]);
    out
}

/// Topic 0 of an event with the given canonical signature.
#[must_use]
pub fn event_topic(signature: &str) -> Hash {
    keccak256(signature.as_bytes())
}

// =============================================================================
// CONTRACT ADDRESS COMPUTATION
// =============================================================================

/// Computes the contract address for CREATE opcode.
///
/// Address = keccak256(rlp(\[sender, nonce\]))\[12:\]
///
/// Only the raw (non-deterministic) deployment path uses this; it depends on the
/// deployer nonce and is therefore not chain independent.
#[must_use]
pub fn compute_contract_address(sender: Address, nonce: u64) -> Address {
    let mut content = Vec::with_capacity(32);

    // RLP encode address (20 bytes, 0x80 + 20 = 0x94)
    content.push(0x94);
    content.extend_from_slice(sender.as_bytes());

    if nonce == 0 {
        content.push(0x80);
    } else if nonce < 128 {
        content.push(nonce as u8);
    } else {
        let nonce_bytes = trim_leading_zeros(nonce);
        content.push(0x80 + nonce_bytes.len() as u8);
        content.extend_from_slice(&nonce_bytes);
    }

    // Content is at most 30 bytes, always a short list
    let mut rlp_data = Vec::with_capacity(content.len() + 1);
    rlp_data.push(0xc0 + content.len() as u8);
    rlp_data.extend_from_slice(&content);

    let hash = Keccak256::digest(&rlp_data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

/// Derives the CREATE2 address for an init code hash.
///
/// Address = keccak256(0xff ++ factory ++ salt ++ `init_code_hash`)\[12:\]
///
/// Per EIP-1014.
#[must_use]
pub fn derive_address(factory: Address, salt: Hash, init_code_hash: Hash) -> Address {
    let mut data = Vec::with_capacity(85);
    data.push(0xff);
    data.extend_from_slice(factory.as_bytes());
    data.extend_from_slice(salt.as_bytes());
    data.extend_from_slice(init_code_hash.as_bytes());

    let hash = Keccak256::digest(&data);
    let mut addr = [0u8; 20];
    addr.copy_from_slice(&hash[12..32]);
    Address::new(addr)
}

/// Derives the CREATE2 address directly from init code.
#[must_use]
pub fn derive_address_from_init_code(factory: Address, salt: Hash, init_code: &[u8]) -> Address {
    derive_address(factory, salt, keccak256(init_code))
}

fn trim_leading_zeros(value: u64) -> Vec<u8> {
    let bytes = value.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(7);
    bytes[start..].to_vec()
}

// =============================================================================
// MINIMAL PROXY (EIP-1167)
// =============================================================================

/// Creation prefix used by the module proxy factory.
const PROXY_CREATION_PREFIX: [u8; 9] = [0x60, 0x2d, 0x80, 0x60, 0x09, 0x3d, 0x39, 0x3d, 0xf3];

/// Runtime code before the implementation address.
const PROXY_RUNTIME_PREFIX: [u8; 10] = [0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];

/// Runtime code after the implementation address.
const PROXY_RUNTIME_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];

/// Length of the minimal proxy runtime code (0x2d).
pub const PROXY_RUNTIME_LEN: usize = 45;

/// Runtime code of a minimal proxy delegating every call to `mastercopy`.
#[must_use]
pub fn minimal_proxy_runtime_code(mastercopy: Address) -> Vec<u8> {
    let mut code = Vec::with_capacity(PROXY_RUNTIME_LEN);
    code.extend_from_slice(&PROXY_RUNTIME_PREFIX);
    code.extend_from_slice(mastercopy.as_bytes());
    code.extend_from_slice(&PROXY_RUNTIME_SUFFIX);
    code
}

/// Creation code the module proxy factory passes to CREATE2.
#[must_use]
pub fn minimal_proxy_init_code(mastercopy: Address) -> Vec<u8> {
    let mut code = Vec::with_capacity(PROXY_CREATION_PREFIX.len() + PROXY_RUNTIME_LEN);
    code.extend_from_slice(&PROXY_CREATION_PREFIX);
    code.extend_from_slice(&minimal_proxy_runtime_code(mastercopy));
    code
}

/// Returns the implementation address if `code` is a minimal proxy.
#[must_use]
pub fn minimal_proxy_implementation(code: &[u8]) -> Option<Address> {
    if code.len() != PROXY_RUNTIME_LEN
        || code[..10] != PROXY_RUNTIME_PREFIX
        || code[30..] != PROXY_RUNTIME_SUFFIX
    {
        return None;
    }
    Address::from_slice(&code[10..30])
}

/// Effective CREATE2 salt of a proxy:
/// `keccak256(keccak256(setup_calldata) ++ uint256(salt_nonce))`.
#[must_use]
pub fn proxy_salt(setup_calldata: &[u8], salt_nonce: U256) -> Hash {
    let mut data = Vec::with_capacity(64);
    data.extend_from_slice(keccak256(setup_calldata).as_bytes());
    data.extend_from_slice(Hash::from_u256(salt_nonce).as_bytes());
    keccak256(&data)
}

/// Address the module proxy factory at `factory` will create for this setup.
#[must_use]
pub fn predict_proxy_address(
    factory: Address,
    mastercopy: Address,
    setup_calldata: &[u8],
    salt_nonce: U256,
) -> Address {
    derive_address_from_init_code(
        factory,
        proxy_salt(setup_calldata, salt_nonce),
        &minimal_proxy_init_code(mastercopy),
    )
}

// =============================================================================
// TESTS
// =============================================================================
