//! # hexns Primitives
//!
//! Shared building blocks of the hexns resolution engines.
//!
//! This crate holds everything both engines and their hosts must agree on
//! bit for bit: the identity codec deriving labels, digests and node
//! identifiers from wallet identities, the length-prefixed wire name
//! format, and the selector-dispatched record call surface with its word
//! encoding. All of it is pure and deterministic; state lives in the
//! engine crates.

pub mod call;
pub mod identity;
pub mod name;

mod abi;

use sha3::{Digest, Keccak256};

pub use primitive_types::{H160, H256, U256};

/// A wallet identity, the 20-byte account form.
pub type WalletId = H160;

/// A node identifier, the 32-byte digest addressing one name in the tree.
pub type NodeId = H256;

/// Coin type of the default address record.
pub const DEFAULT_COIN_TYPE: u64 = 60;

/// keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> H256 {
    H256::from_slice(&Keccak256::digest(data))
}

/// keccak-256 digest of `a ‖ b`.
///
/// The derivation primitive behind node identifiers and storage slot
/// addresses alike.
pub fn keccak_pair(a: &[u8], b: &[u8]) -> H256 {
    let mut hasher = Keccak256::new();
    hasher.update(a);
    hasher.update(b);
    H256::from_slice(&hasher.finalize())
}
