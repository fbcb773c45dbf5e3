//! Wallet identity codec.
//!
//! Deterministic conversions between a wallet identity and the artifacts
//! the namespace derives from it: the canonical hex label, the mixed-case
//! display form, the label digest used as a claim key, and the reverse
//! node identifier that addresses the wallet's own records. Everything
//! here is a pure function of its inputs; label parsing is the only
//! fallible operation.

use crate::{H256, NodeId, WalletId, keccak256, keccak_pair};
use once_cell::sync::Lazy;

/// Character count of a bare hex label.
pub const HEX_LABEL_LEN: usize = 40;

/// Character count of a `0x`-prefixed hex label.
pub const PREFIXED_HEX_LABEL_LEN: usize = 42;

/// Root node every reverse identifier is derived under.
///
/// Digest of the reserved name `reverse`, fixed for the lifetime of the
/// namespace so a wallet's reverse node depends on the identity alone.
pub static REVERSE_ROOT_NODE: Lazy<NodeId> = Lazy::new(|| namehash("reverse"));

/// Reasons an identity label fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The label is neither the bare nor the prefixed hex length.
    #[error("hex label must be {HEX_LABEL_LEN} or {PREFIXED_HEX_LABEL_LEN} characters, got {0}")]
    BadLength(usize),
    /// A 42-character label must start with `0x`.
    #[error("prefixed hex label does not start with 0x")]
    MissingPrefix,
    /// The label carries a character outside `[0-9a-fA-F]`.
    #[error("hex label contains a non-hex character")]
    BadDigit,
}

/// Canonical label of a wallet: 40 lowercase hex characters, unprefixed.
pub fn hex_label(wallet: WalletId) -> String {
    hex::encode(wallet.as_bytes())
}

/// Mixed-case display form of a wallet label.
///
/// Each alphabetic digit is upper-cased when the corresponding nibble of
/// the keccak digest of the lowercase label is eight or above. The result
/// decodes to the same identity as the lowercase form; the casing only
/// guards against transcription errors.
pub fn checksum_label(wallet: WalletId) -> String {
    let lower = hex_label(wallet);
    let digest = keccak256(lower.as_bytes());
    lower
        .char_indices()
        .map(|(i, c)| {
            let byte = digest.as_bytes()[i / 2];
            let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
            if nibble >= 8 { c.to_ascii_uppercase() } else { c }
        })
        .collect()
}

/// Parses a wallet identity from its hex label.
///
/// Accepts the bare 40-character form and the 42-character prefixed form,
/// in any mix of upper and lower case, so the lowercase, uppercase and
/// checksummed spellings of one wallet all decode to the same identity.
pub fn parse_hex_label(label: &[u8]) -> Result<WalletId, IdentityError> {
    let digits = match label.len() {
        HEX_LABEL_LEN => label,
        PREFIXED_HEX_LABEL_LEN => label
            .strip_prefix(b"0x")
            .or_else(|| label.strip_prefix(b"0X"))
            .ok_or(IdentityError::MissingPrefix)?,
        other => return Err(IdentityError::BadLength(other)),
    };
    let bytes = hex::decode(digits).map_err(|_| IdentityError::BadDigit)?;
    Ok(WalletId::from_slice(&bytes))
}

/// Digest of a single label, the key side of node derivation.
pub fn label_digest(label: &str) -> H256 {
    keccak256(label.as_bytes())
}

/// Digest of a wallet's canonical label.
///
/// The key a claim for this wallet is filed under, whatever parent the
/// claim lands in.
pub fn wallet_label_digest(wallet: WalletId) -> H256 {
    keccak256(hex_label(wallet).as_bytes())
}

/// Child node identifier under `parent` for a given label digest.
pub fn child_node(parent: NodeId, label_digest: H256) -> NodeId {
    keccak_pair(parent.as_bytes(), label_digest.as_bytes())
}

/// Node a claim for `wallet` mints under `parent`.
pub fn wallet_node(parent: NodeId, wallet: WalletId) -> NodeId {
    child_node(parent, wallet_label_digest(wallet))
}

/// Reverse node of a wallet: the canonical identifier its records live
/// under, independent of any parent name.
pub fn reverse_node(wallet: WalletId) -> NodeId {
    child_node(*REVERSE_ROOT_NODE, wallet_label_digest(wallet))
}

/// Folds a dotted name into its node identifier, outermost label last.
///
/// The empty name maps to the zero node. Input is taken as already
/// normalized; no case folding happens here.
pub fn namehash(name: &str) -> NodeId {
    let mut node = NodeId::zero();
    if name.is_empty() {
        return node;
    }
    for label in name.rsplit('.') {
        node = child_node(node, label_digest(label));
    }
    node
}
