//! The selector-dispatched record call surface.
//!
//! Every record accessor is addressable as a 4-byte selector, the leading
//! bytes of the keccak digest of its canonical signature, followed by
//! word-encoded arguments. The local engine, the remote query builder and
//! the verified callback all speak this encoding, which is why it lives
//! with the primitives rather than in either engine.

use crate::abi;
use crate::{H160, NodeId, U256, WalletId, keccak256};
use once_cell::sync::Lazy;

/// A 4-byte call selector.
pub type Selector = [u8; 4];

fn selector(signature: &str) -> Selector {
    let digest = keccak256(signature.as_bytes());
    let mut selector = [0u8; 4];
    selector.copy_from_slice(&digest.as_bytes()[..4]);
    selector
}

/// `addr(bytes32)`, the default address record.
pub static SELECTOR_ADDR: Lazy<Selector> = Lazy::new(|| selector("addr(bytes32)"));
/// `addr(bytes32,uint256)`, the address record of an explicit coin type.
pub static SELECTOR_ADDR_COIN: Lazy<Selector> = Lazy::new(|| selector("addr(bytes32,uint256)"));
/// `text(bytes32,string)`.
pub static SELECTOR_TEXT: Lazy<Selector> = Lazy::new(|| selector("text(bytes32,string)"));
/// `contenthash(bytes32)`.
pub static SELECTOR_CONTENTHASH: Lazy<Selector> = Lazy::new(|| selector("contenthash(bytes32)"));
/// `resolve(bytes,bytes)`, the wildcard entry point.
pub static SELECTOR_RESOLVE: Lazy<Selector> = Lazy::new(|| selector("resolve(bytes,bytes)"));

/// Reasons call data fails to decode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    /// The data is shorter than a selector.
    #[error("call data is shorter than a selector")]
    MissingSelector,
    /// The selector names no supported accessor.
    #[error("unknown selector 0x{}", hex::encode(.0))]
    UnknownSelector(Selector),
    /// The argument block is truncated or its offsets are out of range.
    #[error("call arguments are truncated or malformed")]
    BadArguments,
    /// A text key must be UTF-8.
    #[error("text key is not valid UTF-8")]
    KeyNotUtf8,
    /// A text value must be UTF-8.
    #[error("text value is not valid UTF-8")]
    ValueNotUtf8,
}

/// A decoded record accessor call.
///
/// This is the closed set of operations the engines dispatch over;
/// anything else on the wire is an unknown selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordCall {
    /// Default address record of a node.
    Addr { node: NodeId },
    /// Address record of a node for an explicit coin type.
    AddrCoin { node: NodeId, coin_type: U256 },
    /// Text record of a node under a UTF-8 key.
    Text { node: NodeId, key: String },
    /// Content hash of a node.
    Contenthash { node: NodeId },
}

impl RecordCall {
    /// Selector of this call.
    pub fn selector(&self) -> Selector {
        match self {
            Self::Addr { .. } => *SELECTOR_ADDR,
            Self::AddrCoin { .. } => *SELECTOR_ADDR_COIN,
            Self::Text { .. } => *SELECTOR_TEXT,
            Self::Contenthash { .. } => *SELECTOR_CONTENTHASH,
        }
    }

    /// Node identifier carried by the call.
    pub fn node(&self) -> NodeId {
        match self {
            Self::Addr { node }
            | Self::AddrCoin { node, .. }
            | Self::Text { node, .. }
            | Self::Contenthash { node } => *node,
        }
    }

    /// Replaces the node argument, leaving everything else intact.
    ///
    /// The wildcard dispatcher uses this to substitute a reverse
    /// identifier for whatever node the caller encoded.
    pub fn with_node(self, node: NodeId) -> Self {
        match self {
            Self::Addr { .. } => Self::Addr { node },
            Self::AddrCoin { coin_type, .. } => Self::AddrCoin { node, coin_type },
            Self::Text { key, .. } => Self::Text { node, key },
            Self::Contenthash { .. } => Self::Contenthash { node },
        }
    }

    /// Decodes a selector-prefixed call.
    pub fn decode(data: &[u8]) -> Result<Self, CallError> {
        let Some(selector_bytes) = data.get(..4) else {
            return Err(CallError::MissingSelector);
        };
        let mut selector = [0u8; 4];
        selector.copy_from_slice(selector_bytes);
        let args = &data[4..];

        if selector == *SELECTOR_ADDR {
            Ok(Self::Addr { node: node_arg(args)? })
        } else if selector == *SELECTOR_ADDR_COIN {
            let coin_type = abi::u256_at(args, abi::WORD).ok_or(CallError::BadArguments)?;
            Ok(Self::AddrCoin { node: node_arg(args)?, coin_type })
        } else if selector == *SELECTOR_TEXT {
            let raw = abi::dynamic_at(args, abi::WORD).ok_or(CallError::BadArguments)?;
            let key = String::from_utf8(raw).map_err(|_| CallError::KeyNotUtf8)?;
            Ok(Self::Text { node: node_arg(args)?, key })
        } else if selector == *SELECTOR_CONTENTHASH {
            Ok(Self::Contenthash { node: node_arg(args)? })
        } else {
            Err(CallError::UnknownSelector(selector))
        }
    }

    /// Encodes the call as its selector plus word-encoded arguments.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + 4 * abi::WORD);
        out.extend_from_slice(&self.selector());
        match self {
            Self::Addr { node } | Self::Contenthash { node } => {
                out.extend_from_slice(node.as_bytes());
            }
            Self::AddrCoin { node, coin_type } => {
                out.extend_from_slice(node.as_bytes());
                out.extend_from_slice(&abi::u256_word(*coin_type));
            }
            Self::Text { node, key } => {
                out.extend_from_slice(node.as_bytes());
                out.extend_from_slice(&abi::u256_word(U256::from(2 * abi::WORD)));
                abi::encode_tail(&mut out, key.as_bytes());
            }
        }
        out
    }
}

fn node_arg(args: &[u8]) -> Result<NodeId, CallError> {
    abi::word_at(args, 0)
        .map(NodeId::from)
        .ok_or(CallError::BadArguments)
}

/// Encodes the wildcard entry call `resolve(name, data)`.
pub fn encode_resolve(name: &[u8], call_data: &[u8]) -> Vec<u8> {
    let mut name_tail = Vec::new();
    abi::encode_tail(&mut name_tail, name);

    let mut out =
        Vec::with_capacity(4 + 3 * abi::WORD + name_tail.len() + call_data.len() + abi::WORD);
    out.extend_from_slice(&*SELECTOR_RESOLVE);
    out.extend_from_slice(&abi::u256_word(U256::from(2 * abi::WORD)));
    out.extend_from_slice(&abi::u256_word(U256::from(2 * abi::WORD + name_tail.len())));
    out.extend_from_slice(&name_tail);
    abi::encode_tail(&mut out, call_data);
    out
}

/// Splits a wildcard entry call into its wire name and inner call data.
pub fn decode_resolve(data: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CallError> {
    let Some(selector_bytes) = data.get(..4) else {
        return Err(CallError::MissingSelector);
    };
    if selector_bytes != SELECTOR_RESOLVE.as_slice() {
        let mut selector = [0u8; 4];
        selector.copy_from_slice(selector_bytes);
        return Err(CallError::UnknownSelector(selector));
    }
    let args = &data[4..];
    let name = abi::dynamic_at(args, 0).ok_or(CallError::BadArguments)?;
    let call_data = abi::dynamic_at(args, abi::WORD).ok_or(CallError::BadArguments)?;
    Ok((name, call_data))
}

/// A typed record answer, the value side of [`RecordCall`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordAnswer {
    /// A 20-byte address, as returned by the default address record.
    Address(WalletId),
    /// Opaque bytes: coin addresses and content hashes.
    Bytes(Vec<u8>),
    /// A text record value.
    Text(String),
}

impl RecordAnswer {
    /// Encodes the answer in the call surface's return encoding.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Address(wallet) => abi::address_word(*wallet).to_vec(),
            Self::Bytes(bytes) => encode_dynamic_return(bytes),
            Self::Text(text) => encode_dynamic_return(text.as_bytes()),
        }
    }

    /// Decodes a return payload for a call of the given shape.
    pub fn decode(call: &RecordCall, data: &[u8]) -> Result<Self, CallError> {
        match call {
            RecordCall::Addr { .. } => {
                let word = abi::word_at(data, 0).ok_or(CallError::BadArguments)?;
                Ok(Self::Address(H160::from_slice(&word[12..])))
            }
            RecordCall::Text { .. } => {
                let raw = abi::dynamic_at(data, 0).ok_or(CallError::BadArguments)?;
                let text = String::from_utf8(raw).map_err(|_| CallError::ValueNotUtf8)?;
                Ok(Self::Text(text))
            }
            RecordCall::AddrCoin { .. } | RecordCall::Contenthash { .. } => {
                let raw = abi::dynamic_at(data, 0).ok_or(CallError::BadArguments)?;
                Ok(Self::Bytes(raw))
            }
        }
    }

    /// The address in this answer, zero for other shapes.
    pub fn into_address(self) -> WalletId {
        match self {
            Self::Address(wallet) => wallet,
            _ => WalletId::zero(),
        }
    }

    /// The bytes in this answer, empty for other shapes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Bytes(bytes) => bytes,
            _ => Vec::new(),
        }
    }

    /// The text in this answer, empty for other shapes.
    pub fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            _ => String::new(),
        }
    }
}

fn encode_dynamic_return(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(2 * abi::WORD + payload.len());
    out.extend_from_slice(&abi::u256_word(U256::from(abi::WORD)));
    abi::encode_tail(&mut out, payload);
    out
}
