//! Storage-query plans.
//!
//! A plan is the deterministic, serializable description of the slots a
//! verifier must open to answer one record call: first the node's version
//! word, then the value slot whose key path backreferences that version.
//! Plans carry key paths rather than resolved slot addresses so the
//! verifier can re-derive and therefore prove every step.

use crate::layout::{self, Slot};
use hexns_primitives::call::RecordCall;
use hexns_primitives::{DEFAULT_COIN_TYPE, H256, U256, WalletId};
use serde::{Deserialize, Serialize};

/// One component of a slot key path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotKey {
    /// An already-padded 32-byte key.
    Word(H256),
    /// A raw byte-string key, hashed unpadded.
    Bytes(Vec<u8>),
    /// The word produced by an earlier read of the same plan.
    ValueOf(usize),
}

/// How much data a read returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadKind {
    /// One 32-byte word.
    Word,
    /// A variable-length value; the verifier resolves inline versus
    /// spilled storage on its side.
    Value,
}

/// A single storage read the verifier must open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageRead {
    /// Base slot of the table the key path starts from.
    pub table: u64,
    /// Mapping keys applied in nesting order.
    pub keys: Vec<SlotKey>,
    /// Whether this read returns a word or a variable-length value.
    pub kind: ReadKind,
}

impl StorageRead {
    /// Resolves the slot this read opens, given the head words earlier
    /// reads produced. `None` when a backreference is out of range.
    pub fn slot(&self, prior: &[H256]) -> Option<Slot> {
        let mut slot = layout::table_slot(self.table);
        for key in &self.keys {
            slot = match key {
                SlotKey::Word(word) => layout::map_slot(slot, word.as_bytes()),
                SlotKey::Bytes(bytes) => layout::map_slot(slot, bytes),
                SlotKey::ValueOf(index) => {
                    layout::map_slot(slot, prior.get(*index)?.as_bytes())
                }
            };
        }
        Some(slot)
    }
}

/// Shape the final value of a plan decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// A 20-byte default address.
    DefaultAddress,
    /// Opaque address bytes for an explicit coin type.
    AddressBytes,
    /// UTF-8 text.
    Text,
    /// Content-hash bytes.
    ContentHash,
}

/// A deterministic query against a remote record store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPlan {
    /// Identity of the remote record store being read.
    pub target: WalletId,
    /// Reads the verifier opens, in order.
    pub reads: Vec<StorageRead>,
    /// Shape the final read decodes into.
    pub output: OutputKind,
}

impl QueryPlan {
    /// Builds the plan answering `call` against the store at `target`.
    ///
    /// Equal inputs always produce identical plans.
    pub fn for_call(target: WalletId, call: &RecordCall) -> Self {
        let node = call.node();
        let version_read = StorageRead {
            table: layout::VERSIONS_SLOT,
            keys: vec![SlotKey::Word(node)],
            kind: ReadKind::Word,
        };
        let (value_read, output) = match call {
            RecordCall::Addr { .. } => (
                StorageRead {
                    table: layout::ADDRESSES_SLOT,
                    keys: vec![
                        SlotKey::ValueOf(0),
                        SlotKey::Word(node),
                        SlotKey::Word(H256(layout::coin_key(U256::from(DEFAULT_COIN_TYPE)))),
                    ],
                    kind: ReadKind::Value,
                },
                OutputKind::DefaultAddress,
            ),
            RecordCall::AddrCoin { coin_type, .. } => (
                StorageRead {
                    table: layout::ADDRESSES_SLOT,
                    keys: vec![
                        SlotKey::ValueOf(0),
                        SlotKey::Word(node),
                        SlotKey::Word(H256(layout::coin_key(*coin_type))),
                    ],
                    kind: ReadKind::Value,
                },
                OutputKind::AddressBytes,
            ),
            RecordCall::Text { key, .. } => (
                StorageRead {
                    table: layout::TEXTS_SLOT,
                    keys: vec![
                        SlotKey::ValueOf(0),
                        SlotKey::Word(node),
                        SlotKey::Bytes(key.clone().into_bytes()),
                    ],
                    kind: ReadKind::Value,
                },
                OutputKind::Text,
            ),
            RecordCall::Contenthash { .. } => (
                StorageRead {
                    table: layout::HASHES_SLOT,
                    keys: vec![SlotKey::ValueOf(0), SlotKey::Word(node)],
                    kind: ReadKind::Value,
                },
                OutputKind::ContentHash,
            ),
        };
        Self {
            target,
            reads: vec![version_read, value_read],
            output,
        }
    }
}
