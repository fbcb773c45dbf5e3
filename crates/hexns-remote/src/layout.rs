//! Canonical slot layout of a persisted record store.
//!
//! A record store persisted in a word-addressed environment lays its
//! tables out from fixed base slots, one nesting level per mapping key,
//! each level at `keccak256(key ‖ previous slot)`. Word-sized keys arrive
//! padded to 32 bytes, string and bytes keys are hashed raw. Variable
//! length values keep short payloads inline in the slot word and spill
//! longer ones to a digest-derived run of consecutive slots.
//!
//! The query builder replays this arithmetic locally and a verifier opens
//! the resulting slots remotely; both sides agreeing on this module field
//! for field is what makes a cross-domain read provable.

use hexns_primitives::{H256, NodeId, U256, keccak256, keccak_pair};

/// Base slot of the record-version table.
pub const VERSIONS_SLOT: u64 = 0;
/// Base slot of the per-coin address table.
pub const ADDRESSES_SLOT: u64 = 1;
/// Base slot of the text table.
pub const TEXTS_SLOT: u64 = 2;
/// Base slot of the content-hash table.
pub const HASHES_SLOT: u64 = 3;

/// Largest payload stored inline in its head word.
pub const MAX_INLINE_LEN: usize = 31;

/// Largest value [`decode_value`] accepts from an out-of-line head.
pub const MAX_VALUE_LEN: usize = 4096;

/// A storage slot address.
pub type Slot = H256;

/// Slot address of a table's base slot.
pub fn table_slot(base: u64) -> Slot {
    H256::from_low_u64_be(base)
}

/// Slot of `table[key]`.
///
/// `key` is the already-encoded key bytes: padded words for value keys,
/// raw unpadded bytes for string and bytes keys.
pub fn map_slot(table: Slot, key: &[u8]) -> Slot {
    keccak_pair(key, table.as_bytes())
}

/// 32-byte key encoding of a version counter.
pub fn version_key(version: u64) -> [u8; 32] {
    H256::from_low_u64_be(version).0
}

/// 32-byte key encoding of a coin type.
pub fn coin_key(coin_type: U256) -> [u8; 32] {
    coin_type.to_big_endian()
}

/// Slot holding the record version of `node`.
pub fn version_slot(node: NodeId) -> Slot {
    map_slot(table_slot(VERSIONS_SLOT), node.as_bytes())
}

/// Head slot of `addresses[version][node][coin_type]`.
pub fn address_value_slot(version: u64, node: NodeId, coin_type: U256) -> Slot {
    let slot = map_slot(table_slot(ADDRESSES_SLOT), &version_key(version));
    let slot = map_slot(slot, node.as_bytes());
    map_slot(slot, &coin_key(coin_type))
}

/// Head slot of `texts[version][node][key]`.
pub fn text_value_slot(version: u64, node: NodeId, key: &str) -> Slot {
    let slot = map_slot(table_slot(TEXTS_SLOT), &version_key(version));
    let slot = map_slot(slot, node.as_bytes());
    map_slot(slot, key.as_bytes())
}

/// Head slot of `content_hashes[version][node]`.
pub fn hash_value_slot(version: u64, node: NodeId) -> Slot {
    let slot = map_slot(table_slot(HASHES_SLOT), &version_key(version));
    map_slot(slot, node.as_bytes())
}

/// Head word of a variable-length value.
///
/// Payloads up to [`MAX_INLINE_LEN`] bytes sit left-aligned in the word
/// with `2 * len` in the low byte. Longer payloads leave only
/// `2 * len + 1` in the word and spill their bytes to [`spill_slot`].
pub fn head_word(value: &[u8]) -> H256 {
    if value.len() <= MAX_INLINE_LEN {
        let mut word = [0u8; 32];
        word[..value.len()].copy_from_slice(value);
        word[31] = (value.len() as u8) * 2;
        H256(word)
    } else {
        H256(U256::from(value.len() as u64 * 2 + 1).to_big_endian())
    }
}

/// First spill slot of an out-of-line value stored at `slot`.
pub fn spill_slot(slot: Slot) -> Slot {
    keccak256(slot.as_bytes())
}

/// `slot + offset` in the word-addressed slot space.
pub fn offset_slot(slot: Slot, offset: u64) -> Slot {
    let base = U256::from_big_endian(slot.as_bytes());
    H256(base.overflowing_add(U256::from(offset)).0.to_big_endian())
}

/// Word writes that persist `value` at `slot`.
pub fn value_words(slot: Slot, value: &[u8]) -> Vec<(Slot, H256)> {
    let mut words = vec![(slot, head_word(value))];
    if value.len() > MAX_INLINE_LEN {
        let base = spill_slot(slot);
        for (i, chunk) in value.chunks(32).enumerate() {
            let mut word = [0u8; 32];
            word[..chunk.len()].copy_from_slice(chunk);
            words.push((offset_slot(base, i as u64), H256(word)));
        }
    }
    words
}

/// Decodes a variable-length value from its head word.
///
/// `spill` supplies the word at `spill_slot + i` on demand; inline heads
/// never invoke it. `None` means the head word is malformed or claims a
/// length above [`MAX_VALUE_LEN`].
pub fn decode_value(head: H256, mut spill: impl FnMut(u64) -> H256) -> Option<Vec<u8>> {
    let tag = head.0[31];
    if tag % 2 == 0 {
        let len = (tag / 2) as usize;
        if len > MAX_INLINE_LEN {
            return None;
        }
        return Some(head.0[..len].to_vec());
    }
    // Forged heads can claim any length; refuse them before sizing any
    // allocation or spill walk by it.
    let raw = U256::from_big_endian(head.as_bytes());
    if raw > U256::from(MAX_VALUE_LEN as u64 * 2 + 1) {
        return None;
    }
    let len = ((raw.low_u64() - 1) / 2) as usize;
    let mut out = Vec::with_capacity(len);
    let mut index = 0u64;
    while out.len() < len {
        let word = spill(index);
        let take = (len - out.len()).min(32);
        out.extend_from_slice(&word.0[..take]);
        index += 1;
    }
    Some(out)
}
