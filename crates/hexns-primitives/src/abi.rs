//! Minimal 32-byte-word argument codec for the call surface.
//!
//! Covers exactly what the record accessors need: static words, and
//! dynamic byte strings framed by an offset word in the head and a length
//! word before the payload. Offsets are measured from the start of the
//! argument block, never from the selector.

use crate::{H160, U256};

/// Width of one encoded word.
pub(crate) const WORD: usize = 32;

/// Reads the 32-byte word starting at `offset`.
pub(crate) fn word_at(data: &[u8], offset: usize) -> Option<[u8; WORD]> {
    let end = offset.checked_add(WORD)?;
    data.get(offset..end)?.try_into().ok()
}

/// Reads the word at `offset` as a big-endian integer.
pub(crate) fn u256_at(data: &[u8], offset: usize) -> Option<U256> {
    word_at(data, offset).map(|word| U256::from_big_endian(&word))
}

/// Narrows a word-sized integer to an in-range offset or length.
pub(crate) fn to_usize(value: U256) -> Option<usize> {
    if value.bits() > 64 {
        return None;
    }
    usize::try_from(value.low_u64()).ok()
}

/// Reads a dynamic byte string whose offset word sits at `head_offset`.
pub(crate) fn dynamic_at(data: &[u8], head_offset: usize) -> Option<Vec<u8>> {
    let tail = to_usize(u256_at(data, head_offset)?)?;
    let len = to_usize(u256_at(data, tail)?)?;
    let start = tail.checked_add(WORD)?;
    let end = start.checked_add(len)?;
    Some(data.get(start..end)?.to_vec())
}

/// Big-endian word encoding of an integer.
pub(crate) fn u256_word(value: U256) -> [u8; WORD] {
    value.to_big_endian()
}

/// Left-padded word encoding of a 20-byte address.
pub(crate) fn address_word(address: H160) -> [u8; WORD] {
    let mut word = [0u8; WORD];
    word[12..].copy_from_slice(address.as_bytes());
    word
}

/// Appends a length word and the right-padded payload.
pub(crate) fn encode_tail(out: &mut Vec<u8>, payload: &[u8]) {
    out.extend_from_slice(&u256_word(U256::from(payload.len())));
    out.extend_from_slice(payload);
    let rem = payload.len() % WORD;
    if rem != 0 {
        out.resize(out.len() + (WORD - rem), 0);
    }
}
