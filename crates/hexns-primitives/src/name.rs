//! Wire-format names.
//!
//! Names travel as a length-prefixed label sequence, outermost label
//! first, closed by a zero length: `foo.eth` is `\x03foo\x03eth\x00`.
//! The wildcard dispatcher only ever inspects the first label, but framing
//! is validated in full so malformed input is rejected up front instead of
//! surfacing later as a bogus lookup.

use std::fmt;

/// Reasons a wire name fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    /// Even the root name carries its terminator byte.
    #[error("name data is empty")]
    Empty,
    /// A label length prefix points past the end of the data.
    #[error("label at offset {0} runs past the end of the name")]
    Truncated(usize),
    /// The data ended before a zero length closed the sequence.
    #[error("name is missing its terminator")]
    MissingTerminator,
    /// Bytes follow the terminator.
    #[error("trailing bytes after the name terminator")]
    TrailingBytes,
    /// Labels above 255 bytes cannot be length-prefixed.
    #[error("label exceeds 255 bytes")]
    LabelTooLong,
    /// A zero-length label is indistinguishable from the terminator.
    #[error("empty label")]
    EmptyLabel,
}

/// A parsed wire-format name, borrowing its labels from the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireName<'a> {
    labels: Vec<&'a [u8]>,
}

impl<'a> WireName<'a> {
    /// Parses the length-prefixed wire encoding.
    pub fn parse(data: &'a [u8]) -> Result<Self, NameError> {
        if data.is_empty() {
            return Err(NameError::Empty);
        }
        let mut labels = Vec::new();
        let mut offset = 0;
        loop {
            let len = *data.get(offset).ok_or(NameError::MissingTerminator)? as usize;
            if len == 0 {
                if offset + 1 != data.len() {
                    return Err(NameError::TrailingBytes);
                }
                return Ok(Self { labels });
            }
            let start = offset + 1;
            let label = data
                .get(start..start + len)
                .ok_or(NameError::Truncated(offset))?;
            labels.push(label);
            offset = start + len;
        }
    }

    /// The first (outermost) label, `None` for the root name.
    pub fn first_label(&self) -> Option<&'a [u8]> {
        self.labels.first().copied()
    }

    /// Number of labels in the name.
    pub fn label_count(&self) -> usize {
        self.labels.len()
    }

    /// Iterates the labels, outermost first.
    pub fn labels(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        self.labels.iter().copied()
    }
}

impl fmt::Display for WireName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", String::from_utf8_lossy(label))?;
        }
        Ok(())
    }
}

/// Encodes a dotted name into the wire format.
///
/// The empty name encodes as the bare terminator.
pub fn encode_name(name: &str) -> Result<Vec<u8>, NameError> {
    let mut out = Vec::with_capacity(name.len() + 2);
    if !name.is_empty() {
        for label in name.split('.') {
            if label.is_empty() {
                return Err(NameError::EmptyLabel);
            }
            if label.len() > u8::MAX as usize {
                return Err(NameError::LabelTooLong);
            }
            out.push(label.len() as u8);
            out.extend_from_slice(label.as_bytes());
        }
    }
    out.push(0);
    Ok(out)
}
