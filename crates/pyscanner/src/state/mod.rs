//! Persisted scanner state and its byte encoding.
//!
//! The host keeps the state of every scanner checkpoint as an opaque byte
//! string so it can resume scanning after an edit. The layout is:
//!
//! ```text
//! [count] [delimiter; count] [indent level; ..]
//! ```
//!
//! - `count` is the number of open string literals, saturated at 255.
//! - Each delimiter is its flag byte (see [`Delimiter::bits`]), outermost
//!   first.
//! - The remaining bytes are the indentation levels of the open blocks,
//!   outermost first, each as an unsigned LEB128 varint. The top-level column
//!   is implied and never written. Levels below 128 take a single byte.
//!
//! An empty buffer stands for the initial state.
//!
//! Every state the scanner produces decodes back unchanged as long as it fits
//! the buffer. Past that, delimiters beyond the 255th and levels that do not
//! fit are dropped, and both cases are logged.

use alloc::{vec, vec::Vec};

use crate::{Delimiter, DelimiterStack, IndentStack, StateError};

/// Size of the serialization buffer tree-sitter hands to external scanners.
pub const DEFAULT_STATE_CAPACITY: usize = 1024;

/// Everything a scanner carries from one scan call to the next.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScannerState {
    /// Indentation of the enclosing blocks.
    pub indents: IndentStack,
    /// String literals currently open.
    pub delimiters: DelimiterStack,
}

impl ScannerState {
    /// The state of a freshly created scanner.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns to the state of a freshly created scanner.
    pub fn reset(&mut self) {
        self.indents.reset();
        self.delimiters.clear();
    }

    /// Whether this is the state of a freshly created scanner.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.indents.depth() == 0 && self.delimiters.is_empty()
    }

    /// Encodes the state into `buffer` and returns the number of bytes
    /// written. Never writes past the end of `buffer`.
    pub fn serialize_into(&self, buffer: &mut [u8]) -> usize {
        let Some((count_slot, rest)) = buffer.split_first_mut() else {
            if !self.is_initial() {
                tracing::warn!("no room to serialize scanner state");
            }
            return 0;
        };

        let open = self.delimiters.as_slice();
        let count = open.len().min(usize::from(u8::MAX)).min(rest.len());
        if count < open.len() {
            tracing::warn!(
                open = open.len(),
                written = count,
                "delimiter stack truncated during serialization"
            );
        }
        *count_slot = u8::try_from(count).unwrap_or(u8::MAX);
        for (slot, delimiter) in rest.iter_mut().zip(&open[..count]) {
            *slot = delimiter.bits();
        }

        let rest = &mut rest[count..];
        let blocks = self.indents.blocks();
        let mut used = 0;
        let mut written = 0;
        for &level in blocks {
            let mut encoded = [0; MAX_LEVEL_LEN];
            let len = encode_level(level, &mut encoded);
            let Some(slot) = rest.get_mut(used..used + len) else {
                break;
            };
            slot.copy_from_slice(&encoded[..len]);
            used += len;
            written += 1;
        }
        if written < blocks.len() {
            tracing::warn!(
                blocks = blocks.len(),
                written,
                "indentation stack truncated during serialization"
            );
        }

        1 + count + used
    }

    /// Encodes the state into a fresh buffer of at most `capacity` bytes.
    #[must_use]
    pub fn to_bytes(&self, capacity: usize) -> Vec<u8> {
        let mut buffer = vec![0; capacity];
        let len = self.serialize_into(&mut buffer);
        buffer.truncate(len);
        buffer
    }

    /// Decodes a state written by [`serialize_into`](Self::serialize_into).
    ///
    /// An empty buffer decodes to the initial state.
    ///
    /// # Errors
    ///
    /// Fails if the buffer is longer than `capacity`, if the delimiter count
    /// runs past its end, if a delimiter byte is malformed, or if the
    /// indentation levels are malformed or do not strictly
    /// increase.
    pub fn deserialize(bytes: &[u8], capacity: usize) -> Result<Self, StateError> {
        let Some((&count, rest)) = bytes.split_first() else {
            return Ok(Self::new());
        };
        if bytes.len() > capacity {
            return Err(StateError::Oversized {
                len: bytes.len(),
                capacity,
            });
        }

        let count = usize::from(count);
        if count > rest.len() {
            return Err(StateError::TruncatedDelimiters {
                declared: count,
                available: rest.len(),
            });
        }
        let (open, levels) = rest.split_at(count);

        let delimiters = open
            .iter()
            .enumerate()
            .map(|(index, &bits)| {
                Delimiter::from_bits(bits).ok_or(StateError::InvalidDelimiter { index, bits })
            })
            .collect::<Result<DelimiterStack, _>>()?;

        let mut indents = IndentStack::new();
        let mut levels = levels;
        let mut depth = 0;
        while !levels.is_empty() {
            depth += 1;
            let Some((level, len)) = decode_level(levels) else {
                return Err(StateError::MalformedIndent { depth });
            };
            if !indents.push(level) {
                return Err(StateError::NonIncreasingIndent { depth, level });
            }
            levels = &levels[len..];
        }

        tracing::debug!(
            delimiters = delimiters.len(),
            blocks = indents.depth(),
            "restored scanner state"
        );
        Ok(Self {
            indents,
            delimiters,
        })
    }
}

/// Longest varint encoding of a `u32` level.
const MAX_LEVEL_LEN: usize = 5;

/// Writes `level` as an unsigned LEB128 varint and returns its length.
fn encode_level(mut level: u32, out: &mut [u8; MAX_LEVEL_LEN]) -> usize {
    let mut len = 0;
    loop {
        let low = level.to_le_bytes()[0] & 0x7f;
        level >>= 7;
        if level == 0 {
            out[len] = low;
            return len + 1;
        }
        out[len] = low | 0x80;
        len += 1;
    }
}

/// Reads one varint level from the front of `bytes`, with the number of
/// bytes it took. `None` if it is cut off or overflows a `u32`.
fn decode_level(bytes: &[u8]) -> Option<(u32, usize)> {
    let mut level = 0u32;
    for (index, &byte) in bytes.iter().take(MAX_LEVEL_LEN).enumerate() {
        let bits = u32::from(byte & 0x7f);
        // The fifth byte holds the top four bits only.
        if index == MAX_LEVEL_LEN - 1 && bits > 0x0f {
            return None;
        }
        level |= bits << (7 * index);
        if byte & 0x80 == 0 {
            return Some((level, index + 1));
        }
    }
    None
}
