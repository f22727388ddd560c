//! Open string literals: the prefix and quoting of each one, and the stack
//! of literals nested through interpolation.

use alloc::vec::Vec;

/// The state of one open string literal, packed into a single byte.
///
/// The low three bits record the terminating quote character (exactly one is
/// set once the literal is open), the remaining bits record the prefix and
/// quoting flags. The bit layout is part of the serialized scanner state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Delimiter(u8);

impl Delimiter {
    const SINGLE_QUOTE: u8 = 1 << 0;
    const DOUBLE_QUOTE: u8 = 1 << 1;
    const BACK_QUOTE: u8 = 1 << 2;
    const RAW: u8 = 1 << 3;
    const FORMAT: u8 = 1 << 4;
    const TRIPLE: u8 = 1 << 5;
    const BYTES: u8 = 1 << 6;

    const QUOTES: u8 = Self::SINGLE_QUOTE | Self::DOUBLE_QUOTE | Self::BACK_QUOTE;
    const KNOWN: u8 = Self::QUOTES | Self::RAW | Self::FORMAT | Self::TRIPLE | Self::BYTES;

    /// An empty flag set with no terminator yet.
    #[must_use]
    pub const fn new() -> Self {
        Delimiter(0)
    }

    /// Reinterprets a serialized flag byte. Returns `None` unless exactly one
    /// terminator bit is set and no unknown bit is.
    #[must_use]
    pub const fn from_bits(bits: u8) -> Option<Self> {
        if bits & !Self::KNOWN != 0 || (bits & Self::QUOTES).count_ones() != 1 {
            return None;
        }
        Some(Delimiter(bits))
    }

    /// The serialized flag byte.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Whether the literal is interpolated (an `f` prefix).
    #[must_use]
    pub const fn is_format(self) -> bool {
        self.0 & Self::FORMAT != 0
    }

    /// Whether backslashes are literal text (an `r` prefix).
    #[must_use]
    pub const fn is_raw(self) -> bool {
        self.0 & Self::RAW != 0
    }

    /// Whether the literal was opened with three quote characters.
    #[must_use]
    pub const fn is_triple(self) -> bool {
        self.0 & Self::TRIPLE != 0
    }

    /// Whether the literal is a byte string (a `b` prefix).
    #[must_use]
    pub const fn is_bytes(self) -> bool {
        self.0 & Self::BYTES != 0
    }

    /// The quote character that closes the literal, if one has been set.
    #[must_use]
    pub const fn end_character(self) -> Option<char> {
        if self.0 & Self::SINGLE_QUOTE != 0 {
            Some('\'')
        } else if self.0 & Self::DOUBLE_QUOTE != 0 {
            Some('"')
        } else if self.0 & Self::BACK_QUOTE != 0 {
            Some('`')
        } else {
            None
        }
    }

    /// Records the closing quote. Returns `false`, leaving the flags
    /// untouched, if `quote` is not a quote character.
    pub fn set_end_character(&mut self, quote: char) -> bool {
        let bit = match quote {
            '\'' => Self::SINGLE_QUOTE,
            '"' => Self::DOUBLE_QUOTE,
            '`' => Self::BACK_QUOTE,
            _ => return false,
        };
        self.0 |= bit;
        true
    }

    /// Applies a string prefix letter. Returns `false` for letters that are
    /// not string prefixes; `u` is accepted and ignored.
    pub fn apply_prefix(&mut self, letter: char) -> bool {
        match letter {
            'f' | 'F' => self.0 |= Self::FORMAT,
            'r' | 'R' => self.0 |= Self::RAW,
            'b' | 'B' => self.0 |= Self::BYTES,
            'u' | 'U' => {}
            _ => return false,
        }
        true
    }

    pub(crate) fn set_triple(&mut self) {
        self.0 |= Self::TRIPLE;
    }
}

/// The string literals currently open, innermost last.
///
/// Literals nest through interpolation: `f"{g'{x}'}"` has two open
/// delimiters while `x` is being parsed. Only the top entry is consulted when
/// scanning literal text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct DelimiterStack(Vec<Delimiter>);

impl DelimiterStack {
    /// An empty stack.
    #[must_use]
    pub const fn new() -> Self {
        DelimiterStack(Vec::new())
    }

    /// The innermost open literal.
    #[must_use]
    pub fn top(&self) -> Option<Delimiter> {
        self.0.last().copied()
    }

    /// Opens a literal.
    pub fn push(&mut self, delimiter: Delimiter) {
        debug_assert!(delimiter.end_character().is_some());
        self.0.push(delimiter);
    }

    /// Closes the innermost literal.
    pub fn pop(&mut self) -> Option<Delimiter> {
        self.0.pop()
    }

    /// Number of open literals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no literal is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The open literals, outermost first.
    #[must_use]
    pub fn as_slice(&self) -> &[Delimiter] {
        &self.0
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<Delimiter> for DelimiterStack {
    fn from_iter<I: IntoIterator<Item = Delimiter>>(iter: I) -> Self {
        DelimiterStack(iter.into_iter().collect())
    }
}
