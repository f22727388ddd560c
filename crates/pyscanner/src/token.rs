use core::fmt;

/// The external token kinds, in the order the host grammar declares them.
///
/// The discriminant of each variant is the host's symbol id for that token,
/// so `TokenKind::Dedent as u16 == 2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u16)]
pub enum TokenKind {
    /// End of a logical line.
    Newline = 0,
    /// Start of a more deeply indented block.
    Indent = 1,
    /// End of an indented block.
    Dedent = 2,
    /// Prefix letters and opening quotes of a string literal.
    StringStart = 3,
    /// A run of literal text inside a string literal.
    StringContent = 4,
    /// Closing quotes of a string literal.
    StringEnd = 5,
}

impl TokenKind {
    /// Number of external token kinds.
    pub const COUNT: usize = 6;

    /// All kinds in symbol order.
    pub const ALL: [TokenKind; Self::COUNT] = [
        TokenKind::Newline,
        TokenKind::Indent,
        TokenKind::Dedent,
        TokenKind::StringStart,
        TokenKind::StringContent,
        TokenKind::StringEnd,
    ];

    /// The host symbol id for this kind.
    #[must_use]
    pub const fn symbol(self) -> u16 {
        self as u16
    }

    /// Looks up the kind for a host symbol id.
    #[must_use]
    pub fn from_symbol(symbol: u16) -> Option<Self> {
        Self::ALL.get(usize::from(symbol)).copied()
    }

    /// The grammar-level name of the token.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TokenKind::Newline => "NEWLINE",
            TokenKind::Indent => "INDENT",
            TokenKind::Dedent => "DEDENT",
            TokenKind::StringStart => "STRING_START",
            TokenKind::StringContent => "STRING_CONTENT",
            TokenKind::StringEnd => "STRING_END",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The set of token kinds the host grammar accepts at the current position.
///
/// ```rust
/// use pyscanner::{TokenKind, ValidTokens};
///
/// let valid = ValidTokens::from_slice(&[true, false, true]);
/// assert!(valid.contains(TokenKind::Newline));
/// assert!(!valid.contains(TokenKind::Indent));
/// assert!(valid.contains(TokenKind::Dedent));
/// assert!(!valid.contains(TokenKind::StringEnd));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ValidTokens([bool; TokenKind::COUNT]);

impl ValidTokens {
    /// No token kind is valid.
    pub const NONE: ValidTokens = ValidTokens([false; TokenKind::COUNT]);

    /// Every token kind is valid. Hosts use this during error recovery.
    pub const ALL: ValidTokens = ValidTokens([true; TokenKind::COUNT]);

    /// Builds the set from the host's per-symbol flags. Entries past the end
    /// of `flags` are treated as not valid; extra entries are ignored.
    #[must_use]
    pub fn from_slice(flags: &[bool]) -> Self {
        let mut set = Self::NONE;
        for (slot, flag) in set.0.iter_mut().zip(flags) {
            *slot = *flag;
        }
        set
    }

    /// Returns a copy of the set with `kind` added.
    #[must_use]
    pub const fn with(mut self, kind: TokenKind) -> Self {
        self.0[kind as usize] = true;
        self
    }

    /// Returns a copy of the set with `kind` removed.
    #[must_use]
    pub const fn without(mut self, kind: TokenKind) -> Self {
        self.0[kind as usize] = false;
        self
    }

    /// Whether `kind` is in the set.
    #[must_use]
    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0[kind as usize]
    }

    /// Whether every kind is valid, as during host error recovery.
    #[must_use]
    pub fn is_all(self) -> bool {
        self.0.iter().all(|valid| *valid)
    }

    /// Iterates over the kinds in the set, in symbol order.
    pub fn iter(self) -> impl Iterator<Item = TokenKind> {
        TokenKind::ALL.into_iter().filter(move |kind| self.contains(*kind))
    }
}

impl FromIterator<TokenKind> for ValidTokens {
    fn from_iter<I: IntoIterator<Item = TokenKind>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, ValidTokens::with)
    }
}

/// A committed token with the byte range it covers in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token {
    /// What was recognized.
    pub kind: TokenKind,
    /// Byte offset of the first character of the token.
    pub start: usize,
    /// Byte offset one past the last character of the token.
    pub end: usize,
}

impl Token {
    /// Whether the token covers no characters, as `NEWLINE`, `INDENT` and
    /// `DEDENT` usually do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The text of the token within `source`.
    #[must_use]
    pub fn text<'src>(&self, source: &'src str) -> &'src str {
        &source[self.start..self.end]
    }
}
