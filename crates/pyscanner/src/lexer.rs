//! The character stream the scanner reads from.
//!
//! The host owns the input; the scanner only sees the next character and can
//! advance past it or mark the current position as the end of the token. A
//! scan call may mark the end several times while it looks further ahead, and
//! the last mark before it returns is the one the host commits.

use crate::{Token, TokenKind};

/// Read-only, advance-only access to the host's input.
pub trait Lexer {
    /// The next unconsumed character, or `None` at the end of the input.
    fn lookahead(&self) -> Option<char>;

    /// Moves past the lookahead character. With `skip` set the character is
    /// whitespace in front of the token rather than part of it. Does nothing
    /// at the end of the input.
    fn advance(&mut self, skip: bool);

    /// Records the current position as the end of the token.
    fn mark_end(&mut self);

    /// Advances past a character that belongs to the token.
    #[inline]
    fn consume(&mut self) {
        self.advance(false);
    }

    /// Advances past a character in front of the token.
    #[inline]
    fn skip(&mut self) {
        self.advance(true);
    }

    /// Whether the lookahead is `ch`.
    #[inline]
    fn at(&self, ch: char) -> bool {
        self.lookahead() == Some(ch)
    }
}

/// A [`Lexer`] over an in-memory UTF-8 buffer.
///
/// Tracks two cursors: the lookahead cursor, which every `advance` moves, and
/// the committed end, which only `mark_end` moves. Invalid UTF-8 decodes as
/// U+FFFD.
///
/// ```rust
/// use pyscanner::{Lexer, SourceLexer, TokenKind};
///
/// let mut lexer = SourceLexer::new("  abc", 0);
/// lexer.skip();
/// lexer.skip();
/// lexer.consume();
/// lexer.mark_end();
/// lexer.consume();
/// let token = lexer.token(TokenKind::StringContent);
/// assert_eq!((token.start, token.end), (2, 3));
/// ```
#[derive(Debug, Clone)]
pub struct SourceLexer<'src> {
    source: &'src [u8],
    cursor: usize,
    start: usize,
    end: Option<usize>,
}

impl<'src> SourceLexer<'src> {
    /// Starts reading `source` at byte `offset`.
    #[must_use]
    pub fn new(source: &'src str, offset: usize) -> Self {
        Self::from_bytes(source.as_bytes(), offset)
    }

    /// Starts reading possibly invalid UTF-8 at byte `offset`.
    #[must_use]
    pub fn from_bytes(source: &'src [u8], offset: usize) -> Self {
        let offset = offset.min(source.len());
        Self {
            source,
            cursor: offset,
            start: offset,
            end: None,
        }
    }

    /// Byte offset of the lookahead character.
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Byte offset of the last `mark_end`, if any.
    #[must_use]
    pub fn marked_end(&self) -> Option<usize> {
        self.end
    }

    /// The range the host commits for a token of `kind`.
    ///
    /// The token ends at the last mark, or at the lookahead cursor if the end
    /// was never marked. A mark placed before skipped whitespace yields a
    /// zero-width token at the mark.
    #[must_use]
    pub fn token(&self, kind: TokenKind) -> Token {
        let end = self.end.unwrap_or(self.cursor);
        Token {
            kind,
            start: self.start.min(end),
            end,
        }
    }

    fn decode(&self) -> Option<(char, usize)> {
        let rest = self.source.get(self.cursor..)?;
        let (ch, len) = bstr::decode_utf8(rest);
        if len == 0 {
            return None;
        }
        Some((ch.unwrap_or('\u{FFFD}'), len))
    }
}

impl Lexer for SourceLexer<'_> {
    fn lookahead(&self) -> Option<char> {
        self.decode().map(|(ch, _)| ch)
    }

    fn advance(&mut self, skip: bool) {
        let Some((_, len)) = self.decode() else {
            return;
        };
        self.cursor += len;
        if skip {
            self.start = self.cursor;
        }
    }

    fn mark_end(&mut self) {
        debug_assert!(self.end.is_none_or(|end| end <= self.cursor));
        self.end = Some(self.cursor);
    }
}
