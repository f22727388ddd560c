//! Scan driver: picks the sub-scanner for the current position and commits to
//! at most one token.
//!
//! Two situations are told apart by the valid token set alone:
//! - Inside a string literal the grammar accepts `STRING_CONTENT` but never
//!   `INDENT`, so literal text is scanned against the innermost delimiter.
//! - Everywhere else the scanner skips blanks, comments and line
//!   continuations, then decides between `INDENT`, `DEDENT` and `NEWLINE` if
//!   a line boundary was crossed, and finally tries to open a string literal.
//!
//! Declining is the only failure signal. The host then tries its own lexical
//! rules at the same position or reports a syntax error there.

use alloc::vec::Vec;

use crate::{
    Delimiter, Lexer, ScannerOptions, ScannerState, SourceLexer, StateError, Token, TokenKind,
    ValidTokens,
};

mod string;

/// An external scanner instance, owning its indentation and delimiter
/// stacks for the lifetime of one parse session.
///
/// ```rust
/// use pyscanner::{Scanner, ScannerOptions, TokenKind, ValidTokens};
///
/// let source = "if x:\n    y\n";
/// let mut scanner = Scanner::new(ScannerOptions::default());
/// let valid = ValidTokens::NONE.with(TokenKind::Indent);
///
/// let token = scanner.scan_at(source, 5, valid).unwrap();
/// assert_eq!(token.kind, TokenKind::Indent);
/// assert_eq!(scanner.state().indents.top(), 4);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scanner {
    state: ScannerState,
    options: ScannerOptions,
}

/// What the blank-skipping pass saw in front of the next token.
#[derive(Debug, Clone, Copy, Default)]
struct Blanks {
    found_end_of_line: bool,
    indent: u32,
    first_comment_indent: Option<u32>,
}

impl Scanner {
    /// Creates a scanner at the top level with no open literal.
    #[must_use]
    pub fn new(options: ScannerOptions) -> Self {
        Self {
            state: ScannerState::new(),
            options,
        }
    }

    /// Creates a scanner resuming from `state`.
    #[must_use]
    pub fn with_state(options: ScannerOptions, state: ScannerState) -> Self {
        Self { state, options }
    }

    /// The stacks carried between scan calls.
    #[must_use]
    pub fn state(&self) -> &ScannerState {
        &self.state
    }

    /// The configuration this scanner was created with.
    #[must_use]
    pub fn options(&self) -> &ScannerOptions {
        &self.options
    }

    /// Returns to the state of a freshly created scanner.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    /// Scans one token at the lexer's position.
    ///
    /// Returns the committed kind, with the token's end left at the lexer's
    /// last `mark_end`, or `None` if no token in `valid` starts here. The
    /// stacks change only when a token is committed.
    pub fn scan<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidTokens,
    ) -> Option<TokenKind> {
        let result = self.scan_token(lexer, valid);
        match result {
            Some(kind) => tracing::trace!(token = %kind, "scanned token"),
            None => tracing::trace!("declined"),
        }
        #[cfg(any(test, feature = "fuzzing"))]
        if self.options.check_invariants {
            self.assert_invariants();
        }
        result
    }

    /// Scans one token of `source` starting at byte `offset`.
    pub fn scan_at(&mut self, source: &str, offset: usize, valid: ValidTokens) -> Option<Token> {
        let mut lexer = SourceLexer::new(source, offset);
        let kind = self.scan(&mut lexer, valid)?;
        Some(lexer.token(kind))
    }

    /// Writes the state into `buffer`, using at most the configured
    /// capacity, and returns the number of bytes written.
    pub fn serialize(&self, buffer: &mut [u8]) -> usize {
        let len = buffer.len().min(self.options.state_capacity);
        self.state.serialize_into(&mut buffer[..len])
    }

    /// The serialized state as an owned buffer.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.state.to_bytes(self.options.state_capacity)
    }

    /// Restores a state written by [`serialize`](Self::serialize). An empty
    /// buffer restores the initial state.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] for malformed input, leaving the current state
    /// untouched.
    pub fn deserialize(&mut self, bytes: &[u8]) -> Result<(), StateError> {
        self.state = ScannerState::deserialize(bytes, self.options.state_capacity)?;
        Ok(())
    }

    /// Panics if either stack breaks its invariants.
    #[cfg(any(test, feature = "fuzzing"))]
    pub fn assert_invariants(&self) {
        assert!(
            self.state.indents.is_well_formed(),
            "indent stack out of order: {:?}",
            self.state.indents
        );
        for delimiter in self.state.delimiters.as_slice() {
            assert!(
                Delimiter::from_bits(delimiter.bits()).is_some(),
                "malformed delimiter {delimiter:?}"
            );
        }
    }

    fn scan_token<L: Lexer + ?Sized>(
        &mut self,
        lexer: &mut L,
        valid: ValidTokens,
    ) -> Option<TokenKind> {
        if valid.contains(TokenKind::StringContent) && !valid.contains(TokenKind::Indent) {
            if let Some(delimiter) = self.state.delimiters.top() {
                return self.scan_string_content(lexer, delimiter);
            }
        }

        lexer.mark_end();
        let blanks = self.skip_blanks(lexer)?;

        if blanks.found_end_of_line {
            if let Some(kind) = self.scan_line_boundary(blanks, valid) {
                return Some(kind);
            }
        }

        if blanks.first_comment_indent.is_none() && valid.contains(TokenKind::StringStart) {
            return self.scan_string_start(lexer);
        }

        None
    }

    /// Skips spaces, tabs, line breaks, comments and line continuations,
    /// measuring the indentation of the last line entered. Returns `None` on a
    /// backslash that does not continue the line.
    fn skip_blanks<L: Lexer + ?Sized>(&self, lexer: &mut L) -> Option<Blanks> {
        let mut blanks = Blanks::default();
        loop {
            match lexer.lookahead() {
                Some('\n') => {
                    blanks.found_end_of_line = true;
                    blanks.indent = 0;
                    lexer.skip();
                }
                Some(' ') => {
                    blanks.indent = blanks.indent.saturating_add(1);
                    lexer.skip();
                }
                Some('\t') => {
                    blanks.indent = blanks.indent.saturating_add(self.options.tab_width);
                    lexer.skip();
                }
                Some('\r' | '\x0c') => {
                    blanks.indent = 0;
                    lexer.skip();
                }
                Some('#') => {
                    blanks.first_comment_indent.get_or_insert(blanks.indent);
                    while lexer.lookahead().is_some_and(|ch| ch != '\n') {
                        lexer.skip();
                    }
                    lexer.skip();
                    blanks.indent = 0;
                }
                Some('\\') => {
                    lexer.skip();
                    let space = lexer.lookahead().filter(|&ch| is_continuation_space(ch))?;
                    lexer.skip();
                    if space == '\r' && lexer.at('\n') {
                        lexer.skip();
                    }
                }
                None => {
                    blanks.found_end_of_line = true;
                    blanks.indent = 0;
                    break;
                }
                Some(_) => break,
            }
        }
        Some(blanks)
    }

    fn scan_line_boundary(&mut self, blanks: Blanks, valid: ValidTokens) -> Option<TokenKind> {
        let current = self.state.indents.top();

        if valid.contains(TokenKind::Indent) && blanks.indent > current {
            self.state.indents.push(blanks.indent);
            return Some(TokenKind::Indent);
        }

        // A comment indented like the current block keeps the block open
        // until a line of code shows the lower indentation.
        if valid.contains(TokenKind::Dedent)
            && blanks.indent < current
            && blanks.first_comment_indent.is_none_or(|indent| indent < current)
        {
            self.state.indents.pop();
            return Some(TokenKind::Dedent);
        }

        valid
            .contains(TokenKind::Newline)
            .then_some(TokenKind::Newline)
    }

    fn scan_string_start<L: Lexer + ?Sized>(&mut self, lexer: &mut L) -> Option<TokenKind> {
        let mut delimiter = Delimiter::new();
        let mut has_prefix = false;
        while let Some(letter) = lexer.lookahead() {
            if !delimiter.apply_prefix(letter) {
                break;
            }
            has_prefix = true;
            lexer.consume();
        }

        let quote = lexer.lookahead()?;
        if !delimiter.set_end_character(quote) {
            if has_prefix {
                tracing::trace!("string prefix without a quote");
            }
            return None;
        }
        lexer.consume();
        lexer.mark_end();

        if lexer.at(quote) {
            lexer.consume();
            if lexer.at(quote) {
                lexer.consume();
                lexer.mark_end();
                delimiter.set_triple();
            }
        }

        self.state.delimiters.push(delimiter);
        Some(TokenKind::StringStart)
    }
}

/// Whitespace that may follow a line-continuation backslash.
fn is_continuation_space(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\x0b' | '\x0c' | '\r')
}
