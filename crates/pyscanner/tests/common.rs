#![allow(missing_docs, dead_code)]

//! A toy host for a Python-like grammar.
//!
//! The host lexes words, punctuation, escapes, interpolation braces and
//! comments itself and asks the scanner for everything else, passing the
//! valid token set a real grammar would pass at each position. Every token is
//! rendered on its own line as `label start..end "text"`.

use core::fmt::Write;

use pyscanner::{DEFAULT_STATE_CAPACITY, Scanner, ScannerOptions, Token, TokenKind, ValidTokens};

/// What the grammar expects next outside of string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
    /// After a statement token: the line may end.
    Statement,
    /// After `NEWLINE` or `DEDENT`: blocks may close, and open after a `:`.
    LineStart { indent_allowed: bool },
    /// After `INDENT`: the block's first statement.
    BlockBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    String,
    Interpolation { braces: usize },
}

struct Host<'src> {
    source: &'src str,
    offset: usize,
    scanner: Scanner,
    modes: Vec<Mode>,
    expect: Expect,
    block_opener: bool,
    restore: bool,
    out: String,
}

/// Tokenizes `source` with one scanner kept alive for the whole run.
pub fn tokenize(source: &str) -> String {
    Host::new(source, false).run()
}

/// Tokenizes `source`, rebuilding the scanner from its serialized state
/// before every scan call.
pub fn tokenize_restoring(source: &str) -> String {
    Host::new(source, true).run()
}

impl<'src> Host<'src> {
    fn new(source: &'src str, restore: bool) -> Self {
        Self {
            source,
            offset: 0,
            scanner: Scanner::new(ScannerOptions::default()),
            modes: Vec::new(),
            expect: Expect::LineStart {
                indent_allowed: false,
            },
            block_opener: false,
            restore,
            out: String::new(),
        }
    }

    fn run(mut self) -> String {
        loop {
            let valid = self.valid();
            if self.restore {
                self.restore_scanner();
            }
            if let Some(token) = self.scanner.scan_at(self.source, self.offset, valid) {
                self.commit(token);
                continue;
            }
            if self.offset >= self.source.len() {
                break;
            }
            let progressed = if self.in_string() {
                self.lex_in_string()
            } else {
                self.skip_extras() || self.lex_code()
            };
            if !progressed {
                break;
            }
        }
        self.out
    }

    fn in_string(&self) -> bool {
        self.modes.last() == Some(&Mode::String)
    }

    fn valid(&self) -> ValidTokens {
        if self.in_string() {
            return ValidTokens::NONE
                .with(TokenKind::StringContent)
                .with(TokenKind::StringEnd);
        }
        let valid = ValidTokens::NONE.with(TokenKind::StringStart);
        match self.expect {
            // Line ends inside an interpolation are not statement ends.
            Expect::Statement if !self.modes.is_empty() => valid,
            Expect::Statement => valid.with(TokenKind::Newline),
            Expect::LineStart { indent_allowed } => {
                let valid = valid.with(TokenKind::Dedent);
                if indent_allowed {
                    valid.with(TokenKind::Indent)
                } else {
                    valid
                }
            }
            Expect::BlockBody => valid,
        }
    }

    fn restore_scanner(&mut self) {
        let mut buffer = [0u8; DEFAULT_STATE_CAPACITY];
        let len = self.scanner.serialize(&mut buffer);
        let mut fresh = Scanner::new(ScannerOptions::default());
        fresh
            .deserialize(&buffer[..len])
            .expect("serialized state restores");
        self.scanner = fresh;
    }

    fn commit(&mut self, token: Token) {
        self.emit(token.kind.name(), token.start, token.end);
        self.offset = token.end;
        match token.kind {
            TokenKind::Newline => {
                self.expect = Expect::LineStart {
                    indent_allowed: core::mem::take(&mut self.block_opener),
                };
            }
            TokenKind::Indent => self.expect = Expect::BlockBody,
            TokenKind::Dedent => {
                self.expect = Expect::LineStart {
                    indent_allowed: false,
                };
            }
            TokenKind::StringStart => self.modes.push(Mode::String),
            TokenKind::StringContent => {}
            TokenKind::StringEnd => {
                self.modes.pop();
                self.statement_token(false);
            }
        }
    }

    /// Lexes the escapes and interpolations the scanner leaves to the
    /// grammar. Anything else is a syntax error that ends the run.
    fn lex_in_string(&mut self) -> bool {
        let source = self.source;
        let rest = &source[self.offset..];
        let mut chars = rest.chars();
        match chars.next() {
            Some('{') => {
                self.modes.push(Mode::Interpolation { braces: 0 });
                self.emit_len("punct", 1);
                self.statement_token(false);
            }
            Some('\\') => {
                let len = 1 + chars.next().map_or(0, char::len_utf8);
                self.emit_len("escape", len);
            }
            _ => {
                self.emit_len("ERROR", rest.len());
                return false;
            }
        }
        true
    }

    /// Skips one run of whitespace, line continuations and at most one
    /// comment.
    fn skip_extras(&mut self) -> bool {
        let source = self.source;
        let start = self.offset;
        loop {
            let rest = &source[self.offset..];
            let trimmed = rest.trim_start_matches([' ', '\t', '\n', '\r', '\x0c']);
            self.offset += rest.len() - trimmed.len();
            if trimmed.starts_with("\\\n") {
                self.offset += 2;
            } else {
                break;
            }
        }
        let rest = &source[self.offset..];
        if rest.starts_with('#') {
            let len = rest.find('\n').unwrap_or(rest.len());
            self.emit_len("comment", len);
        }
        self.offset > start
    }

    fn lex_code(&mut self) -> bool {
        let source = self.source;
        let rest = &source[self.offset..];
        let word = rest
            .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
            .unwrap_or(rest.len());
        if word > 0 {
            self.emit_len("word", word);
            self.statement_token(false);
            return true;
        }

        let Some(ch) = rest.chars().next() else {
            return false;
        };
        let mut closes_interpolation = false;
        if let Some(Mode::Interpolation { braces }) = self.modes.last_mut() {
            match ch {
                '{' => *braces += 1,
                '}' if *braces == 0 => closes_interpolation = true,
                '}' => *braces -= 1,
                _ => {}
            }
        }
        if closes_interpolation {
            self.modes.pop();
        }
        self.emit_len("punct", ch.len_utf8());
        self.statement_token(ch == ':');
        true
    }

    fn statement_token(&mut self, opens_block: bool) {
        self.expect = Expect::Statement;
        self.block_opener = opens_block;
    }

    fn emit_len(&mut self, label: &str, len: usize) {
        self.emit(label, self.offset, self.offset + len);
        self.offset += len;
    }

    fn emit(&mut self, label: &str, start: usize, end: usize) {
        let text = &self.source[start..end];
        writeln!(self.out, "{label} {start}..{end} {text:?}").unwrap();
    }
}
