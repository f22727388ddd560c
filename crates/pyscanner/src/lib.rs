//! An incremental external scanner for indentation-sensitive grammars.
//!
//! The scanner sits beside a context-free grammar and produces the tokens the
//! grammar cannot describe on its own: `NEWLINE`, `INDENT` and `DEDENT` for
//! significant whitespace, and `STRING_START`, `STRING_CONTENT` and
//! `STRING_END` for string literals with prefixes, triple quotes and
//! interpolation.
//!
//! The host parsing engine drives it one position at a time: it passes the set
//! of token kinds its grammar currently accepts ([`ValidTokens`]) together
//! with a character stream ([`Lexer`]), and the scanner either commits to one
//! [`TokenKind`] or declines. Between calls the host may persist the scanner
//! with [`Scanner::serialize`] and restore it with [`Scanner::deserialize`].
//!
//! ```rust
//! use pyscanner::{Scanner, ScannerOptions, TokenKind, ValidTokens};
//!
//! let mut scanner = Scanner::new(ScannerOptions::default());
//! let valid = ValidTokens::NONE.with(TokenKind::StringStart);
//! let token = scanner.scan_at("f'''hi'''", 0, valid).unwrap();
//! assert_eq!(token.kind, TokenKind::StringStart);
//! assert_eq!((token.start, token.end), (0, 4));
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod delimiter;
mod error;
mod indent;
mod lexer;
mod options;
mod scanner;
mod state;
mod token;


pub use delimiter::{Delimiter, DelimiterStack};
pub use error::StateError;
pub use indent::IndentStack;
pub use lexer::{Lexer, SourceLexer};
pub use options::ScannerOptions;
pub use scanner::Scanner;
pub use state::{DEFAULT_STATE_CAPACITY, ScannerState};
pub use token::{Token, TokenKind, ValidTokens};
