//! The five entry points a tree-sitter parser looks up for the external
//! scanner of a grammar named `python`.
//!
//! Link the `staticlib` or `cdylib` output into the generated parser in place
//! of a `scanner.c`. The payload handed to the parser is a boxed
//! [`Scanner`]; every other function receives it back.

use core::ffi::{c_char, c_uint, c_void};
use core::slice;

use pyscanner::{Lexer, Scanner, ScannerOptions, TokenKind, ValidTokens};

/// Size of the buffer tree-sitter passes to `serialize`.
pub const TREE_SITTER_SERIALIZATION_BUFFER_SIZE: usize = 1024;

/// The lexer tree-sitter passes to `scan`, laid out as in `tree_sitter/parser.h`.
#[repr(C)]
#[allow(clippy::upper_case_acronyms)]
pub struct TSLexer {
    /// The next character, or 0 at the end of the input.
    pub lookahead: i32,
    /// Symbol of the recognized token, written before `scan` returns `true`.
    pub result_symbol: u16,
    /// Moves past the lookahead; `true` treats it as whitespace.
    pub advance: unsafe extern "C" fn(*mut TSLexer, bool),
    /// Records the current position as the end of the token.
    pub mark_end: unsafe extern "C" fn(*mut TSLexer),
    /// Column of the lookahead.
    pub get_column: unsafe extern "C" fn(*mut TSLexer) -> u32,
    /// Whether the lookahead starts an included range.
    pub is_at_included_range_start: unsafe extern "C" fn(*const TSLexer) -> bool,
    /// Whether the input is exhausted.
    pub eof: unsafe extern "C" fn(*const TSLexer) -> bool,
    /// Debug logger, present in newer runtimes.
    pub log: Option<unsafe extern "C" fn(*const TSLexer, *const c_char, ...)>,
}

/// Adapts a host [`TSLexer`] to the scanner's [`Lexer`].
struct HostLexer {
    raw: *mut TSLexer,
}

impl HostLexer {
    /// # Safety
    ///
    /// `raw` must point to a live `TSLexer` for as long as the adapter is
    /// used.
    unsafe fn new(raw: *mut TSLexer) -> Self {
        Self { raw }
    }
}

impl Lexer for HostLexer {
    fn lookahead(&self) -> Option<char> {
        // SAFETY: `raw` is live per `HostLexer::new`.
        let (at_end, lookahead) = unsafe { (((*self.raw).eof)(self.raw), (*self.raw).lookahead) };
        if at_end {
            return None;
        }
        let ch = u32::try_from(lookahead).ok().and_then(char::from_u32);
        Some(ch.unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    fn advance(&mut self, skip: bool) {
        // SAFETY: `raw` is live per `HostLexer::new`.
        unsafe { ((*self.raw).advance)(self.raw, skip) }
    }

    fn mark_end(&mut self) {
        // SAFETY: `raw` is live per `HostLexer::new`.
        unsafe { ((*self.raw).mark_end)(self.raw) }
    }
}

/// Allocates a scanner with default options.
#[unsafe(no_mangle)]
pub extern "C" fn tree_sitter_python_external_scanner_create() -> *mut c_void {
    Box::into_raw(Box::new(Scanner::new(ScannerOptions::default()))).cast()
}

/// Frees a scanner returned by
/// [`tree_sitter_python_external_scanner_create`].
///
/// # Safety
///
/// `payload` must come from `create` and must not be used afterwards.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_python_external_scanner_destroy(payload: *mut c_void) {
    if payload.is_null() {
        return;
    }
    // SAFETY: the caller hands back ownership of the box made by `create`.
    drop(unsafe { Box::from_raw(payload.cast::<Scanner>()) });
}

/// Scans one token, storing its symbol in `lexer.result_symbol`.
///
/// # Safety
///
/// `payload` must come from `create`, `lexer` must be live for the call, and
/// `valid_symbols` must point to one flag per external token.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_python_external_scanner_scan(
    payload: *mut c_void,
    lexer: *mut TSLexer,
    valid_symbols: *const bool,
) -> bool {
    // SAFETY: guaranteed by the caller.
    let (scanner, flags) = unsafe {
        (
            &mut *payload.cast::<Scanner>(),
            slice::from_raw_parts(valid_symbols, TokenKind::COUNT),
        )
    };
    // SAFETY: `lexer` outlives the adapter, which is dropped before returning.
    let mut host = unsafe { HostLexer::new(lexer) };
    let Some(kind) = scanner.scan(&mut host, ValidTokens::from_slice(flags)) else {
        return false;
    };
    // SAFETY: `lexer` is live for the call.
    unsafe { (*lexer).result_symbol = kind.symbol() };
    true
}

/// Writes the scanner state into `buffer` and returns its length.
///
/// # Safety
///
/// `payload` must come from `create` and `buffer` must be writable for
/// [`TREE_SITTER_SERIALIZATION_BUFFER_SIZE`] bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_python_external_scanner_serialize(
    payload: *mut c_void,
    buffer: *mut c_char,
) -> c_uint {
    // SAFETY: guaranteed by the caller.
    let (scanner, buffer) = unsafe {
        (
            &*payload.cast::<Scanner>(),
            slice::from_raw_parts_mut(buffer.cast::<u8>(), TREE_SITTER_SERIALIZATION_BUFFER_SIZE),
        )
    };
    let len = scanner.serialize(buffer);
    c_uint::try_from(len).unwrap_or(0)
}

/// Restores a state written by `serialize`. An empty buffer restores the
/// initial state, and so does a malformed one, after logging why.
///
/// # Safety
///
/// `payload` must come from `create` and `buffer` must be readable for
/// `length` bytes.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn tree_sitter_python_external_scanner_deserialize(
    payload: *mut c_void,
    buffer: *const c_char,
    length: c_uint,
) {
    // SAFETY: guaranteed by the caller.
    let scanner = unsafe { &mut *payload.cast::<Scanner>() };
    let bytes = match usize::try_from(length) {
        Ok(len) if len > 0 && !buffer.is_null() => {
            // SAFETY: guaranteed by the caller.
            unsafe { slice::from_raw_parts(buffer.cast::<u8>(), len) }
        }
        _ => &[],
    };
    if let Err(error) = scanner.deserialize(bytes) {
        tracing::warn!(%error, "discarding malformed scanner state");
        scanner.reset();
    }
}
