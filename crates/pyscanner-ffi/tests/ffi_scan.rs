#![expect(missing_docs)]

use core::ffi::{c_char, c_void};

use pyscanner_ffi::{
    TREE_SITTER_SERIALIZATION_BUFFER_SIZE, TSLexer, tree_sitter_python_external_scanner_create,
    tree_sitter_python_external_scanner_deserialize, tree_sitter_python_external_scanner_destroy,
    tree_sitter_python_external_scanner_scan, tree_sitter_python_external_scanner_serialize,
};

/// A host lexer over a string, with the `TSLexer` header first so the
/// callbacks can recover the whole struct.
#[repr(C)]
struct FakeLexer {
    base: TSLexer,
    source: Vec<char>,
    cursor: usize,
    start: usize,
    end: usize,
}

impl FakeLexer {
    fn new(source: &str, cursor: usize) -> Box<Self> {
        let mut lexer = Box::new(Self {
            base: TSLexer {
                lookahead: 0,
                result_symbol: u16::MAX,
                advance,
                mark_end,
                get_column,
                is_at_included_range_start,
                eof,
                log: None,
            },
            source: source.chars().collect(),
            cursor,
            start: cursor,
            end: cursor,
        });
        lexer.sync();
        lexer
    }

    fn sync(&mut self) {
        self.base.lookahead = self
            .source
            .get(self.cursor)
            .map_or(0, |&ch| i32::try_from(u32::from(ch)).unwrap());
    }

    fn raw(&mut self) -> *mut TSLexer {
        (&raw mut *self).cast()
    }
}

unsafe fn fake<'a>(lexer: *const TSLexer) -> &'a mut FakeLexer {
    unsafe { &mut *lexer.cast::<FakeLexer>().cast_mut() }
}

extern "C" fn advance(lexer: *mut TSLexer, skip: bool) {
    let lexer = unsafe { fake(lexer) };
    lexer.cursor = (lexer.cursor + 1).min(lexer.source.len());
    if skip {
        lexer.start = lexer.cursor;
    }
    lexer.sync();
}

extern "C" fn mark_end(lexer: *mut TSLexer) {
    let lexer = unsafe { fake(lexer) };
    lexer.end = lexer.cursor;
}

extern "C" fn get_column(_: *mut TSLexer) -> u32 {
    0
}

extern "C" fn is_at_included_range_start(_: *const TSLexer) -> bool {
    false
}

extern "C" fn eof(lexer: *const TSLexer) -> bool {
    let lexer = unsafe { fake(lexer) };
    lexer.cursor >= lexer.source.len()
}

fn scan(payload: *mut c_void, lexer: &mut FakeLexer, valid: [bool; 6]) -> Option<u16> {
    let found = unsafe {
        tree_sitter_python_external_scanner_scan(payload, lexer.raw(), valid.as_ptr())
    };
    found.then_some(lexer.base.result_symbol)
}

fn serialize(payload: *mut c_void) -> Vec<u8> {
    let mut buffer = [0u8; TREE_SITTER_SERIALIZATION_BUFFER_SIZE];
    let len = unsafe {
        tree_sitter_python_external_scanner_serialize(payload, buffer.as_mut_ptr().cast::<c_char>())
    };
    buffer[..len as usize].to_vec()
}

fn deserialize(payload: *mut c_void, bytes: &[u8]) {
    unsafe {
        tree_sitter_python_external_scanner_deserialize(
            payload,
            bytes.as_ptr().cast::<c_char>(),
            u32::try_from(bytes.len()).unwrap(),
        );
    }
}

const INDENT_ONLY: [bool; 6] = [false, true, false, false, false, false];
const STATEMENT_END: [bool; 6] = [true, false, false, true, false, false];
const LINE_START: [bool; 6] = [false, false, true, true, false, false];
const IN_STRING: [bool; 6] = [false, false, false, false, true, true];

#[test]
fn scans_through_the_c_abi() {
    let payload = tree_sitter_python_external_scanner_create();

    let mut lexer = FakeLexer::new("if x:\n    y", 5);
    assert_eq!(scan(payload, &mut lexer, INDENT_ONLY), Some(1));
    assert_eq!((lexer.start, lexer.end), (10, 5));
    assert_eq!(serialize(payload), [0, 4]);

    let mut lexer = FakeLexer::new("y", 1);
    assert_eq!(scan(payload, &mut lexer, STATEMENT_END), Some(0));
    assert_eq!(scan(payload, &mut lexer, LINE_START), Some(2));
    assert_eq!(serialize(payload), [0]);

    unsafe { tree_sitter_python_external_scanner_destroy(payload) };
}

#[test]
fn string_state_crosses_scanner_instances() {
    let first = tree_sitter_python_external_scanner_create();
    let mut lexer = FakeLexer::new("'''a'''", 0);
    assert_eq!(scan(first, &mut lexer, LINE_START), Some(3));
    assert_eq!(lexer.end, 3);
    let state = serialize(first);
    assert_eq!(state, [1, 0b0010_0001]);
    unsafe { tree_sitter_python_external_scanner_destroy(first) };

    let second = tree_sitter_python_external_scanner_create();
    deserialize(second, &state);
    let mut lexer = FakeLexer::new("'''a'''", 3);
    assert_eq!(scan(second, &mut lexer, IN_STRING), Some(4));
    assert_eq!(lexer.end, 4);
    let mut lexer = FakeLexer::new("'''a'''", 4);
    assert_eq!(scan(second, &mut lexer, IN_STRING), Some(5));
    assert_eq!(lexer.end, 7);
    assert_eq!(serialize(second), [0]);
    unsafe { tree_sitter_python_external_scanner_destroy(second) };
}

#[test]
fn malformed_state_restores_the_initial_state() {
    let payload = tree_sitter_python_external_scanner_create();
    deserialize(payload, &[0, 4]);
    assert_eq!(serialize(payload), [0, 4]);

    deserialize(payload, &[0, 8, 4]);
    assert_eq!(serialize(payload), [0]);

    deserialize(payload, &[0, 4]);
    deserialize(payload, &[]);
    assert_eq!(serialize(payload), [0]);

    unsafe { tree_sitter_python_external_scanner_destroy(payload) };
}

#[test]
fn deep_indentation_keeps_open_literals() {
    let payload = tree_sitter_python_external_scanner_create();
    let mut source = String::from("\n");
    source.push_str(&" ".repeat(300));
    source.push_str("f'{x}'");

    let mut lexer = FakeLexer::new(&source, 0);
    assert_eq!(scan(payload, &mut lexer, INDENT_ONLY), Some(1));
    let mut lexer = FakeLexer::new(&source, 301);
    assert_eq!(scan(payload, &mut lexer, LINE_START), Some(3));

    let state = serialize(payload);
    assert_eq!(state, [1, 0b0001_0001, 0xac, 0x02]);
    let restored = tree_sitter_python_external_scanner_create();
    deserialize(restored, &state);
    assert_eq!(serialize(restored), state);

    unsafe { tree_sitter_python_external_scanner_destroy(payload) };
    unsafe { tree_sitter_python_external_scanner_destroy(restored) };
}

#[test]
fn destroying_null_is_a_no_op() {
    unsafe { tree_sitter_python_external_scanner_destroy(core::ptr::null_mut()) };
}
