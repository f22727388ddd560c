#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use pyscanner::{Scanner, ScannerOptions, ScannerState, TokenKind, ValidTokens};
use rand::rngs::SmallRng; // faster than StdRng
use rand::{Rng, SeedableRng};

const HEADER: usize = 5; // 1 flag + 4-byte seed

thread_local! {
    // One SmallRng per thread, seeded once from the host OS
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Pieces of Python-like source that reach every branch of the scanner.
static FRAGMENTS: &[&str] = &[
    "\n", "\n", "  ", "    ", "\t", "\r", "\x0c", "\x0b", "# note\n", "#", "\\\n", "\\", "if x:",
    "y", "=", "(", ")", "'", "\"", "`", "'''", "\"\"\"", "```", "f", "r", "b", "u", "R", "B",
    "F", "U", "{", "{{", "}", "}}", "\\N{DASH}", "\\u", "\\n", "é", "\u{2028}",
];

/// Helper: borrow the thread-local RNG and run a closure with it.
fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if max_size >= HEADER && (size < HEADER || seed.is_multiple_of(10)) {
        data[0] = with_rng(|rng| rng.random::<u8>());
        data[1..HEADER].copy_from_slice(&with_rng(|rng| rng.random::<u32>().to_le_bytes()));

        let mut len = HEADER;
        let fragments = with_rng(|rng| rng.random_range(1..128));
        for _ in 0..fragments {
            let fragment = with_rng(|rng| FRAGMENTS[rng.random_range(0..FRAGMENTS.len())]);
            let fragment = fragment.as_bytes();
            if len + fragment.len() > max_size {
                break;
            }
            data[len..len + fragment.len()].copy_from_slice(fragment);
            len += fragment.len();
        }
        len
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

/// How the host drives the scanner.
#[derive(Debug)]
struct Flags {
    tab_width: u32,
    restore_between_calls: bool,
    grammar_like: bool,
}

impl<'a> Arbitrary<'a> for Flags {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let bits: u8 = u.arbitrary()?;
        Ok(Flags {
            tab_width: u32::from(bits & 0x0f),
            restore_between_calls: bits & 0x10 != 0,
            grammar_like: bits & 0x20 != 0,
        })
    }
}

/// A valid set as a grammar would pass it: string content only inside a
/// literal, and nothing else alongside it.
fn grammar_valid(rng: &mut SmallRng, scanner: &Scanner) -> ValidTokens {
    let in_string = !scanner.state().delimiters.is_empty() && rng.random_bool(0.8);
    if in_string {
        return ValidTokens::NONE
            .with(TokenKind::StringContent)
            .with(TokenKind::StringEnd);
    }
    TokenKind::ALL
        .into_iter()
        .filter(|kind| !matches!(kind, TokenKind::StringContent | TokenKind::StringEnd))
        .filter(|_| rng.random_bool(0.5))
        .collect()
}

fn random_valid(rng: &mut SmallRng) -> ValidTokens {
    let bits: u8 = rng.random();
    TokenKind::ALL
        .into_iter()
        .filter(|kind| bits & (1 << kind.symbol()) != 0)
        .collect()
}

/// Longest varint encoding of one indentation level.
const MAX_LEVEL_LEN: usize = 5;

/// Whether serialization had room for the whole state.
fn fully_written(state: &ScannerState, bytes: &[u8], capacity: usize) -> bool {
    state.delimiters.len() <= 255 && bytes.len() + MAX_LEVEL_LEN <= capacity
}

fn scan_all(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }

    let Ok(flags) = Flags::arbitrary(&mut Unstructured::new(&data[..1])) else {
        return;
    };
    let seed = u32::from_le_bytes(data[1..HEADER].try_into().unwrap());
    let source = String::from_utf8_lossy(&data[HEADER..]).into_owned();

    let options = ScannerOptions {
        tab_width: flags.tab_width,
        check_invariants: true,
        ..Default::default()
    };
    let mut rng = SmallRng::seed_from_u64(u64::from(seed));
    let mut scanner = Scanner::new(options);
    let mut offset = 0;

    // Zero-width tokens step one byte like declines, so the walk always ends.
    for _ in 0..source.len() * 4 + 16 {
        if flags.restore_between_calls {
            let bytes = scanner.to_bytes();
            assert!(bytes.len() <= options.state_capacity);
            // Whatever the scanner writes must decode, if only in part.
            let state = ScannerState::deserialize(&bytes, options.state_capacity)
                .expect("serialized state decodes");
            if fully_written(scanner.state(), &bytes, options.state_capacity) {
                assert_eq!(&state, scanner.state());
            }
            scanner = Scanner::with_state(options, state);
        }

        let valid = if flags.grammar_like {
            grammar_valid(&mut rng, &scanner)
        } else {
            random_valid(&mut rng)
        };
        let before = scanner.state().clone();
        match scanner.scan_at(&source, offset, valid) {
            Some(token) => {
                assert!(offset <= token.start && token.start <= token.end);
                assert!(token.end <= source.len());
                offset = if token.end > offset { token.end } else { offset + 1 };
            }
            None => {
                assert_eq!(scanner.state(), &before);
                offset += 1;
            }
        }
        if offset > source.len() {
            break;
        }
    }
}

fuzz_target!(|data: &[u8]| scan_all(data));
