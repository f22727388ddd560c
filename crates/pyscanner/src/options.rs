use crate::state::DEFAULT_STATE_CAPACITY;

/// Configuration for a [`Scanner`](crate::Scanner).
///
/// # Examples
///
/// ```rust
/// use pyscanner::{Scanner, ScannerOptions};
///
/// let scanner = Scanner::new(ScannerOptions {
///     tab_width: 4,
///     ..Default::default()
/// });
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ScannerOptions {
    /// Columns a tab character adds to the indentation of a line.
    ///
    /// Carriage returns and form feeds reset the running width to zero
    /// regardless of this setting.
    ///
    /// # Default
    ///
    /// `8`
    pub tab_width: u32,

    /// Size in bytes of the buffer the host provides for serialized state.
    ///
    /// Serialization never writes more than this many bytes, and
    /// deserialization rejects longer buffers.
    ///
    /// # Default
    ///
    /// [`DEFAULT_STATE_CAPACITY`]
    pub state_capacity: usize,

    #[cfg(any(test, feature = "fuzzing"))]
    /// Assert the stack invariants after every scan call.
    ///
    /// Enabled only in test and fuzzing builds.
    pub check_invariants: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            tab_width: 8,
            state_capacity: DEFAULT_STATE_CAPACITY,
            #[cfg(any(test, feature = "fuzzing"))]
            check_invariants: false,
        }
    }
}
