use alloc::{vec, vec::Vec};

use crate::StateError;

/// Indentation widths of the enclosing blocks, outermost first.
///
/// The stack is never empty, its bottom is always column zero, and its
/// entries strictly increase from bottom to top. The top is the indentation
/// the current block requires.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "Vec<u32>", into = "Vec<u32>"))]
pub struct IndentStack(Vec<u32>);

impl Default for IndentStack {
    fn default() -> Self {
        IndentStack(vec![0])
    }
}

impl IndentStack {
    /// A stack holding only the top-level column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The indentation the current block requires.
    #[must_use]
    pub fn top(&self) -> u32 {
        self.0.last().copied().unwrap_or(0)
    }

    /// Opens a block at `level`. Returns `false`, leaving the stack as it
    /// was, unless `level` is deeper than the current block.
    pub fn push(&mut self, level: u32) -> bool {
        if level <= self.top() {
            return false;
        }
        self.0.push(level);
        true
    }

    /// Closes the current block. The top-level column is never popped.
    pub fn pop(&mut self) -> Option<u32> {
        if self.0.len() > 1 { self.0.pop() } else { None }
    }

    /// Number of entries, including the top-level column.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; the top-level column is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of open blocks above the top level.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    /// Whether `level` is the indentation of the top level or an open block.
    #[must_use]
    pub fn contains(&self, level: u32) -> bool {
        self.0.binary_search(&level).is_ok()
    }

    /// All entries, the top-level column first.
    #[must_use]
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// The levels of the open blocks, without the top-level column.
    #[must_use]
    pub fn blocks(&self) -> &[u32] {
        &self.0[1..]
    }

    pub(crate) fn reset(&mut self) {
        self.0.truncate(1);
    }

    /// Whether the stack satisfies its ordering invariant.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.0.first() == Some(&0) && self.0.windows(2).all(|pair| pair[0] < pair[1])
    }
}

impl TryFrom<Vec<u32>> for IndentStack {
    type Error = StateError;

    /// Accepts the full stack, which must start with the top-level column.
    fn try_from(levels: Vec<u32>) -> Result<Self, Self::Error> {
        let Some((&0, blocks)) = levels.split_first() else {
            return Err(StateError::MissingBaseIndent);
        };
        let mut stack = IndentStack::new();
        for (depth, &level) in (1..).zip(blocks) {
            if !stack.push(level) {
                return Err(StateError::NonIncreasingIndent { depth, level });
            }
        }
        Ok(stack)
    }
}

impl From<IndentStack> for Vec<u32> {
    fn from(stack: IndentStack) -> Self {
        stack.0
    }
}
