//! Positional references into the filtered views.

use crate::command::{CommandError, CommandResult};
use std::fmt::{Display, Formatter};

/// Non-negative position in a displayed list.
///
/// Stored zero-based; user-facing input and messages are one-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Index {
    zero_based: usize,
}

impl Index {
    pub fn from_zero_based(zero_based: usize) -> Self {
        Self { zero_based }
    }

    /// Returns `None` for `0`, which has no one-based meaning.
    pub fn from_one_based(one_based: usize) -> Option<Self> {
        one_based.checked_sub(1).map(Self::from_zero_based)
    }

    pub fn zero_based(self) -> usize {
        self.zero_based
    }

    pub fn one_based(self) -> usize {
        self.zero_based + 1
    }

    /// Picks the entry this index points at in `view`.
    ///
    /// # Errors
    /// - `InvalidIndex` when the index is past the end of `view`.
    pub fn resolve<'a, T>(self, view: &[&'a T], target: IndexTarget) -> CommandResult<&'a T> {
        view.get(self.zero_based)
            .copied()
            .ok_or(CommandError::InvalidIndex {
                target,
                index: self,
                len: view.len(),
            })
    }
}

/// Which view an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTarget {
    Person,
    Event,
}

impl Display for IndexTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Person => write!(f, "person"),
            Self::Event => write!(f, "event"),
        }
    }
}
