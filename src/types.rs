//! Core domain types shared by the tree builder and the outline renderer.

use std::fmt;

use serde::Serialize;

use crate::error::Error;

/// Heading nesting level, 1 (most significant) through 6.
/// Newtype so a synthetic root depth of 0 can never sneak into a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Depth(u8);

impl Depth {
    /// Deepest supported heading level.
    pub const MAX: u8 = 6;

    /// Validate a raw heading level.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDepth` for levels outside 1..=6.
    pub const fn new(level: u8) -> Result<Self, Error> {
        if level == 0 || level > Self::MAX {
            return Err(Error::InvalidDepth { depth: level });
        }
        return Ok(Self(level));
    }

    /// The raw level.
    pub const fn get(self) -> u8 {
        return self.0;
    }
}

/// One heading found while scanning a document, in document order.
/// Discarded after every rebuild.
#[derive(Debug, Clone)]
pub struct HeadingRecord<R> {
    /// Nesting level of the heading.
    pub depth: Depth,
    /// Handle back to the originating heading element.
    pub source: R,
    /// Heading text with any number marker removed.
    pub title: String,
}

/// 1-based sibling positions from the outline root down to an entry,
/// e.g. `[2, 3, 1]` for the first child of the third child of the second
/// top-level heading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PathNumber(pub Vec<usize>);

impl PathNumber {
    /// Path of the `position`-th (1-based) child of `self`.
    pub fn child(&self, position: usize) -> Self {
        let mut path = self.0.clone();
        path.push(position);
        return Self(path);
    }
}

impl fmt::Display for PathNumber {
    /// Dot-separated form used for labels: `2.3.1`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for index in &self.0 {
            if !first {
                f.write_str(".")?;
            }
            write!(f, "{index}")?;
            first = false;
        }
        return Ok(());
    }
}
