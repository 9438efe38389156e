//! Tree coordinates.
//!
//! A [`Path`] addresses a node by descending child indices from the root
//! element. The empty path is the root itself. When a path ends one level
//! below a text run, the last component is a character offset into that run
//! rather than a child index; whether it is depends on what the path resolves
//! to (see [`crate::tree::resolve_path`]), not on the path value.
//!
//! All indices and offsets are **0-indexed**. Character offsets count Unicode
//! scalar values (chars), never bytes.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// A sequence of child indices from the root, optionally ending in a text
/// offset.
///
/// # Ordering
///
/// Paths are ordered lexicographically, component by component, which is
/// document order: `[0, 5]` < `[1, 0]`, and a path sorts before any path it
/// is a prefix of (`[0]` < `[0, 3]`).
#[derive(Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    /// The empty path, addressing the root element.
    #[inline]
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Create a path from its components.
    #[inline]
    #[must_use]
    pub const fn new(components: Vec<usize>) -> Self {
        Self(components)
    }

    /// The components as a slice.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Number of components.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the root path.
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The last component, or `None` for the root.
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// The path without its last component. `[0, 1, 2]` → `[0, 1]`.
    ///
    /// Returns `None` for the root, which has no parent.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        self.split_last().map(|(parent, _)| Self(parent.to_vec()))
    }

    /// Split into the parent components and the last one.
    /// `[0, 1, 2]` → `([0, 1], 2)`.
    #[inline]
    #[must_use]
    pub fn split_last(&self) -> Option<(&[usize], usize)> {
        self.0.split_last().map(|(last, parent)| (parent, *last))
    }

    /// Extend the path with a trailing index.
    ///
    /// Used to turn a node address into a text-offset address (`[0, 0]` +
    /// `3` → `[0, 0, 3]`) or to address a child of an element.
    #[must_use]
    pub fn append_offset(&self, index: usize) -> Self {
        let mut components = Vec::with_capacity(self.0.len() + 1);
        components.extend_from_slice(&self.0);
        components.push(index);
        Self(components)
    }

    /// Shift only the last component by `offset`, clamping at zero.
    ///
    /// `[0, 2]` moved by `+3` is `[0, 5]`. Used after text insertion and
    /// deletion to advance the caret by the number of characters changed.
    /// The root path has no last component and is returned unchanged.
    #[must_use]
    pub fn moved_by(&self, offset: isize) -> Self {
        let mut components = self.0.clone();
        if let Some(last) = components.last_mut() {
            *last = last.saturating_add_signed(offset);
        }
        Self(components)
    }

    /// True when `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn is_prefix_of(&self, other: &Self) -> bool {
        other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for Path {
    #[inline]
    fn from(components: Vec<usize>) -> Self {
        Self(components)
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    #[inline]
    fn from(components: [usize; N]) -> Self {
        Self(components.to_vec())
    }
}

impl From<&[usize]> for Path {
    #[inline]
    fn from(components: &[usize]) -> Self {
        Self(components.to_vec())
    }
}

impl AsRef<[usize]> for Path {
    #[inline]
    fn as_ref(&self) -> &[usize] {
        &self.0
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Path{:?}", self.0)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Comma-joined, the same key format the registry logs.
        for (i, component) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- Construction -------------------------------------------------------

    #[test]
    fn root_is_empty() {
        let p = Path::root();
        assert!(p.is_root());
        assert_eq!(p.len(), 0);
        assert_eq!(p.last(), None);
        assert_eq!(p.parent(), None);
    }

    #[test]
    fn from_array_and_vec_agree() {
        assert_eq!(Path::from([0, 1, 2]), Path::new(vec![0, 1, 2]));
        assert_eq!(Path::from(&[3usize][..]), Path::from([3]));
    }

    // -- Parent / last ------------------------------------------------------

    #[test]
    fn parent_drops_last_component() {
        let p = Path::from([0, 1, 2]);
        assert_eq!(p.parent(), Some(Path::from([0, 1])));
        assert_eq!(p.last(), Some(2));
        assert_eq!(p.split_last(), Some((&[0, 1][..], 2)));
    }

    #[test]
    fn parent_of_single_component_is_root() {
        assert_eq!(Path::from([4]).parent(), Some(Path::root()));
    }

    // -- append_offset / moved_by -------------------------------------------

    #[test]
    fn append_offset_extends() {
        assert_eq!(Path::from([0, 0]).append_offset(3), Path::from([0, 0, 3]));
        assert_eq!(Path::root().append_offset(1), Path::from([1]));
    }

    #[test]
    fn moved_by_shifts_only_last() {
        assert_eq!(Path::from([0, 2]).moved_by(3), Path::from([0, 5]));
        assert_eq!(Path::from([1, 4, 6]).moved_by(-2), Path::from([1, 4, 4]));
    }

    #[test]
    fn moved_by_clamps_at_zero() {
        assert_eq!(Path::from([0, 1]).moved_by(-5), Path::from([0, 0]));
    }

    #[test]
    fn moved_by_root_is_noop() {
        assert_eq!(Path::root().moved_by(3), Path::root());
    }

    // -- Ordering -----------------------------------------------------------

    #[test]
    fn ordering_is_lexicographic() {
        assert!(Path::from([0, 1]) < Path::from([0, 3]));
        assert!(Path::from([0, 5]) < Path::from([1, 0]));
        assert!(Path::from([0]) < Path::from([0, 3]));
        assert!(Path::root() < Path::from([0]));
    }

    #[test]
    fn prefix() {
        assert!(Path::from([0]).is_prefix_of(&Path::from([0, 3])));
        assert!(Path::root().is_prefix_of(&Path::from([2])));
        assert!(!Path::from([1]).is_prefix_of(&Path::from([0, 1])));
    }

    // -- Display ------------------------------------------------------------

    #[test]
    fn display_joins_with_commas() {
        assert_eq!(Path::from([0, 1, 2]).to_string(), "0,1,2");
        assert_eq!(Path::root().to_string(), "");
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Path::from([0, 1])), "Path[0, 1]");
    }
}
