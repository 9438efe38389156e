//! Selection: an anchor/focus pair of paths.
//!
//! Like a browser `Selection`, but expressed in document paths. The anchor is
//! where the user started selecting and the focus is where the selection
//! currently ends, so a selection has a direction:
//!
//! - **Forward**: the focus is at or after the anchor in document order.
//! - **Backward**: the user dragged (or shift-arrowed) towards the start.
//!
//! A *range* is just a forward selection. It is derived on demand with
//! [`Selection::as_forward_range`] and never stored, so the user's drag
//! direction is never lost.
//!
//! Only one range is supported. Multiple ranges exist only in Firefox.

use serde::{Deserialize, Serialize};

use crate::path::Path;

/// Anchor and focus paths describing a caret or a range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    /// Where the selection started. Stays put while the focus moves.
    pub anchor: Path,
    /// Where the selection currently ends.
    pub focus: Path,
}

impl Selection {
    /// Create a selection from an anchor and a focus.
    #[inline]
    #[must_use]
    pub const fn new(anchor: Path, focus: Path) -> Self {
        Self { anchor, focus }
    }

    /// A collapsed selection (caret) at `path`.
    #[must_use]
    pub fn caret(path: Path) -> Self {
        Self {
            anchor: path.clone(),
            focus: path,
        }
    }

    // -- Predicates ---------------------------------------------------------

    /// True when the focus is not before the anchor.
    #[inline]
    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.anchor <= self.focus
    }

    /// True when the focus is before the anchor.
    #[inline]
    #[must_use]
    pub fn is_backward(&self) -> bool {
        !self.is_forward()
    }

    /// True when anchor equals focus, i.e. a caret rather than a range.
    #[inline]
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    // -- Derived ranges -----------------------------------------------------

    /// The same selection with the anchor ordered before the focus.
    #[must_use]
    pub fn as_forward_range(&self) -> Self {
        if self.is_forward() {
            self.clone()
        } else {
            Self {
                anchor: self.focus.clone(),
                focus: self.anchor.clone(),
            }
        }
    }

    /// The earlier endpoint in document order.
    #[must_use]
    pub fn start(&self) -> &Path {
        if self.is_forward() { &self.anchor } else { &self.focus }
    }

    /// The later endpoint in document order.
    #[must_use]
    pub fn end(&self) -> &Path {
        if self.is_forward() { &self.focus } else { &self.anchor }
    }

    // -- Movement -----------------------------------------------------------

    /// Shift the anchor's last component by `offset`.
    #[must_use]
    pub fn move_anchor(&self, offset: isize) -> Self {
        Self {
            anchor: self.anchor.moved_by(offset),
            focus: self.focus.clone(),
        }
    }

    /// Shift the focus's last component by `offset`.
    #[must_use]
    pub fn move_focus(&self, offset: isize) -> Self {
        Self {
            anchor: self.anchor.clone(),
            focus: self.focus.moved_by(offset),
        }
    }

    /// Shift both endpoints' last components by `offset`.
    #[must_use]
    pub fn moved_by(&self, offset: isize) -> Self {
        Self {
            anchor: self.anchor.moved_by(offset),
            focus: self.focus.moved_by(offset),
        }
    }

    /// Collapse to the start of the range. A caret is returned as is.
    #[must_use]
    pub fn collapse_to_start(&self) -> Self {
        if self.is_collapsed() {
            return self.clone();
        }
        Self::caret(self.start().clone())
    }

    /// Collapse to the end of the range. A caret is returned as is.
    #[must_use]
    pub fn collapse_to_end(&self) -> Self {
        if self.is_collapsed() {
            return self.clone();
        }
        Self::caret(self.end().clone())
    }

    // -- Re-addressing ------------------------------------------------------

    /// Drop the last component of both paths.
    ///
    /// `{ anchor: [0, 0], focus: [0, 0] }` → `{ anchor: [0], focus: [0] }`.
    /// Returns `None` if either endpoint is the root.
    #[must_use]
    pub fn parent_selection(&self) -> Option<Self> {
        Some(Self {
            anchor: self.anchor.parent()?,
            focus: self.focus.parent()?,
        })
    }

    /// Append a trailing index to both paths.
    ///
    /// `{ anchor: [0], focus: [0] }` with `(1, 1)` →
    /// `{ anchor: [0, 1], focus: [0, 1] }`.
    #[must_use]
    pub fn child_selection(&self, anchor_index: usize, focus_index: usize) -> Self {
        Self {
            anchor: self.anchor.append_offset(anchor_index),
            focus: self.focus.append_offset(focus_index),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
