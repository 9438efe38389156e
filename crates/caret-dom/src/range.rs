// SPDX-License-Identifier: MIT
//
// Boundary points, ranges and the selection.
//
// A boundary point is a container node plus an offset: a char offset when
// the container is a text node, a child index when it is an element. A
// range always runs from `start` to `end` in document order; only the
// selection has a direction (anchor and focus).

use crate::node::DomNodeId;

// ─── DomPoint ────────────────────────────────────────────────────────────────

/// A position in the native tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomPoint {
    pub node: DomNodeId,
    pub offset: usize,
}

impl DomPoint {
    #[inline]
    #[must_use]
    pub const fn new(node: DomNodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

// ─── DomRange ────────────────────────────────────────────────────────────────

/// A start/end pair. `start` is expected to precede `end`; implementations
/// coerce a reversed range to forward when it is added to the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomRange {
    pub start: DomPoint,
    pub end: DomPoint,
}

impl DomRange {
    #[inline]
    #[must_use]
    pub const fn new(start: DomPoint, end: DomPoint) -> Self {
        Self { start, end }
    }

    /// A collapsed range at `point`.
    #[inline]
    #[must_use]
    pub const fn caret(point: DomPoint) -> Self {
        Self {
            start: point,
            end: point,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Collapse onto the end point, as `Range.collapse(false)`.
    #[must_use]
    pub const fn collapsed_to_end(&self) -> Self {
        Self::caret(self.end)
    }

    /// Collapse onto the start point, as `Range.collapse(true)`.
    #[must_use]
    pub const fn collapsed_to_start(&self) -> Self {
        Self::caret(self.start)
    }
}

// ─── DomSelection ────────────────────────────────────────────────────────────

/// The live selection: where the user started and where they are now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DomSelection {
    pub anchor: DomPoint,
    pub focus: DomPoint,
}

impl DomSelection {
    #[inline]
    #[must_use]
    pub const fn new(anchor: DomPoint, focus: DomPoint) -> Self {
        Self { anchor, focus }
    }

    #[inline]
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
