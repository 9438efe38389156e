// SPDX-License-Identifier: MIT
//
// DOM node handles.
//
// A `DomNodeId` is an opaque handle to a node owned by whatever implements
// `NativeDom`. For the in-memory `Document` it is an arena index; a
// browser-backed implementation would map it to a live `web_sys::Node`.
// Handles are never reused within one document, so a stale handle fails
// lookups instead of aliasing a newer node.

use std::fmt;

/// Handle to a node of the native tree.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DomNodeId(u32);

impl DomNodeId {
    #[inline]
    #[must_use]
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DomNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dom#{}", self.0)
    }
}

/// Node name reported for text nodes, as in `Node.nodeName`.
pub const TEXT_NODE_NAME: &str = "#text";

/// True for the line-break placeholder element. Compared case-insensitively
/// because browsers report element names upper-cased.
#[must_use]
pub fn is_line_break_name(name: &str) -> bool {
    name.eq_ignore_ascii_case("br")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", DomNodeId::from_raw(3)), "dom#3");
    }

    #[test]
    fn line_break_name() {
        assert!(is_line_break_name("br"));
        assert!(is_line_break_name("BR"));
        assert!(!is_line_break_name("b"));
        assert!(!is_line_break_name(TEXT_NODE_NAME));
    }
}
