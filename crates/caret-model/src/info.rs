//! A selection described in model terms, for hosts that need more than paths.

use serde::Serialize;

use crate::element::Element;
use crate::id::NodeId;
use crate::path::Path;
use crate::selection::Selection;
use crate::tree::{Point, resolve_path};

/// Where one end of a selection lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PointInfo {
    /// The element or text run the path resolves to.
    pub node: NodeId,
    /// Char offset when the end is inside a text run.
    pub offset: Option<usize>,
}

/// What a selection covers in a given document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionInfo {
    pub selection: Selection,
    /// `selection` with its ends in document order.
    pub range: Selection,
    pub is_forward: bool,
    pub is_collapsed: bool,
    /// `None` when the anchor path is stale.
    pub anchor: Option<PointInfo>,
    /// `None` when the focus path is stale.
    pub focus: Option<PointInfo>,
    /// The selected chars, when both ends are in the same text run.
    pub text: Option<String>,
}

impl SelectionInfo {
    /// Describe `selection` against `root`.
    #[must_use]
    pub fn new(root: &Element, selection: &Selection) -> Self {
        let range = selection.as_forward_range();
        let start = resolve_path(root, &range.anchor);
        let end = resolve_path(root, &range.focus);

        // Same run by position: a shared `Rc<Text>` can sit at two paths.
        let same_run = range.anchor.parent() == range.focus.parent();
        let text = match (start, end) {
            (Some(Point::TextOffset { text, offset: from }), Some(Point::TextOffset { offset: to, .. })) if same_run => {
                Some(text.text.chars().skip(from).take(to.saturating_sub(from)).collect())
            }
            _ => None,
        };

        Self {
            selection: selection.clone(),
            is_forward: selection.is_forward(),
            is_collapsed: selection.is_collapsed(),
            anchor: point_info(root, &selection.anchor),
            focus: point_info(root, &selection.focus),
            range,
            text,
        }
    }
}

fn point_info(root: &Element, path: &Path) -> Option<PointInfo> {
    resolve_path(root, path).map(|point| match point {
        Point::Element(element) => PointInfo {
            node: element.id,
            offset: None,
        },
        Point::Text(text) => PointInfo {
            node: text.id,
            offset: None,
        },
        Point::TextOffset { text, offset } => PointInfo {
            node: text.id,
            offset: Some(offset),
        },
    })
}
