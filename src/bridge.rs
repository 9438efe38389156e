// SPDX-License-Identifier: MIT
//
// Selection bridge.
//
// Translates between the native selection (DOM node + offset pairs) and the
// model selection (paths), through the node-path registry.
//
// DOM → model is simple: look up the path of each endpoint's node and
// append the native offset. For a text node that yields a char offset into
// the run; for an element it yields a child index.
//
// Model → DOM is the delicate direction. The Selection API has no way to
// add a backward range: `addRange` coerces any range to forward, which
// would silently flip a user's shift+left selection. So the write is a
// fixed sequence:
//
//   1. Build the range from the forward-ordered endpoints.
//   2. `removeAllRanges()`.
//   3. Forward selection: `addRange(range)`.
//      Backward selection: `addRange(range collapsed to its end)`, then
//      `extend(start)`, which moves only the focus and leaves the anchor at
//      the end.
//
// Browser quirks around this sequence belong in `write_selection` and
// nowhere else.
//
// Synchronization is idempotent: `sync_selection` reads the live selection
// back into model terms and writes nothing when it already matches. Every
// write fires `selectionchange`, so an unconditional write would feed back
// into the editor forever.

use caret_dom::{DomError, DomNodeId, DomPoint, DomRange, DomSelection, NativeDom};
use caret_model::{Path, Selection};

use crate::registry::Registry;

// ─── DOM → model ─────────────────────────────────────────────────────────────

/// The path of a DOM point, or `None` if its node is not registered (for
/// example a node injected by a browser extension).
#[must_use]
pub fn dom_point_to_path(point: DomPoint, registry: &Registry) -> Option<Path> {
    registry.path(point.node).map(|path| path.append_offset(point.offset))
}

/// The model selection for a native selection.
#[must_use]
pub fn dom_selection_to_model(selection: &DomSelection, registry: &Registry) -> Option<Selection> {
    Some(Selection::new(
        dom_point_to_path(selection.anchor, registry)?,
        dom_point_to_path(selection.focus, registry)?,
    ))
}

// ─── Model → DOM ─────────────────────────────────────────────────────────────

/// The DOM point for a model path.
///
/// A path whose node is registered maps to (DOM parent, last component). A
/// path that is not registered itself, such as a char offset into a text
/// run or a child index past the last child, maps to (node of the parent
/// path, last component). Offset 0 into an empty run maps to the point
/// before its `<br>`, since a `<br>` holds no caret. The point must lie
/// inside `container`.
#[must_use]
pub fn path_to_dom_point<D>(dom: &D, registry: &Registry, container: DomNodeId, path: &Path) -> Option<DomPoint>
where
    D: NativeDom + ?Sized,
{
    let last = path.last()?;
    let point = match registry.node(path).and_then(|node| dom.parent(node)) {
        Some(parent) => DomPoint::new(parent, last),
        None => {
            let node = registry.node(&path.parent()?)?;
            if last == 0 && dom.is_line_break(node) {
                point_before(dom, node)?
            } else {
                DomPoint::new(node, last)
            }
        }
    };

    let valid = dom.contains(container, point.node) && point.offset <= dom.node_length(point.node);
    valid.then_some(point)
}

/// (parent, index) of `node`.
fn point_before<D>(dom: &D, node: DomNodeId) -> Option<DomPoint>
where
    D: NativeDom + ?Sized,
{
    let parent = dom.parent(node)?;
    let index = dom.children(parent).iter().position(|&child| child == node)?;
    Some(DomPoint::new(parent, index))
}

/// The native selection that shows `selection`, or `None` while an endpoint
/// has no DOM counterpart.
#[must_use]
pub fn model_selection_to_dom<D>(dom: &D, registry: &Registry, container: DomNodeId, selection: &Selection) -> Option<DomSelection>
where
    D: NativeDom + ?Sized,
{
    Some(DomSelection::new(
        path_to_dom_point(dom, registry, container, &selection.anchor)?,
        path_to_dom_point(dom, registry, container, &selection.focus)?,
    ))
}

/// Write `selection` to the native selection, preserving its direction.
///
/// Returns `Ok(false)` without touching the DOM when an endpoint has no DOM
/// point, which happens transiently while a render is pending.
///
/// # Errors
///
/// Propagates a failed `extend`.
pub fn write_selection<D>(dom: &mut D, registry: &Registry, container: DomNodeId, selection: &Selection) -> Result<bool, DomError>
where
    D: NativeDom + ?Sized,
{
    let range = selection.as_forward_range();
    let (Some(start), Some(end)) = (
        path_to_dom_point(dom, registry, container, &range.anchor),
        path_to_dom_point(dom, registry, container, &range.focus),
    ) else {
        tracing::warn!(?selection, "selection has no DOM counterpart");
        return Ok(false);
    };
    let range = DomRange::new(start, end);

    dom.remove_all_ranges();
    if selection.is_forward() {
        dom.add_range(range);
    } else {
        dom.add_range(range.collapsed_to_end());
        dom.extend(range.start)?;
    }
    Ok(true)
}

/// Make the native selection match `selection`, writing only if it differs.
///
/// A missing native selection counts as different. Returns whether a write
/// happened.
///
/// # Errors
///
/// See [`write_selection`].
pub fn sync_selection<D>(dom: &mut D, registry: &Registry, container: DomNodeId, selection: &Selection) -> Result<bool, DomError>
where
    D: NativeDom + ?Sized,
{
    let native = dom.selection();
    let current = native.and_then(|native| dom_selection_to_model(&native, registry));
    if current.as_ref() == Some(selection) {
        return Ok(false);
    }
    // Two paths can name one DOM point: `[n, 0]` and `[n, 0, 0]` on an
    // empty line.
    if native.is_some() && native == model_selection_to_dom(dom, registry, container, selection) {
        return Ok(false);
    }
    tracing::trace!(?current, ?selection, "writing native selection");
    write_selection(dom, registry, container, selection)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
