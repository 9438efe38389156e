// SPDX-License-Identifier: MIT
//
// The native surface the editor drives.
//
// `NativeDom` is the complete set of DOM capabilities the editor core uses:
// tree queries, the handful of mutations the render layer needs, the
// `Selection` API, and focus. Everything in the core is written against
// this trait, so the same engine runs against a live browser document or
// against the in-memory `Document` used by tests and headless hosts.
//
// Offsets into text nodes are counted in chars. A backend over a real
// browser converts to and from UTF-16 code units at this boundary.

use std::collections::BTreeMap;

use crate::error::DomError;
use crate::event::NativeEvent;
use crate::input::InputEvent;
use crate::node::{DomNodeId, is_line_break_name};
use crate::range::{DomPoint, DomRange, DomSelection};

/// DOM capabilities used by the editor.
pub trait NativeDom {
    // ── Queries ─────────────────────────────────────────────────

    /// `nodeName`: the tag for elements, `#text` for text nodes.
    fn node_name(&self, node: DomNodeId) -> Option<String>;

    fn is_text(&self, node: DomNodeId) -> bool;

    fn parent(&self, node: DomNodeId) -> Option<DomNodeId>;

    /// The child at `index`.
    fn child(&self, node: DomNodeId, index: usize) -> Option<DomNodeId>;

    fn children(&self, node: DomNodeId) -> Vec<DomNodeId>;

    /// `textContent`.
    fn text_content(&self, node: DomNodeId) -> Option<String>;

    /// `Node.contains`: true for `node` itself and its descendants.
    fn contains(&self, ancestor: DomNodeId, node: DomNodeId) -> bool;

    /// True for the `<br>` placeholder.
    fn is_line_break(&self, node: DomNodeId) -> bool {
        self.node_name(node).is_some_and(|name| is_line_break_name(&name))
    }

    /// Length of a text node in chars, or child count of an element.
    fn node_length(&self, node: DomNodeId) -> usize {
        if self.is_text(node) {
            self.text_content(node).map_or(0, |text| text.chars().count())
        } else {
            self.children(node).len()
        }
    }

    // ── Mutation ────────────────────────────────────────────────

    fn create_element(&mut self, tag: &str) -> DomNodeId;

    fn create_text(&mut self, data: &str) -> DomNodeId;

    /// Replace the data of a text node.
    ///
    /// # Errors
    ///
    /// Fails if `node` is unknown or not a text node.
    fn set_text_data(&mut self, node: DomNodeId, data: &str) -> Result<(), DomError>;

    /// Make the element's attributes exactly `attributes`.
    ///
    /// # Errors
    ///
    /// Fails if `node` is unknown or a text node.
    fn set_attributes(&mut self, node: DomNodeId, attributes: &BTreeMap<String, String>) -> Result<(), DomError>;

    /// `replaceChildren`: detach every current child and append `children`.
    ///
    /// # Errors
    ///
    /// Fails if any node is unknown.
    fn replace_children(&mut self, parent: DomNodeId, children: &[DomNodeId]) -> Result<(), DomError>;

    /// `replaceChild`: put `new_child` where `old_child` is.
    ///
    /// # Errors
    ///
    /// Fails if `old_child` is not a child of `parent`.
    fn replace_child(&mut self, parent: DomNodeId, new_child: DomNodeId, old_child: DomNodeId) -> Result<(), DomError>;

    // ── Selection ───────────────────────────────────────────────

    /// The current selection, if there is one.
    fn selection(&self) -> Option<DomSelection>;

    fn remove_all_ranges(&mut self);

    /// `Selection.addRange`. Always produces a forward selection.
    fn add_range(&mut self, range: DomRange);

    /// `Selection.extend`: move the focus, keep the anchor.
    ///
    /// # Errors
    ///
    /// Fails without a selection or for an invalid point.
    fn extend(&mut self, point: DomPoint) -> Result<(), DomError>;

    // ── Focus ───────────────────────────────────────────────────

    fn active_element(&self) -> Option<DomNodeId>;

    /// # Errors
    ///
    /// Fails if `node` is unknown.
    fn focus(&mut self, node: DomNodeId) -> Result<(), DomError>;

    fn blur(&mut self, node: DomNodeId);

    // ── Events ──────────────────────────────────────────────────

    /// Perform the default action of a `beforeinput` event that was not
    /// prevented. Browsers do this on their own, so live backends keep this
    /// default no-op.
    ///
    /// # Errors
    ///
    /// Simulating backends fail when the event targets nodes that no
    /// longer exist.
    fn apply_default_input(&mut self, _event: &InputEvent) -> Result<(), DomError> {
        Ok(())
    }

    /// Events raised since the last call, oldest first.
    fn drain_events(&mut self) -> Vec<NativeEvent> {
        Vec::new()
    }
}
