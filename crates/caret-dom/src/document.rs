// SPDX-License-Identifier: MIT
//
// In-memory document.
//
// An arena-backed DOM that implements `NativeDom` and behaves like a
// browser where the editor can observe the difference:
//
// - Selection: `addRange` coerces reversed ranges to forward and is ignored
//   while a range is already present, `extend` moves only the focus, and
//   every change queues one coalesced `selectionchange`.
// - Structural mutations relocate selection endpoints that were inside
//   removed nodes, and text-data changes clamp offsets.
// - Focus: focusing or blurring an element queues `focus`/`blur`;
//   `window_blur` queues `blur` but keeps the active element, like an OS
//   tab switch.
// - Default actions: `apply_default_input` performs the edit a browser
//   performs after an unprevented `beforeinput`, including replacing a
//   `<br>` placeholder with a fresh text node on insert and leaving a
//   `<br>` behind when a text node is emptied.
// - `before_input` builds the event a browser would fire for the current
//   selection, with grapheme-aware target ranges for Backspace and Delete.
//
// Nodes are never freed. Detached nodes stay in the arena, so stale
// handles keep resolving to their last state, as they do in a browser.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::Write as _;

use unicode_segmentation::UnicodeSegmentation;

use crate::dom::NativeDom;
use crate::error::DomError;
use crate::event::NativeEvent;
use crate::input::{InputEvent, InputType};
use crate::node::{DomNodeId, TEXT_NODE_NAME, is_line_break_name};
use crate::range::{DomPoint, DomRange, DomSelection};

/// Elements serialized without a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input"];

// ─── Arena nodes ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
enum NodeData {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
struct DomNode {
    parent: Option<DomNodeId>,
    children: Vec<DomNodeId>,
    data: NodeData,
}

// ─── Document ────────────────────────────────────────────────────────────────

/// An in-memory DOM with a selection, focus and an event queue.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<DomNode>,
    body: DomNodeId,
    selection: Option<DomSelection>,
    active: Option<DomNodeId>,
    events: Vec<NativeEvent>,
    selection_change_queued: bool,
    selection_writes: usize,
}

impl Document {
    /// An empty document with a `<body>`.
    #[must_use]
    pub fn new() -> Self {
        let mut document = Self {
            nodes: Vec::new(),
            body: DomNodeId::from_raw(0),
            selection: None,
            active: None,
            events: Vec::new(),
            selection_change_queued: false,
            selection_writes: 0,
        };
        document.body = document.alloc(NodeData::Element {
            tag: "body".to_owned(),
            attributes: BTreeMap::new(),
        });
        document
    }

    /// The `<body>` element.
    #[inline]
    #[must_use]
    pub const fn body(&self) -> DomNodeId {
        self.body
    }

    /// Number of selection API writes (`removeAllRanges`, `addRange`,
    /// `extend`) so far, whether or not they changed anything.
    #[inline]
    #[must_use]
    pub const fn selection_writes(&self) -> usize {
        self.selection_writes
    }

    /// Text data of a text node.
    #[must_use]
    pub fn text(&self, node: DomNodeId) -> Option<&str> {
        match &self.nodes.get(node.index())?.data {
            NodeData::Text(text) => Some(text),
            NodeData::Element { .. } => None,
        }
    }

    /// An attribute of an element.
    #[must_use]
    pub fn attribute(&self, node: DomNodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(node.index())?.data {
            NodeData::Element { attributes, .. } => attributes.get(name).map(String::as_str),
            NodeData::Text(_) => None,
        }
    }

    // ── Tree building ───────────────────────────────────────────

    /// Append `child` to `parent`, detaching it from its current parent.
    ///
    /// # Errors
    ///
    /// Fails if either node is unknown.
    pub fn append_child(&mut self, parent: DomNodeId, child: DomNodeId) -> Result<(), DomError> {
        let index = self.node(parent)?.children.len();
        self.insert_child(parent, index, child)
    }

    fn insert_child(&mut self, parent: DomNodeId, index: usize, child: DomNodeId) -> Result<(), DomError> {
        self.node(child)?;
        self.detach(child)?;
        let siblings = &mut self.node_mut(parent)?.children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);
        Ok(())
    }

    fn detach(&mut self, child: DomNodeId) -> Result<(), DomError> {
        if let Some(parent) = self.node(child)?.parent {
            self.node_mut(parent)?.children.retain(|&c| c != child);
            self.node_mut(child)?.parent = None;
        }
        Ok(())
    }

    // ── User simulation ─────────────────────────────────────────

    /// The user places the selection.
    pub fn select(&mut self, anchor: DomPoint, focus: DomPoint) {
        self.set_selection(Some(DomSelection::new(anchor, focus)));
    }

    /// The window lost focus (OS tab or app switch). The active element is
    /// kept so it regains focus when the window does.
    pub fn window_blur(&mut self) {
        if let Some(active) = self.active {
            self.events.push(NativeEvent::Blur(active));
        }
    }

    /// The window regained focus.
    pub fn window_focus(&mut self) {
        if let Some(active) = self.active {
            self.events.push(NativeEvent::Focus(active));
        }
    }

    /// The `beforeinput` event a browser would fire for the current
    /// selection.
    #[must_use]
    pub fn before_input(&self, input_type: impl Into<InputType>, data: Option<&str>) -> InputEvent {
        let input_type = input_type.into();
        let range = self.target_range(&input_type);
        let mut event = InputEvent::new(input_type);
        event.data = data.map(str::to_owned);
        if let Some(range) = range {
            event.target_ranges.push(range);
        }
        event
    }

    fn target_range(&self, input_type: &InputType) -> Option<DomRange> {
        let range = self.forward_range(&self.selection?);
        if !range.is_collapsed() || !input_type.is_content_delete() {
            return Some(range);
        }
        let point = range.start;
        let Some(text) = self.text(point.node) else {
            return Some(range);
        };

        if *input_type == InputType::DeleteContentBackward {
            let before: String = text.chars().take(point.offset).collect();
            let len = before.graphemes(true).next_back().map_or(0, |g| g.chars().count());
            Some(DomRange::new(DomPoint::new(point.node, point.offset - len), point))
        } else {
            let after: String = text.chars().skip(point.offset).collect();
            let len = after.graphemes(true).next().map_or(0, |g| g.chars().count());
            Some(DomRange::new(point, DomPoint::new(point.node, point.offset + len)))
        }
    }

    // ── Serialization ───────────────────────────────────────────

    /// `innerHTML` of `node`.
    #[must_use]
    pub fn inner_html(&self, node: DomNodeId) -> String {
        let mut out = String::new();
        for child in self.children(node) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, node: DomNodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.index()) else {
            return;
        };
        match &entry.data {
            NodeData::Text(text) => escape_into(text, out),
            NodeData::Element { tag, attributes } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag.as_str()) {
                    return;
                }
                for &child in &entry.children {
                    self.write_html(child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    // ── Internals ───────────────────────────────────────────────

    #[allow(clippy::cast_possible_truncation)]
    fn alloc(&mut self, data: NodeData) -> DomNodeId {
        let id = DomNodeId::from_raw(self.nodes.len() as u32);
        self.nodes.push(DomNode {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    fn node(&self, id: DomNodeId) -> Result<&DomNode, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: DomNodeId) -> Result<&mut DomNode, DomError> {
        self.nodes.get_mut(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn index_in_parent(&self, node: DomNodeId) -> Option<(DomNodeId, usize)> {
        let parent = self.nodes.get(node.index())?.parent?;
        let index = self.nodes.get(parent.index())?.children.iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    /// Document-order key: child indices from the root, then the offset.
    fn tree_position(&self, point: DomPoint) -> Vec<usize> {
        let mut key = vec![point.offset];
        let mut node = point.node;
        while let Some((parent, index)) = self.index_in_parent(node) {
            key.push(index);
            node = parent;
        }
        key.reverse();
        key
    }

    fn compare_points(&self, a: DomPoint, b: DomPoint) -> Ordering {
        self.tree_position(a).cmp(&self.tree_position(b))
    }

    fn forward_range(&self, selection: &DomSelection) -> DomRange {
        if self.compare_points(selection.anchor, selection.focus) == Ordering::Greater {
            DomRange::new(selection.focus, selection.anchor)
        } else {
            DomRange::new(selection.anchor, selection.focus)
        }
    }

    fn set_selection(&mut self, next: Option<DomSelection>) {
        if self.selection != next {
            self.selection = next;
            self.queue_selection_change();
        }
    }

    fn queue_selection_change(&mut self) {
        if !self.selection_change_queued {
            self.selection_change_queued = true;
            self.events.push(NativeEvent::SelectionChange);
        }
    }

    fn check_offset(&self, point: DomPoint) -> Result<(), DomError> {
        self.node(point.node)?;
        let len = self.node_length(point.node);
        if point.offset > len {
            return Err(DomError::OffsetOutOfBounds {
                node: point.node,
                offset: point.offset,
                len,
            });
        }
        Ok(())
    }

    /// Which selection endpoints sit inside `parent`'s subtree, below it.
    fn endpoints_inside(&self, parent: DomNodeId) -> [bool; 2] {
        self.selection.map_or([false; 2], |s| {
            [s.anchor, s.focus].map(|p| p.node != parent && self.contains(parent, p.node))
        })
    }

    /// Move endpoints that were inside `parent` and no longer are to
    /// `(parent, index)`, and clamp offsets into `parent`.
    fn relocate_selection(&mut self, parent: DomNodeId, inside: [bool; 2], index: usize) {
        let Some(selection) = self.selection else {
            return;
        };
        let len = self.node_length(parent);
        let fix = |point: DomPoint, was_inside: bool| {
            if was_inside && !self.contains(parent, point.node) {
                DomPoint::new(parent, index.min(len))
            } else if point.node == parent && point.offset > len {
                DomPoint::new(parent, len)
            } else {
                point
            }
        };
        let next = DomSelection::new(fix(selection.anchor, inside[0]), fix(selection.focus, inside[1]));
        self.set_selection(Some(next));
    }

    fn splice_text(&mut self, node: DomNodeId, from: usize, to: usize, insert: &str) -> Result<(), DomError> {
        let text = self.text(node).ok_or(DomError::NotText(node))?;
        let len = text.chars().count();
        if from > to || to > len {
            return Err(DomError::OffsetOutOfBounds { node, offset: to, len });
        }
        let next: String = text
            .chars()
            .take(from)
            .chain(insert.chars())
            .chain(text.chars().skip(to))
            .collect();
        self.set_text_data(node, &next)
    }

    fn input_range(&self, event: &InputEvent) -> Result<DomRange, DomError> {
        if let Some(range) = event.target_range() {
            return Ok(*range);
        }
        let selection = self.selection.ok_or(DomError::NoSelection)?;
        Ok(self.forward_range(&selection))
    }

    /// Typing: insert into a text node, or replace the `<br>` placeholder.
    fn insert_text(&mut self, range: DomRange, data: &str) -> Result<(), DomError> {
        if !range.is_collapsed() {
            self.delete_contents(range)?;
        }
        let mut point = match self.selection {
            Some(selection) if !range.is_collapsed() => selection.anchor,
            _ => range.start,
        };
        let inserted = data.chars().count();
        // A caret inside a `<br>` types as if it sat just before it.
        if self.is_line_break(point.node) {
            if let Some((parent, index)) = self.index_in_parent(point.node) {
                point = DomPoint::new(parent, index);
            }
        }

        if self.is_text(point.node) {
            self.splice_text(point.node, point.offset, point.offset, data)?;
            let caret = DomPoint::new(point.node, point.offset + inserted);
            self.set_selection(Some(DomSelection::new(caret, caret)));
            return Ok(());
        }

        let text = self.create_text(data);
        match self.child(point.node, point.offset) {
            Some(child) if self.is_line_break(child) => self.replace_child(point.node, text, child)?,
            _ => self.insert_child(point.node, point.offset, text)?,
        }
        let caret = DomPoint::new(text, inserted);
        self.set_selection(Some(DomSelection::new(caret, caret)));
        Ok(())
    }

    /// Spellcheck substitution inside one text node.
    fn replace_text(&mut self, range: DomRange, data: &str) -> Result<(), DomError> {
        if range.start.node != range.end.node {
            tracing::trace!(?range, "replacement across nodes is not simulated");
            return Ok(());
        }
        self.splice_text(range.start.node, range.start.offset, range.end.offset, data)?;
        let caret = DomPoint::new(range.start.node, range.start.offset + data.chars().count());
        self.set_selection(Some(DomSelection::new(caret, caret)));
        Ok(())
    }

    /// Delete inside one text node. An emptied text node becomes `<br>`.
    fn delete_contents(&mut self, range: DomRange) -> Result<(), DomError> {
        let node = range.start.node;
        if node != range.end.node || !self.is_text(node) {
            tracing::trace!(?range, "deletion across nodes is not simulated");
            return Ok(());
        }
        self.splice_text(node, range.start.offset, range.end.offset, "")?;

        let emptied = self.text(node).is_some_and(str::is_empty);
        let caret = match self.index_in_parent(node) {
            Some((parent, index)) if emptied => {
                let br = self.create_element("br");
                self.replace_child(parent, br, node)?;
                DomPoint::new(parent, index)
            }
            _ => range.start,
        };
        self.set_selection(Some(DomSelection::new(caret, caret)));
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
}

// ─── NativeDom ───────────────────────────────────────────────────────────────

impl NativeDom for Document {
    fn node_name(&self, node: DomNodeId) -> Option<String> {
        Some(match &self.nodes.get(node.index())?.data {
            NodeData::Element { tag, .. } => tag.clone(),
            NodeData::Text(_) => TEXT_NODE_NAME.to_owned(),
        })
    }

    fn is_text(&self, node: DomNodeId) -> bool {
        self.text(node).is_some()
    }

    fn is_line_break(&self, node: DomNodeId) -> bool {
        matches!(
            self.nodes.get(node.index()).map(|n| &n.data),
            Some(NodeData::Element { tag, .. }) if is_line_break_name(tag)
        )
    }

    fn parent(&self, node: DomNodeId) -> Option<DomNodeId> {
        self.nodes.get(node.index())?.parent
    }

    fn child(&self, node: DomNodeId, index: usize) -> Option<DomNodeId> {
        self.nodes.get(node.index())?.children.get(index).copied()
    }

    fn children(&self, node: DomNodeId) -> Vec<DomNodeId> {
        self.nodes.get(node.index()).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn text_content(&self, node: DomNodeId) -> Option<String> {
        let entry = self.nodes.get(node.index())?;
        match &entry.data {
            NodeData::Text(text) => Some(text.clone()),
            NodeData::Element { .. } => Some(
                entry
                    .children
                    .iter()
                    .filter_map(|&child| self.text_content(child))
                    .collect(),
            ),
        }
    }

    fn contains(&self, ancestor: DomNodeId, node: DomNodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    fn create_element(&mut self, tag: &str) -> DomNodeId {
        self.alloc(NodeData::Element {
            tag: tag.to_owned(),
            attributes: BTreeMap::new(),
        })
    }

    fn create_text(&mut self, data: &str) -> DomNodeId {
        self.alloc(NodeData::Text(data.to_owned()))
    }

    fn set_text_data(&mut self, node: DomNodeId, data: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(text) => data.clone_into(text),
            NodeData::Element { .. } => return Err(DomError::NotText(node)),
        }
        self.relocate_selection(node, [false; 2], 0);
        Ok(())
    }

    fn set_attributes(&mut self, node: DomNodeId, attributes: &BTreeMap<String, String>) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Element { attributes: current, .. } => {
                current.clone_from(attributes);
                Ok(())
            }
            NodeData::Text(_) => Err(DomError::NotText(node)),
        }
    }

    fn replace_children(&mut self, parent: DomNodeId, children: &[DomNodeId]) -> Result<(), DomError> {
        self.node(parent)?;
        for &child in children {
            self.node(child)?;
        }
        let inside = self.endpoints_inside(parent);

        for old in self.children(parent) {
            self.detach(old)?;
        }
        for &child in children {
            self.append_child(parent, child)?;
        }

        self.relocate_selection(parent, inside, 0);
        Ok(())
    }

    fn replace_child(&mut self, parent: DomNodeId, new_child: DomNodeId, old_child: DomNodeId) -> Result<(), DomError> {
        self.node(new_child)?;
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == old_child)
            .ok_or(DomError::NotAChild {
                parent,
                child: old_child,
            })?;
        let inside = self.endpoints_inside(parent);

        self.detach(new_child)?;
        // Detaching may have shifted the old child if both shared a parent.
        let index = self
            .node(parent)?
            .children
            .iter()
            .position(|&c| c == old_child)
            .unwrap_or(index);
        self.node_mut(parent)?.children[index] = new_child;
        self.node_mut(new_child)?.parent = Some(parent);
        self.node_mut(old_child)?.parent = None;

        self.relocate_selection(parent, inside, index);
        Ok(())
    }

    fn selection(&self) -> Option<DomSelection> {
        self.selection
    }

    fn remove_all_ranges(&mut self) {
        self.selection_writes += 1;
        self.set_selection(None);
    }

    fn add_range(&mut self, range: DomRange) {
        self.selection_writes += 1;
        if self.selection.is_some() {
            tracing::trace!("addRange ignored, a range is already present");
            return;
        }
        let forward = self.forward_range(&DomSelection::new(range.start, range.end));
        self.set_selection(Some(DomSelection::new(forward.start, forward.end)));
    }

    fn extend(&mut self, point: DomPoint) -> Result<(), DomError> {
        self.selection_writes += 1;
        let selection = self.selection.ok_or(DomError::NoSelection)?;
        self.check_offset(point)?;
        self.set_selection(Some(DomSelection::new(selection.anchor, point)));
        Ok(())
    }

    fn active_element(&self) -> Option<DomNodeId> {
        self.active
    }

    fn focus(&mut self, node: DomNodeId) -> Result<(), DomError> {
        self.node(node)?;
        if self.active == Some(node) {
            return Ok(());
        }
        if let Some(previous) = self.active.replace(node) {
            self.events.push(NativeEvent::Blur(previous));
        }
        self.events.push(NativeEvent::Focus(node));
        Ok(())
    }

    fn blur(&mut self, node: DomNodeId) {
        if self.active == Some(node) {
            self.active = None;
            self.events.push(NativeEvent::Blur(node));
        }
    }

    fn apply_default_input(&mut self, event: &InputEvent) -> Result<(), DomError> {
        match event.input_type {
            InputType::InsertText | InputType::InsertFromPaste | InputType::InsertCompositionText => {
                let range = self.input_range(event)?;
                self.insert_text(range, event.data())
            }
            InputType::InsertReplacementText => {
                let range = self.input_range(event)?;
                self.replace_text(range, event.data())
            }
            InputType::DeleteContentBackward
            | InputType::DeleteContentForward
            | InputType::DeleteWordBackward
            | InputType::DeleteWordForward
            | InputType::DeleteByCut => {
                let range = self.input_range(event)?;
                self.delete_contents(range)
            }
            ref other => {
                tracing::trace!(input_type = %other, "no default action simulated");
                Ok(())
            }
        }
    }

    fn drain_events(&mut self) -> Vec<NativeEvent> {
        self.selection_change_queued = false;
        std::mem::take(&mut self.events)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// body > div > p > "ab"
    fn setup() -> (Document, DomNodeId, DomNodeId, DomNodeId) {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let p = doc.create_element("p");
        let text = doc.create_text("ab");
        doc.append_child(doc.body(), div).unwrap();
        doc.append_child(div, p).unwrap();
        doc.append_child(p, text).unwrap();
        (doc, div, p, text)
    }

    fn caret(node: DomNodeId, offset: usize) -> DomSelection {
        DomSelection::new(DomPoint::new(node, offset), DomPoint::new(node, offset))
    }

    // ── Tree ────────────────────────────────────────────────────

    #[test]
    fn builds_and_serializes() {
        let (mut doc, div, p, _) = setup();
        let mut attrs = BTreeMap::new();
        attrs.insert("class".to_owned(), "lead".to_owned());
        doc.set_attributes(p, &attrs).unwrap();
        let br = doc.create_element("br");
        doc.append_child(div, br).unwrap();

        assert_eq!(doc.inner_html(div), r#"<p class="lead">ab</p><br>"#);
        assert_eq!(doc.text_content(div).as_deref(), Some("ab"));
        assert_eq!(doc.attribute(p, "class"), Some("lead"));
    }

    #[test]
    fn escapes_text() {
        let mut doc = Document::new();
        let t = doc.create_text("a<b & c>");
        doc.append_child(doc.body(), t).unwrap();
        assert_eq!(doc.inner_html(doc.body()), "a&lt;b &amp; c&gt;");
    }

    #[test]
    fn node_names() {
        let (doc, _, p, text) = setup();
        assert_eq!(doc.node_name(p).as_deref(), Some("p"));
        assert_eq!(doc.node_name(text).as_deref(), Some(TEXT_NODE_NAME));
        assert!(doc.is_text(text));
        assert!(!doc.is_line_break(p));
    }

    #[test]
    fn contains_walks_ancestors() {
        let (doc, div, p, text) = setup();
        assert!(doc.contains(div, text));
        assert!(doc.contains(p, p));
        assert!(!doc.contains(p, div));
    }

    #[test]
    fn replace_children_detaches_old() {
        let (mut doc, div, p, _) = setup();
        let other = doc.create_element("p");
        doc.replace_children(div, &[other]).unwrap();
        assert_eq!(doc.children(div), vec![other]);
        assert_eq!(doc.parent(p), None);
        assert_eq!(doc.parent(other), Some(div));
    }

    #[test]
    fn replace_child_in_place() {
        let (mut doc, _, p, text) = setup();
        let br = doc.create_element("br");
        doc.replace_child(p, br, text).unwrap();
        assert_eq!(doc.children(p), vec![br]);
        assert!(doc.is_line_break(br));
        assert_eq!(
            doc.replace_child(p, br, text),
            Err(DomError::NotAChild { parent: p, child: text })
        );
    }

    #[test]
    fn set_text_data_on_element_fails() {
        let (mut doc, _, p, _) = setup();
        assert_eq!(doc.set_text_data(p, "x"), Err(DomError::NotText(p)));
    }

    // ── Selection ───────────────────────────────────────────────

    #[test]
    fn add_range_coerces_reversed_range() {
        let (mut doc, _, _, text) = setup();
        doc.add_range(DomRange::new(DomPoint::new(text, 2), DomPoint::new(text, 0)));
        let selection = doc.selection().unwrap();
        assert_eq!(selection.anchor, DomPoint::new(text, 0));
        assert_eq!(selection.focus, DomPoint::new(text, 2));
    }

    #[test]
    fn add_range_is_ignored_while_selected() {
        let (mut doc, _, _, text) = setup();
        doc.add_range(DomRange::caret(DomPoint::new(text, 0)));
        doc.add_range(DomRange::caret(DomPoint::new(text, 2)));
        assert_eq!(doc.selection(), Some(caret(text, 0)));
    }

    #[test]
    fn backward_selection_via_extend() {
        let (mut doc, _, _, text) = setup();
        let range = DomRange::new(DomPoint::new(text, 0), DomPoint::new(text, 2));
        doc.add_range(range.collapsed_to_end());
        doc.extend(range.start).unwrap();
        let selection = doc.selection().unwrap();
        assert_eq!(selection.anchor, DomPoint::new(text, 2));
        assert_eq!(selection.focus, DomPoint::new(text, 0));
        assert_eq!(doc.selection_writes(), 2);
    }

    #[test]
    fn extend_checks_bounds() {
        let (mut doc, _, _, text) = setup();
        assert_eq!(doc.extend(DomPoint::new(text, 0)), Err(DomError::NoSelection));
        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        assert!(matches!(
            doc.extend(DomPoint::new(text, 9)),
            Err(DomError::OffsetOutOfBounds { .. })
        ));
    }

    #[test]
    fn selection_changes_are_coalesced() {
        let (mut doc, _, _, text) = setup();
        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));
        assert_eq!(doc.drain_events(), vec![NativeEvent::SelectionChange]);
        assert!(doc.drain_events().is_empty());

        // Writing the same selection again is silent.
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));
        assert!(doc.drain_events().is_empty());
    }

    #[test]
    fn removed_nodes_release_the_selection() {
        let (mut doc, div, p, text) = setup();
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));
        doc.replace_children(div, &[]).unwrap();
        assert_eq!(doc.selection(), Some(caret(div, 0)));
        assert_eq!(doc.parent(p), None);
    }

    #[test]
    fn shorter_text_clamps_offsets() {
        let (mut doc, _, _, text) = setup();
        doc.select(DomPoint::new(text, 2), DomPoint::new(text, 2));
        doc.set_text_data(text, "a").unwrap();
        assert_eq!(doc.selection(), Some(caret(text, 1)));
    }

    // ── Focus ───────────────────────────────────────────────────

    #[test]
    fn focus_and_blur_queue_events() {
        let (mut doc, div, p, _) = setup();
        doc.focus(div).unwrap();
        doc.focus(div).unwrap();
        doc.focus(p).unwrap();
        doc.blur(p);
        assert_eq!(
            doc.drain_events(),
            vec![
                NativeEvent::Focus(div),
                NativeEvent::Blur(div),
                NativeEvent::Focus(p),
                NativeEvent::Blur(p),
            ]
        );
        assert_eq!(doc.active_element(), None);
    }

    #[test]
    fn window_blur_keeps_active_element() {
        let (mut doc, div, _, _) = setup();
        doc.focus(div).unwrap();
        doc.drain_events();
        doc.window_blur();
        assert_eq!(doc.drain_events(), vec![NativeEvent::Blur(div)]);
        assert_eq!(doc.active_element(), Some(div));
        doc.window_focus();
        assert_eq!(doc.drain_events(), vec![NativeEvent::Focus(div)]);
    }

    // ── beforeinput ─────────────────────────────────────────────

    #[test]
    fn before_input_targets_selection() {
        let (mut doc, _, _, text) = setup();
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));
        let event = doc.before_input("insertText", Some("c"));
        assert_eq!(event.data(), "c");
        assert_eq!(event.target_range(), Some(&DomRange::caret(DomPoint::new(text, 1))));
    }

    #[test]
    fn before_input_without_selection_has_no_ranges() {
        let (doc, ..) = setup();
        assert!(doc.before_input("insertText", Some("c")).target_ranges.is_empty());
    }

    #[test]
    fn backspace_targets_one_grapheme() {
        let mut doc = Document::new();
        // "e" + combining acute is one grapheme of two chars.
        let text = doc.create_text("ae\u{301}");
        doc.append_child(doc.body(), text).unwrap();
        doc.select(DomPoint::new(text, 3), DomPoint::new(text, 3));

        let event = doc.before_input(InputType::DeleteContentBackward, None);
        assert_eq!(
            event.target_range(),
            Some(&DomRange::new(DomPoint::new(text, 1), DomPoint::new(text, 3)))
        );

        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        let event = doc.before_input(InputType::DeleteContentForward, None);
        assert_eq!(
            event.target_range(),
            Some(&DomRange::new(DomPoint::new(text, 0), DomPoint::new(text, 1)))
        );
    }

    #[test]
    fn backspace_at_start_targets_caret() {
        let (mut doc, _, _, text) = setup();
        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        let event = doc.before_input(InputType::DeleteContentBackward, None);
        assert!(event.target_range().unwrap().is_collapsed());
    }

    // ── Default actions ─────────────────────────────────────────

    #[test]
    fn typing_inserts_and_moves_caret() {
        let (mut doc, div, _, text) = setup();
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));
        let event = doc.before_input("insertText", Some("c"));
        doc.apply_default_input(&event).unwrap();
        assert_eq!(doc.inner_html(div), "<p>acb</p>");
        assert_eq!(doc.selection(), Some(caret(text, 2)));
    }

    #[test]
    fn typing_into_br_replaces_it() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let br = doc.create_element("br");
        doc.append_child(doc.body(), p).unwrap();
        doc.append_child(p, br).unwrap();
        doc.select(DomPoint::new(p, 0), DomPoint::new(p, 0));

        let event = doc.before_input("insertText", Some("x"));
        doc.apply_default_input(&event).unwrap();

        assert_eq!(doc.inner_html(p), "x");
        let new_text = doc.child(p, 0).unwrap();
        assert_ne!(new_text, br);
        assert_eq!(doc.parent(br), None);
        assert_eq!(doc.selection(), Some(caret(new_text, 1)));
    }

    #[test]
    fn typing_with_caret_inside_br_replaces_it() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let br = doc.create_element("br");
        doc.append_child(doc.body(), p).unwrap();
        doc.append_child(p, br).unwrap();
        doc.select(DomPoint::new(br, 0), DomPoint::new(br, 0));

        let event = doc.before_input("insertText", Some("x"));
        doc.apply_default_input(&event).unwrap();

        assert_eq!(doc.inner_html(p), "x");
        assert_eq!(doc.parent(br), None);
        assert_eq!(doc.selection(), Some(caret(doc.child(p, 0).unwrap(), 1)));
    }

    #[test]
    fn deleting_last_char_leaves_br() {
        let mut doc = Document::new();
        let p = doc.create_element("p");
        let text = doc.create_text("a");
        doc.append_child(doc.body(), p).unwrap();
        doc.append_child(p, text).unwrap();
        doc.select(DomPoint::new(text, 1), DomPoint::new(text, 1));

        let event = doc.before_input(InputType::DeleteContentBackward, None);
        doc.apply_default_input(&event).unwrap();

        assert_eq!(doc.inner_html(p), "<br>");
        assert_eq!(doc.selection(), Some(caret(p, 0)));
    }

    #[test]
    fn delete_forward_removes_next_char() {
        let (mut doc, _, p, text) = setup();
        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        let event = doc.before_input(InputType::DeleteContentForward, None);
        doc.apply_default_input(&event).unwrap();
        assert_eq!(doc.inner_html(p), "b");
        assert_eq!(doc.selection(), Some(caret(text, 0)));
    }

    #[test]
    fn replacement_rewrites_target() {
        let mut doc = Document::new();
        let text = doc.create_text("teh cat");
        doc.append_child(doc.body(), text).unwrap();
        doc.select(DomPoint::new(text, 3), DomPoint::new(text, 3));
        let event = InputEvent::new(InputType::InsertReplacementText)
            .with_data("the")
            .with_target_range(DomRange::new(DomPoint::new(text, 0), DomPoint::new(text, 3)));
        doc.apply_default_input(&event).unwrap();
        assert_eq!(doc.text(text), Some("the cat"));
        assert_eq!(doc.selection(), Some(caret(text, 3)));
    }

    #[test]
    fn typing_queues_selection_change() {
        let (mut doc, _, _, text) = setup();
        doc.select(DomPoint::new(text, 0), DomPoint::new(text, 0));
        doc.drain_events();
        let event = doc.before_input("insertText", Some("z"));
        doc.apply_default_input(&event).unwrap();
        assert_eq!(doc.drain_events(), vec![NativeEvent::SelectionChange]);
    }
}
