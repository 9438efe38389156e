//! Element and text nodes: the document tree.
//!
//! A document is a root [`Element`] whose children are elements or [`Text`]
//! runs. Nodes are immutable and shared through `Rc`: an edit rebuilds only
//! the chain of ancestors above the changed node and reuses every untouched
//! sibling subtree. That makes "did anything change?" a pointer comparison.
//!
//! # Empty text is a line break
//!
//! A text run with an empty string is not garbage to be cleaned up. It is
//! the reserved marker for an empty line and renders as a `<br>`
//! placeholder. Normalization never merges it into its neighbours, so
//! `["a", "", "b"]` stays three children.
//!
//! # Schema
//!
//! The base element carries a `tag` and string `props`. Hosts describe their
//! own schema (headings, lists, images) with tags and props and render it
//! with a custom render function. An element with no children is valid:
//! that is how void elements such as images are expressed.

use std::collections::BTreeMap;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

fn default_tag() -> String {
    "div".to_owned()
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// A run of text. Two identical strings are still two distinct runs, each
/// with its own identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Text {
    #[serde(default = "NodeId::next")]
    pub id: NodeId,
    pub text: String,
}

impl Text {
    /// Create a text run with a fresh id.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: NodeId::next(),
            text: text.into(),
        }
    }

    /// Length in chars. Text offsets are measured in the same unit.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// True for the empty-line marker.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The same run (same id) with different content.
    #[must_use]
    pub fn with_text(&self, text: impl Into<String>) -> Self {
        Self {
            id: self.id,
            text: text.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Element
// ---------------------------------------------------------------------------

/// An element: a tag, string props, and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(default = "NodeId::next")]
    pub id: NodeId,
    #[serde(default = "default_tag")]
    pub tag: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub props: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element with a fresh id.
    #[must_use]
    pub fn new(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            id: NodeId::next(),
            tag: tag.into(),
            props: BTreeMap::new(),
            children,
        }
    }

    /// Builder: set a prop.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// The child at `index`.
    #[inline]
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// The same element (same id, tag and props) with new children.
    #[must_use]
    pub fn with_children(&self, children: Vec<Node>) -> Self {
        Self {
            id: self.id,
            tag: self.tag.clone(),
            props: self.props.clone(),
            children,
        }
    }

    /// Wrap into a shared root, the form the state and tree operations use.
    #[must_use]
    pub fn into_rc(self) -> Rc<Self> {
        Rc::new(self)
    }
}

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A child of an element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Text(Rc<Text>),
    Element(Rc<Element>),
}

impl Node {
    /// Shorthand for a text child with a fresh id.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(Rc::new(Text::new(text)))
    }

    /// Shorthand for an element child.
    #[must_use]
    pub fn element(element: Element) -> Self {
        Self::Element(Rc::new(element))
    }

    /// The node's id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        match self {
            Self::Text(text) => text.id,
            Self::Element(element) => element.id,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    #[inline]
    #[must_use]
    pub fn as_text(&self) -> Option<&Rc<Text>> {
        match self {
            Self::Text(text) => Some(text),
            Self::Element(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_element(&self) -> Option<&Rc<Element>> {
        match self {
            Self::Element(element) => Some(element),
            Self::Text(_) => None,
        }
    }

    /// True when both nodes share the same allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Rc::ptr_eq(a, b),
            (Self::Element(a), Self::Element(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Self::Text(Rc::new(text))
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Self::Element(Rc::new(element))
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Merge adjacent non-empty text siblings, recursively.
///
/// Like the DOM's `Node.normalize`, except that empty text runs are kept:
/// they are line breaks. The merged run keeps the id of the first run.
///
/// Returns the same `Rc` when nothing changes, at every level, so callers
/// can detect changes with [`Rc::ptr_eq`].
#[must_use]
pub fn normalize(element: &Rc<Element>) -> Rc<Element> {
    normalize_children(&element.children).map_or_else(
        || Rc::clone(element),
        |children| Rc::new(element.with_children(children)),
    )
}

/// `None` when the children are already normalized.
fn normalize_children(children: &[Node]) -> Option<Vec<Node>> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    let mut changed = false;

    for child in children {
        match child {
            Node::Element(element) => {
                let normalized = normalize(element);
                changed |= !Rc::ptr_eq(&normalized, element);
                out.push(Node::Element(normalized));
            }
            Node::Text(text) => {
                let mergeable = !text.is_empty()
                    && matches!(out.last(), Some(Node::Text(previous)) if !previous.is_empty());
                if !mergeable {
                    out.push(child.clone());
                    continue;
                }
                if let Some(Node::Text(previous)) = out.last_mut() {
                    let merged = format!("{}{}", previous.text, text.text);
                    *previous = Rc::new(previous.with_text(merged));
                    changed = true;
                }
            }
        }
    }

    changed.then_some(out)
}

/// True when no element in the tree has two adjacent non-empty text runs.
///
/// Mirrors [`normalize`]: `is_normalized(e)` holds exactly when
/// `normalize(e)` returns `e` itself.
#[must_use]
pub fn is_normalized(element: &Element) -> bool {
    let mut previous_text: Option<&Text> = None;
    for child in &element.children {
        match child {
            Node::Text(text) => {
                if previous_text.is_some_and(|prev| !prev.is_empty()) && !text.is_empty() {
                    return false;
                }
                previous_text = Some(text);
            }
            Node::Element(child) => {
                if !is_normalized(child) {
                    return false;
                }
                previous_text = None;
            }
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Measurements
// ---------------------------------------------------------------------------

/// Number of nodes in the tree, the root included.
///
/// After every render, the node-path registry holds exactly this many
/// entries.
#[must_use]
pub fn count_nodes(element: &Element) -> usize {
    1 + element
        .children
        .iter()
        .map(|child| match child {
            Node::Text(_) => 1,
            Node::Element(element) => count_nodes(element),
        })
        .sum::<usize>()
}

/// All text in the tree, concatenated in document order.
#[must_use]
pub fn text_content(element: &Element) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    out
}

fn collect_text(element: &Element, out: &mut String) {
    for child in &element.children {
        match child {
            Node::Text(text) => out.push_str(&text.text),
            Node::Element(element) => collect_text(element, out),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn texts(element: &Element) -> Vec<&str> {
        element
            .children
            .iter()
            .filter_map(|child| child.as_text().map(|t| t.text.as_str()))
            .collect()
    }

    // -- normalize ----------------------------------------------------------

    #[test]
    fn merges_adjacent_text() {
        let root = Element::new("div", vec![Node::text("a"), Node::text("b")]).into_rc();
        let normalized = normalize(&root);
        assert_eq!(normalized.children.len(), 1);
        assert_eq!(texts(&normalized), ["ab"]);
    }

    #[test]
    fn merged_run_keeps_first_id() {
        let first = Text::new("a");
        let first_id = first.id;
        let root = Element::new("div", vec![first.into(), Node::text("b")]).into_rc();
        assert_eq!(normalize(&root).children[0].id(), first_id);
    }

    #[test]
    fn empty_text_separates_runs() {
        let root = Element::new("div", vec![Node::text("a"), Node::text(""), Node::text("b")]).into_rc();
        let normalized = normalize(&root);
        assert_eq!(texts(&normalized), ["a", "", "b"]);
        assert!(Rc::ptr_eq(&normalized, &root));
    }

    #[test]
    fn merges_three_runs_and_recurses() {
        let inner = Element::new(
            "p",
            vec![
                Node::text("a"),
                Node::element(Element::new("img", vec![])),
                Node::text("b"),
                Node::text("c"),
            ],
        );
        let root = Element::new(
            "div",
            vec![
                Node::text("a"),
                Node::text("b"),
                Node::text("c"),
                Node::element(inner),
            ],
        )
        .into_rc();

        let normalized = normalize(&root);
        assert_eq!(texts(&normalized), ["abc"]);
        let inner = normalized.children[1].as_element().unwrap();
        assert_eq!(texts(inner), ["a", "bc"]);
        assert_eq!(inner.children.len(), 3);
    }

    #[test]
    fn returns_same_rc_when_normalized() {
        let root = Element::new("div", vec![Node::element(Element::new("p", vec![Node::text("a")]))]).into_rc();
        assert!(Rc::ptr_eq(&normalize(&root), &root));
    }

    #[test]
    fn normalize_is_idempotent() {
        let root = Element::new("div", vec![Node::text("x"), Node::text("y"), Node::text("")]).into_rc();
        let once = normalize(&root);
        let twice = normalize(&once);
        assert!(Rc::ptr_eq(&once, &twice));
    }

    #[test]
    fn untouched_siblings_are_shared() {
        let untouched = Node::element(Element::new("p", vec![Node::text("keep")]));
        let root = Element::new(
            "div",
            vec![
                untouched.clone(),
                Node::element(Element::new("p", vec![Node::text("a"), Node::text("b")])),
            ],
        )
        .into_rc();
        let normalized = normalize(&root);
        assert!(normalized.children[0].ptr_eq(&untouched));
        assert!(!normalized.children[1].ptr_eq(&root.children[1]));
    }

    #[test]
    fn does_not_add_or_remove_children() {
        let empty = Element::new("div", vec![]).into_rc();
        assert!(normalize(&empty).children.is_empty());

        let br = Element::new("div", vec![Node::text("")]).into_rc();
        assert_eq!(texts(&normalize(&br)), [""]);
    }

    // -- is_normalized ------------------------------------------------------

    #[test]
    fn is_normalized_cases() {
        assert!(is_normalized(&Element::new("div", vec![Node::text("a")])));
        assert!(is_normalized(&Element::new("div", vec![Node::text("")])));
        assert!(!is_normalized(&Element::new("div", vec![Node::text("a"), Node::text("b")])));
        assert!(is_normalized(&Element::new(
            "div",
            vec![Node::text("a"), Node::text(""), Node::text("a")]
        )));
        assert!(is_normalized(&Element::new(
            "div",
            vec![Node::element(Element::new("p", vec![Node::text("")]))]
        )));
        assert!(!is_normalized(&Element::new(
            "div",
            vec![Node::element(Element::new("p", vec![Node::text("a"), Node::text("b")]))]
        )));
    }

    // -- Measurements -------------------------------------------------------

    #[test]
    fn count_nodes_includes_root() {
        let root = Element::new(
            "div",
            vec![
                Node::element(Element::new("p", vec![Node::text("ab")])),
                Node::element(Element::new("img", vec![])),
                Node::text(""),
            ],
        );
        assert_eq!(count_nodes(&root), 5);
        assert_eq!(count_nodes(&Element::new("div", vec![])), 1);
    }

    #[test]
    fn text_content_concatenates() {
        let root = Element::new(
            "div",
            vec![
                Node::element(Element::new("p", vec![Node::text("ab")])),
                Node::text("c"),
            ],
        );
        assert_eq!(text_content(&root), "abc");
    }

    // -- Serialization ------------------------------------------------------

    #[test]
    fn deserializes_without_ids() {
        let json = r#"{
            "tag": "div",
            "children": [
                { "tag": "p", "props": { "class": "lead" }, "children": [{ "text": "ab" }] },
                { "text": "" }
            ]
        }"#;
        let root: Element = serde_json::from_str(json).unwrap();
        assert_eq!(root.children.len(), 2);
        let p = root.children[0].as_element().unwrap();
        assert_eq!(p.tag, "p");
        assert_eq!(p.props.get("class").map(String::as_str), Some("lead"));
        assert_eq!(texts(p), ["ab"]);
        assert!(root.children[1].as_text().unwrap().is_empty());
        assert_ne!(root.id, p.id);
    }
}
