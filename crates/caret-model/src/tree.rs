//! Tree addressing: resolving paths and rewriting nodes behind them.
//!
//! Writes never mutate. They rebuild the chain of ancestors between the root
//! and the target, copying each ancestor's child list with one slot
//! replaced, and share every untouched sibling by `Rc`. A write that changes
//! nothing hands back the same root.

use std::rc::Rc;

use crate::element::{Element, Node, Text};
use crate::error::ModelError;
use crate::path::Path;
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// What a path resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Point<'a> {
    Element(&'a Element),
    Text(&'a Text),
    /// A character position inside a text run. `offset` may equal the run
    /// length (caret after the last char).
    TextOffset { text: &'a Text, offset: usize },
}

impl<'a> Point<'a> {
    /// The text run, for both text variants.
    #[must_use]
    pub const fn text(&self) -> Option<&'a Text> {
        match *self {
            Self::Text(text) | Self::TextOffset { text, .. } => Some(text),
            Self::Element(_) => None,
        }
    }

    /// The char offset, for [`Point::TextOffset`].
    #[must_use]
    pub const fn offset(&self) -> Option<usize> {
        match *self {
            Self::TextOffset { offset, .. } => Some(offset),
            _ => None,
        }
    }
}

/// Walk `path` down from `root`.
///
/// A component one level below a text run is read as a char offset into it
/// and yields [`Point::TextOffset`]. Any out-of-range index or offset, or a
/// path that continues past an offset, is `None`.
#[must_use]
pub fn resolve_path<'a>(root: &'a Element, path: &Path) -> Option<Point<'a>> {
    let components = path.as_slice();
    let mut element = root;

    for (depth, &index) in components.iter().enumerate() {
        match element.child(index)? {
            Node::Element(child) => element = child,
            Node::Text(text) => {
                return match &components[depth + 1..] {
                    [] => Some(Point::Text(text)),
                    &[offset] if offset <= text.len() => Some(Point::TextOffset { text, offset }),
                    _ => None,
                };
            }
        }
    }

    Some(Point::Element(element))
}

/// The element at `path`, or the element holding the text run `path` lands
/// in.
#[must_use]
pub fn parent_element_at<'a>(root: &'a Element, path: &Path) -> Option<&'a Element> {
    let mut element = root;
    for &index in path.as_slice() {
        match element.child(index)? {
            Node::Element(child) => element = child,
            Node::Text(_) => break,
        }
    }
    resolve_path(root, path).map(|_| element)
}

/// The path of the text run a path lands in. `[0, 0, 3]` → `[0, 0]` when
/// `[0, 0]` is text; a path to the run itself is returned as is.
///
/// # Errors
///
/// [`ModelError::NotFound`] for stale paths, [`ModelError::NotText`] when the
/// path addresses an element.
pub fn text_node_path(root: &Element, path: &Path) -> Result<Path, ModelError> {
    match resolve_path(root, path) {
        None => Err(ModelError::NotFound(path.clone())),
        Some(Point::Element(_)) => Err(ModelError::NotText(path.clone())),
        Some(Point::Text(_)) => Ok(path.clone()),
        Some(Point::TextOffset { .. }) => path.parent().ok_or_else(|| ModelError::NotFound(path.clone())),
    }
}

// ---------------------------------------------------------------------------
// Lens
// ---------------------------------------------------------------------------

/// The node at `path`. The root path yields the root itself.
#[must_use]
pub fn get(root: &Rc<Element>, path: &Path) -> Option<Node> {
    let mut node = Node::Element(Rc::clone(root));
    for &index in path.as_slice() {
        let child = node.as_element()?.child(index)?.clone();
        node = child;
    }
    Some(node)
}

/// Replace the node at `path`.
///
/// # Errors
///
/// See [`modify`].
pub fn set(root: &Rc<Element>, path: &Path, node: Node) -> Result<Rc<Element>, ModelError> {
    modify(root, path, |_| node)
}

/// Replace the node at `path` with `f(node)`.
///
/// Returns the same root when `f` hands back the node it was given.
///
/// # Errors
///
/// [`ModelError::NotFound`] when the path does not address a node, and
/// [`ModelError::NotElement`] when `f` turns the root into a text run.
pub fn modify<F>(root: &Rc<Element>, path: &Path, f: F) -> Result<Rc<Element>, ModelError>
where
    F: FnOnce(&Node) -> Node,
{
    if path.is_root() {
        let current = Node::Element(Rc::clone(root));
        return match f(&current) {
            Node::Element(element) => Ok(element),
            Node::Text(_) => Err(ModelError::NotElement(path.clone())),
        };
    }
    modify_at(root, path.as_slice(), path, f)
}

fn modify_at<F>(element: &Rc<Element>, rest: &[usize], path: &Path, f: F) -> Result<Rc<Element>, ModelError>
where
    F: FnOnce(&Node) -> Node,
{
    let Some((&index, rest)) = rest.split_first() else {
        return Err(ModelError::NotFound(path.clone()));
    };
    let child = element.child(index).ok_or_else(|| ModelError::NotFound(path.clone()))?;

    let replacement = if rest.is_empty() {
        f(child)
    } else {
        match child {
            Node::Element(child) => Node::Element(modify_at(child, rest, path, f)?),
            Node::Text(_) => return Err(ModelError::NotFound(path.clone())),
        }
    };

    if replacement.ptr_eq(child) {
        return Ok(Rc::clone(element));
    }
    let mut children = element.children.clone();
    children[index] = replacement;
    Ok(Rc::new(element.with_children(children)))
}

// ---------------------------------------------------------------------------
// Text mutation
// ---------------------------------------------------------------------------

/// Replace the content of the text run `path` points into. The run keeps its
/// id.
///
/// `path` may address the run itself or a char offset inside it.
///
/// # Errors
///
/// [`ModelError::NotFound`] for stale paths, [`ModelError::NotText`] when the
/// path addresses an element.
pub fn set_text(root: &Rc<Element>, path: &Path, text: &str) -> Result<Rc<Element>, ModelError> {
    let node_path = text_node_path(root, path)?;
    modify(root, &node_path, |node| match node {
        Node::Text(current) if current.text != text => Node::Text(Rc::new(current.with_text(text))),
        other => other.clone(),
    })
}

/// Remove the chars covered by `selection`.
///
/// Both ends must be char offsets into the same text run. Deleting across
/// runs or elements is left to host commands.
///
/// # Errors
///
/// [`ModelError::NotFound`] for stale paths, [`ModelError::NotText`] when an
/// end is not a char offset, [`ModelError::CrossesBoundary`] when the ends
/// are in different runs.
pub fn delete_range(root: &Rc<Element>, selection: &Selection) -> Result<Rc<Element>, ModelError> {
    let range = selection.as_forward_range();
    let start = resolve_offset(root, &range.anchor)?;
    let end = resolve_offset(root, &range.focus)?;

    if range.anchor.parent() != range.focus.parent() {
        return Err(ModelError::CrossesBoundary {
            anchor: selection.anchor.clone(),
            focus: selection.focus.clone(),
        });
    }
    if start.1 == end.1 {
        return Ok(Rc::clone(root));
    }

    let text: String = start
        .0
        .text
        .chars()
        .take(start.1)
        .chain(start.0.text.chars().skip(end.1))
        .collect();
    set_text(root, &range.anchor, &text)
}

fn resolve_offset<'a>(root: &'a Element, path: &Path) -> Result<(&'a Text, usize), ModelError> {
    match resolve_path(root, path) {
        None => Err(ModelError::NotFound(path.clone())),
        Some(Point::TextOffset { text, offset }) => Ok((text, offset)),
        Some(_) => Err(ModelError::NotText(path.clone())),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::element::text_content;

    /// div > [ p > ["ab"], "", img ]
    fn doc() -> Rc<Element> {
        Element::new(
            "div",
            vec![
                Node::element(Element::new("p", vec![Node::text("ab")])),
                Node::text(""),
                Node::element(Element::new("img", vec![])),
            ],
        )
        .into_rc()
    }

    fn text_at(root: &Element, path: &[usize]) -> String {
        resolve_path(root, &Path::from(path))
            .and_then(|p| p.text())
            .map(|t| t.text.clone())
            .unwrap()
    }

    // -- resolve_path -------------------------------------------------------

    #[test]
    fn resolves_root_and_elements() {
        let root = doc();
        assert!(matches!(resolve_path(&root, &Path::root()), Some(Point::Element(e)) if e.tag == "div"));
        assert!(matches!(resolve_path(&root, &Path::from([0])), Some(Point::Element(e)) if e.tag == "p"));
        assert!(matches!(resolve_path(&root, &Path::from([2])), Some(Point::Element(e)) if e.tag == "img"));
    }

    #[test]
    fn resolves_text_and_offsets() {
        let root = doc();
        assert!(matches!(resolve_path(&root, &Path::from([0, 0])), Some(Point::Text(t)) if t.text == "ab"));

        let point = resolve_path(&root, &Path::from([0, 0, 2])).unwrap();
        assert_eq!(point.offset(), Some(2));
        assert_eq!(point.text().map(|t| t.text.as_str()), Some("ab"));

        // The empty run accepts offset 0.
        assert_eq!(resolve_path(&root, &Path::from([1, 0])).unwrap().offset(), Some(0));
    }

    #[test]
    fn out_of_bounds_is_none() {
        let root = doc();
        assert_eq!(resolve_path(&root, &Path::from([3])), None);
        assert_eq!(resolve_path(&root, &Path::from([0, 1])), None);
        assert_eq!(resolve_path(&root, &Path::from([0, 0, 3])), None);
        assert_eq!(resolve_path(&root, &Path::from([0, 0, 1, 0])), None);
        assert_eq!(resolve_path(&root, &Path::from([2, 0])), None);
    }

    #[test]
    fn parent_element_of_text_and_element() {
        let root = doc();
        assert_eq!(parent_element_at(&root, &Path::from([0, 0, 1])).map(|e| e.tag.as_str()), Some("p"));
        assert_eq!(parent_element_at(&root, &Path::from([1])).map(|e| e.tag.as_str()), Some("div"));
        assert_eq!(parent_element_at(&root, &Path::from([2])).map(|e| e.tag.as_str()), Some("img"));
        assert_eq!(parent_element_at(&root, &Path::from([9])), None);
    }

    // -- Lens ---------------------------------------------------------------

    #[test]
    fn get_returns_shared_nodes() {
        let root = doc();
        let p = get(&root, &Path::from([0])).unwrap();
        assert!(p.ptr_eq(&root.children[0]));
        assert!(get(&root, &Path::from([0, 5])).is_none());
        assert!(matches!(get(&root, &Path::root()), Some(Node::Element(e)) if Rc::ptr_eq(&e, &root)));
    }

    #[test]
    fn set_rebuilds_ancestors_only() {
        let root = doc();
        let next = set(&root, &Path::from([0, 0]), Node::text("xy")).unwrap();

        assert!(!Rc::ptr_eq(&next, &root));
        assert!(!next.children[0].ptr_eq(&root.children[0]));
        assert!(next.children[1].ptr_eq(&root.children[1]));
        assert!(next.children[2].ptr_eq(&root.children[2]));
        assert_eq!(next.id, root.id);
        assert_eq!(text_content(&next), "xy");
    }

    #[test]
    fn modify_identity_keeps_root() {
        let root = doc();
        let next = modify(&root, &Path::from([0, 0]), Node::clone).unwrap();
        assert!(Rc::ptr_eq(&next, &root));
    }

    #[test]
    fn set_stale_path_fails() {
        let root = doc();
        assert_eq!(
            set(&root, &Path::from([0, 4]), Node::text("x")),
            Err(ModelError::NotFound(Path::from([0, 4])))
        );
    }

    #[test]
    fn root_can_only_become_an_element() {
        let root = doc();
        let replacement = Element::new("section", vec![]);
        let next = set(&root, &Path::root(), Node::element(replacement)).unwrap();
        assert_eq!(next.tag, "section");
        assert!(set(&root, &Path::root(), Node::text("x")).is_err());
    }

    // -- set_text -----------------------------------------------------------

    #[test]
    fn set_text_through_offset_path_keeps_id() {
        let root = doc();
        let id = root.children[0].as_element().unwrap().children[0].id();
        let next = set_text(&root, &Path::from([0, 0, 1]), "axb").unwrap();
        assert_eq!(text_at(&next, &[0, 0]), "axb");
        assert_eq!(next.children[0].as_element().unwrap().children[0].id(), id);
    }

    #[test]
    fn set_text_same_content_is_noop() {
        let root = doc();
        assert!(Rc::ptr_eq(&set_text(&root, &Path::from([0, 0]), "ab").unwrap(), &root));
    }

    #[test]
    fn set_text_on_element_fails() {
        let root = doc();
        assert_eq!(
            set_text(&root, &Path::from([0]), "x"),
            Err(ModelError::NotText(Path::from([0])))
        );
        assert_eq!(
            set_text(&root, &Path::from([7, 0]), "x"),
            Err(ModelError::NotFound(Path::from([7, 0])))
        );
    }

    // -- delete_range -------------------------------------------------------

    #[test]
    fn delete_within_one_run() {
        let root = Element::new("div", vec![Node::text("hello")]).into_rc();
        let selection = Selection::new(Path::from([0, 2]), Path::from([0, 4]));
        let next = delete_range(&root, &selection).unwrap();
        assert_eq!(text_content(&next), "heo");
    }

    #[test]
    fn delete_backward_range() {
        let root = Element::new("div", vec![Node::text("hello")]).into_rc();
        let selection = Selection::new(Path::from([0, 5]), Path::from([0, 1]));
        assert_eq!(text_content(&delete_range(&root, &selection).unwrap()), "h");
    }

    #[test]
    fn delete_collapsed_is_noop() {
        let root = Element::new("div", vec![Node::text("hello")]).into_rc();
        let caret = Selection::caret(Path::from([0, 3]));
        assert!(Rc::ptr_eq(&delete_range(&root, &caret).unwrap(), &root));
    }

    #[test]
    fn delete_across_runs_is_rejected() {
        let root = Element::new("div", vec![Node::text("ab"), Node::text(""), Node::text("cd")]).into_rc();
        let selection = Selection::new(Path::from([0, 1]), Path::from([2, 1]));
        assert!(matches!(
            delete_range(&root, &selection),
            Err(ModelError::CrossesBoundary { .. })
        ));
    }

    #[test]
    fn delete_counts_chars_not_bytes() {
        let root = Element::new("div", vec![Node::text("żółw")]).into_rc();
        let selection = Selection::new(Path::from([0, 1]), Path::from([0, 3]));
        assert_eq!(text_content(&delete_range(&root, &selection).unwrap()), "żw");
    }
}
