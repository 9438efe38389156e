//! Editor state, the value the host owns.

use std::borrow::Cow;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::element::{Element, normalize};
use crate::error::ModelError;
use crate::selection::Selection;
use crate::tree;

/// The whole editor state.
///
/// An immutable value. Every transition yields a new value that shares the
/// untouched parts of the old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorState {
    /// The root element.
    pub element: Rc<Element>,
    /// `None` until the user (or the host) places a caret.
    #[serde(default)]
    pub selection: Option<Selection>,
    #[serde(default)]
    pub has_focus: bool,
    /// Focus left because the OS switched tabs or windows, not because of a
    /// deliberate blur. The editor restores focus when it comes back.
    #[serde(default)]
    pub tab_lost_focus: bool,
}

impl EditorState {
    /// Unfocused state with no selection.
    #[must_use]
    pub fn new(element: Element) -> Self {
        Self {
            element: Rc::new(element),
            selection: None,
            has_focus: false,
            tab_lost_focus: false,
        }
    }

    /// Builder: set the selection.
    #[must_use]
    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Builder: set focus.
    #[must_use]
    pub fn focused(mut self) -> Self {
        self.has_focus = true;
        self
    }

    /// A copy with `selection` applied.
    #[must_use]
    pub fn select(&self, selection: Selection) -> Self {
        Self {
            selection: Some(selection),
            ..self.clone()
        }
    }

    /// Write `text` into the text run under the selection anchor.
    ///
    /// # Errors
    ///
    /// [`ModelError::NoSelection`] without a selection, otherwise whatever
    /// [`tree::set_text`] reports.
    pub fn set_text(&self, text: &str) -> Result<Self, ModelError> {
        let selection = self.selection.as_ref().ok_or(ModelError::NoSelection)?;
        let element = tree::set_text(&self.element, &selection.anchor, text)?;
        Ok(Self {
            element,
            ..self.clone()
        })
    }

    /// Delete the chars covered by `selection` and collapse to its start.
    ///
    /// # Errors
    ///
    /// See [`tree::delete_range`].
    pub fn delete_content(&self, selection: &Selection) -> Result<Self, ModelError> {
        let element = tree::delete_range(&self.element, selection)?;
        Ok(Self {
            element,
            selection: Some(selection.collapse_to_start()),
            ..self.clone()
        })
    }

    /// The state with a normalized element. Borrowed when it already was.
    #[must_use]
    pub fn normalized(&self) -> Cow<'_, Self> {
        let element = normalize(&self.element);
        if Rc::ptr_eq(&element, &self.element) {
            Cow::Borrowed(self)
        } else {
            Cow::Owned(Self {
                element,
                ..self.clone()
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::element::{Node, text_content};
    use crate::path::Path;

    fn state(text: &str) -> EditorState {
        EditorState::new(Element::new("div", vec![Node::text(text)]))
    }

    #[test]
    fn new_is_unfocused_without_selection() {
        let s = state("a");
        assert_eq!(s.selection, None);
        assert!(!s.has_focus);
        assert!(!s.tab_lost_focus);
    }

    #[test]
    fn set_text_writes_at_anchor() {
        let s = state("helo").with_selection(Selection::caret(Path::from([0, 2])));
        let next = s.set_text("hello").unwrap();
        assert_eq!(text_content(&next.element), "hello");
        assert_eq!(next.selection, s.selection);
    }

    #[test]
    fn set_text_needs_a_selection() {
        assert_eq!(state("a").set_text("b"), Err(ModelError::NoSelection));
    }

    #[test]
    fn delete_content_collapses_to_start() {
        let s = state("hello");
        let range = Selection::new(Path::from([0, 4]), Path::from([0, 1]));
        let next = s.delete_content(&range).unwrap();
        assert_eq!(text_content(&next.element), "ho");
        assert_eq!(next.selection, Some(Selection::caret(Path::from([0, 1]))));
    }

    #[test]
    fn normalized_borrows_when_clean() {
        let s = state("a");
        assert!(matches!(s.normalized(), Cow::Borrowed(b) if std::ptr::eq(b, &s)));

        let dirty = EditorState::new(Element::new("div", vec![Node::text("a"), Node::text("b")]));
        let clean = dirty.normalized();
        assert!(matches!(clean, Cow::Owned(_)));
        assert_eq!(clean.element.children.len(), 1);
    }

    #[test]
    fn deserializes_with_defaults() {
        let json = r#"{ "element": { "children": [{ "text": "x" }] } }"#;
        let s: EditorState = serde_json::from_str(json).unwrap();
        assert_eq!(s.element.tag, "div");
        assert_eq!(s.selection, None);
        assert!(!s.has_focus);
    }
}
