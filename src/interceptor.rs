// SPDX-License-Identifier: MIT
//
// Input-event interceptor.
//
// Every `beforeinput` is classified and either blocked, or allowed with a
// task deferred until the browser's edit has landed. The common path lets
// the browser edit and reads the result back: IME, spellcheck and browser
// extensions all change text in ways no synthetic edit can reproduce, and
// the settled DOM is the ground truth.
//
// | inputType                     | Selection                  | Verdict                        |
// |-------------------------------|----------------------------|--------------------------------|
// | `insertText`                  | caret                      | allow, read text after typing  |
// | `insertText`                  | range                      | prevent                        |
// | `insertReplacementText`       | any                        | allow, read text after typing  |
// | `deleteContentBackward/Fwd`   | caret, not at the boundary | allow, read text after typing  |
// | `deleteContentBackward/Fwd`   | caret, deletes whole node  | prevent, dispatch empty text   |
// | `deleteContentBackward/Fwd`   | range or at the boundary   | prevent                        |
// | composition, anything else    | any                        | prevent                        |
//
// Two browser behaviors need special handling:
//
// - Typing into an empty line replaces its `<br>` placeholder with a new
//   text node. The render layer still believes the `<br>` is mounted, so
//   the deferred task reads the new text node and puts the `<br>` back.
//   The next render swaps it for a text node it owns.
// - Deleting the last char of a text node is inconsistent across browsers
//   (some leave an empty text node, some a `<br>`, some remove the node).
//   That one case is prevented and expressed as an empty text run, the
//   model's line-break marker.

use caret_dom::{DomNodeId, DomPoint, DomSelection, InputEvent, InputType, NativeDom};
use caret_model::{Action, Selection};

use crate::bridge::{dom_point_to_path, dom_selection_to_model};
use crate::registry::Registry;

// ─── Classification ──────────────────────────────────────────────────────────

/// What to do with an input type, before looking at the DOM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputClass {
    InsertText,
    InsertReplacementText,
    DeleteContent { forward: bool },
    Prevent(Unhandled),
}

/// Why an input event is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unhandled {
    RangeInsert,
    RangeDelete,
    BoundaryDelete,
    Composition,
    InputType,
}

/// Classify an input event by type and selection shape.
///
/// `at_boundary` is true when the caret sits at the edge a delete moves
/// towards: offset 0 for Backspace, the end of the text node for Delete, or
/// not in a text node at all.
#[must_use]
pub fn classify(input_type: &InputType, collapsed: bool, at_boundary: bool) -> InputClass {
    match input_type {
        InputType::InsertText if collapsed => InputClass::InsertText,
        InputType::InsertText => InputClass::Prevent(Unhandled::RangeInsert),
        InputType::InsertReplacementText => InputClass::InsertReplacementText,
        InputType::DeleteContentBackward | InputType::DeleteContentForward => {
            if !collapsed {
                InputClass::Prevent(Unhandled::RangeDelete)
            } else if at_boundary {
                InputClass::Prevent(Unhandled::BoundaryDelete)
            } else {
                InputClass::DeleteContent {
                    forward: *input_type == InputType::DeleteContentForward,
                }
            }
        }
        InputType::InsertCompositionText => InputClass::Prevent(Unhandled::Composition),
        _ => InputClass::Prevent(Unhandled::InputType),
    }
}

// ─── Verdict ─────────────────────────────────────────────────────────────────

/// A `<br>` the browser is about to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineBreak {
    pub parent: DomNodeId,
    pub index: usize,
    pub br: DomNodeId,
}

/// Work that must wait until the browser's edit has landed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Read the typed text. `node` is the text node typed into, or the
    /// `<br>` being replaced when `line_break` is set.
    InsertText {
        node: DomNodeId,
        line_break: Option<LineBreak>,
        selection: Selection,
    },
    /// Read the text node a spellcheck replacement rewrote.
    InsertReplacementText { node: DomNodeId },
    /// Read the text node a delete shortened.
    DeleteText { node: DomNodeId, selection: Selection },
}

/// The interceptor's decision for one `beforeinput`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Let the browser edit, then run the task.
    Allow(Deferred),
    /// Block the browser edit, and dispatch the action if there is one.
    Prevent(Option<Action>),
}

/// Decide what to do with a `beforeinput`.
pub fn before_input<D>(dom: &D, registry: &Registry, event: &InputEvent) -> Verdict
where
    D: NativeDom + ?Sized,
{
    let Some(native) = dom.selection() else {
        tracing::warn!(input_type = %event.input_type, "input without a native selection");
        return Verdict::Prevent(None);
    };
    let Some(selection) = dom_selection_to_model(&native, registry) else {
        tracing::warn!(input_type = %event.input_type, "native selection is outside the editor");
        return Verdict::Prevent(None);
    };
    if event.is_composing {
        tracing::warn!(input_type = %event.input_type, "composition input is not handled");
        return Verdict::Prevent(None);
    }

    let class = classify(&event.input_type, native.is_collapsed(), at_boundary(dom, &event.input_type, &native));
    match class {
        InputClass::InsertText => insert_text(dom, &native, selection, event.data()),
        InputClass::InsertReplacementText => {
            let node = event
                .target_range()
                .map_or(native.anchor.node, |range| range.start.node);
            Verdict::Allow(Deferred::InsertReplacementText { node })
        }
        InputClass::DeleteContent { forward } => delete_content(dom, registry, event, &native, &selection, forward),
        InputClass::Prevent(reason) => {
            tracing::warn!(input_type = %event.input_type, ?reason, "input prevented");
            Verdict::Prevent(None)
        }
    }
}

fn at_boundary<D>(dom: &D, input_type: &InputType, native: &DomSelection) -> bool
where
    D: NativeDom + ?Sized,
{
    let point = native.anchor;
    if !dom.is_text(point.node) {
        return true;
    }
    match input_type {
        InputType::DeleteContentBackward => point.offset == 0,
        InputType::DeleteContentForward => point.offset >= dom.node_length(point.node),
        _ => false,
    }
}

fn insert_text<D>(dom: &D, native: &DomSelection, selection: Selection, data: &str) -> Verdict
where
    D: NativeDom + ?Sized,
{
    let inserted = data.chars().count();
    let offset = isize::try_from(inserted).unwrap_or(isize::MAX);
    let point = native.anchor;

    if dom.is_text(point.node) {
        return Verdict::Allow(Deferred::InsertText {
            node: point.node,
            line_break: None,
            selection: selection.moved_by(offset),
        });
    }

    // Caret inside a `<br>`: same edit as a caret just before it. The path
    // already ends in the run offset.
    if dom.is_line_break(point.node) {
        let line_break = dom.parent(point.node).and_then(|parent| {
            let index = dom.children(parent).iter().position(|&child| child == point.node)?;
            Some(LineBreak {
                parent,
                index,
                br: point.node,
            })
        });
        return match line_break {
            Some(line_break) => Verdict::Allow(Deferred::InsertText {
                node: point.node,
                line_break: Some(line_break),
                selection: selection.moved_by(offset),
            }),
            None => Verdict::Prevent(None),
        };
    }

    // Caret before a `<br>`: the browser will swap it for a text node, and
    // the caret lands inside that node's run.
    match dom.child(point.node, point.offset) {
        Some(br) if dom.is_line_break(br) => Verdict::Allow(Deferred::InsertText {
            node: br,
            line_break: Some(LineBreak {
                parent: point.node,
                index: point.offset,
                br,
            }),
            selection: selection.child_selection(inserted, inserted),
        }),
        _ => {
            tracing::warn!(?point, "typing outside a text node or line break");
            Verdict::Prevent(None)
        }
    }
}

fn delete_content<D>(
    dom: &D,
    registry: &Registry,
    event: &InputEvent,
    native: &DomSelection,
    selection: &Selection,
    forward: bool,
) -> Verdict
where
    D: NativeDom + ?Sized,
{
    let node = native.anchor.node;
    let len = dom.node_length(node);

    let target = event.target_range().copied().filter(|range| range.start.node == node && range.end.node == node);
    let (start, end) = target.map_or_else(
        || {
            let offset = native.anchor.offset;
            if forward { (offset, offset + 1) } else { (offset.saturating_sub(1), offset) }
        },
        |range| (range.start.offset, range.end.offset),
    );

    if start == 0 && end >= len {
        // The node would become empty: becomes a line break in the model.
        let Some(parent) = selection.parent_selection() else {
            return Verdict::Prevent(None);
        };
        return Verdict::Prevent(Some(Action::DeleteText {
            text: String::new(),
            selection: parent,
        }));
    }

    let Some(caret) = dom_point_to_path(DomPoint::new(node, start), registry) else {
        return Verdict::Prevent(None);
    };
    Verdict::Allow(Deferred::DeleteText {
        node,
        selection: Selection::caret(caret),
    })
}

// ─── After typing ────────────────────────────────────────────────────────────

/// Run a deferred task against the settled DOM and produce the action to
/// dispatch.
///
/// Returns `None` when the DOM no longer looks like what the task expects,
/// for example when an extension removed the node in between.
pub fn settle<D>(dom: &mut D, task: Deferred) -> Option<Action>
where
    D: NativeDom + ?Sized,
{
    match task {
        Deferred::InsertText {
            node,
            line_break: None,
            selection,
        } => Some(Action::InsertText {
            text: dom.text_content(node)?,
            selection,
        }),

        Deferred::InsertText {
            line_break: Some(line_break),
            selection,
            ..
        } => {
            let fresh = dom.child(line_break.parent, line_break.index)?;
            let text = dom.text_content(fresh)?;
            if fresh != line_break.br {
                if let Err(err) = dom.replace_child(line_break.parent, line_break.br, fresh) {
                    tracing::warn!(%err, "could not restore the line break");
                }
            }
            Some(Action::InsertText { text, selection })
        }

        Deferred::InsertReplacementText { node } => Some(Action::InsertReplacementText {
            text: dom.text_content(node)?,
        }),

        Deferred::DeleteText { node, selection } => Some(Action::DeleteText {
            text: dom.text_content(node)?,
            selection,
        }),
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use caret_dom::{Document, DomRange};
    use caret_model::Path;
    use pretty_assertions::assert_eq;

    use super::*;

    /// container > [ p > "ab", p > br ], registered like a render would.
    struct Fixture {
        doc: Document,
        registry: Registry,
        p2: DomNodeId,
        text: DomNodeId,
        br: DomNodeId,
    }

    fn fixture() -> Fixture {
        let mut doc = Document::new();
        let container = doc.create_element("div");
        let p1 = doc.create_element("p");
        let text = doc.create_text("ab");
        let p2 = doc.create_element("p");
        let br = doc.create_element("br");
        doc.append_child(doc.body(), container).unwrap();
        doc.append_child(container, p1).unwrap();
        doc.append_child(p1, text).unwrap();
        doc.append_child(container, p2).unwrap();
        doc.append_child(p2, br).unwrap();

        let mut registry = Registry::new();
        registry.register(container, &Path::root());
        registry.register(p1, &Path::from([0]));
        registry.register(text, &Path::from([0, 0]));
        registry.register(p2, &Path::from([1]));
        registry.register(br, &Path::from([1, 0]));
        Fixture {
            doc,
            registry,
            p2,
            text,
            br,
        }
    }

    fn caret_at(f: &mut Fixture, node: DomNodeId, offset: usize) {
        f.doc.select(DomPoint::new(node, offset), DomPoint::new(node, offset));
    }

    // ── classify ────────────────────────────────────────────────

    #[test]
    fn classification_table() {
        use InputClass as C;
        let t = InputType::parse;
        assert_eq!(classify(&t("insertText"), true, false), C::InsertText);
        assert_eq!(classify(&t("insertText"), false, false), C::Prevent(Unhandled::RangeInsert));
        assert_eq!(classify(&t("insertReplacementText"), false, true), C::InsertReplacementText);
        assert_eq!(
            classify(&t("deleteContentBackward"), true, false),
            C::DeleteContent { forward: false }
        );
        assert_eq!(
            classify(&t("deleteContentForward"), true, false),
            C::DeleteContent { forward: true }
        );
        assert_eq!(
            classify(&t("deleteContentBackward"), true, true),
            C::Prevent(Unhandled::BoundaryDelete)
        );
        assert_eq!(
            classify(&t("deleteContentForward"), false, false),
            C::Prevent(Unhandled::RangeDelete)
        );
        assert_eq!(
            classify(&t("insertCompositionText"), true, false),
            C::Prevent(Unhandled::Composition)
        );
        assert_eq!(classify(&t("insertParagraph"), true, false), C::Prevent(Unhandled::InputType));
        assert_eq!(classify(&t("formatBold"), true, false), C::Prevent(Unhandled::InputType));
    }

    // ── before_input ────────────────────────────────────────────

    #[test]
    fn no_selection_prevents() {
        let f = fixture();
        let event = f.doc.before_input("insertText", Some("x"));
        assert_eq!(before_input(&f.doc, &f.registry, &event), Verdict::Prevent(None));
    }

    #[test]
    fn typing_in_text_defers_read() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 1);
        let event = f.doc.before_input("insertText", Some("cd"));
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Allow(Deferred::InsertText {
                node: text,
                line_break: None,
                selection: Selection::caret(Path::from([0, 0, 3])),
            })
        );
    }

    #[test]
    fn typing_over_range_prevents() {
        let mut f = fixture();
        f.doc.select(DomPoint::new(f.text, 0), DomPoint::new(f.text, 2));
        let event = f.doc.before_input("insertText", Some("x"));
        assert_eq!(before_input(&f.doc, &f.registry, &event), Verdict::Prevent(None));
    }

    #[test]
    fn typing_into_line_break() {
        let mut f = fixture();
        let (p2, br) = (f.p2, f.br);
        caret_at(&mut f, p2, 0);
        let event = f.doc.before_input("insertText", Some("x"));
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Allow(Deferred::InsertText {
                node: br,
                line_break: Some(LineBreak { parent: p2, index: 0, br }),
                selection: Selection::caret(Path::from([1, 0, 1])),
            })
        );
    }

    #[test]
    fn typing_with_caret_inside_line_break() {
        let mut f = fixture();
        let (p2, br) = (f.p2, f.br);
        caret_at(&mut f, br, 0);
        let event = f.doc.before_input("insertText", Some("x"));
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Allow(Deferred::InsertText {
                node: br,
                line_break: Some(LineBreak { parent: p2, index: 0, br }),
                selection: Selection::caret(Path::from([1, 0, 1])),
            })
        );
    }

    #[test]
    fn backspace_inside_text_defers_read() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 2);
        let event = f.doc.before_input(InputType::DeleteContentBackward, None);
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Allow(Deferred::DeleteText {
                node: text,
                selection: Selection::caret(Path::from([0, 0, 1])),
            })
        );
    }

    #[test]
    fn backspace_at_start_prevents() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 0);
        let event = f.doc.before_input(InputType::DeleteContentBackward, None);
        assert_eq!(before_input(&f.doc, &f.registry, &event), Verdict::Prevent(None));
    }

    #[test]
    fn delete_at_end_prevents() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 2);
        let event = f.doc.before_input(InputType::DeleteContentForward, None);
        assert_eq!(before_input(&f.doc, &f.registry, &event), Verdict::Prevent(None));
    }

    #[test]
    fn deleting_whole_node_dispatches_empty_text() {
        let mut f = fixture();
        let text = f.text;
        f.doc.set_text_data(text, "a").unwrap();
        caret_at(&mut f, text, 1);
        let event = f.doc.before_input(InputType::DeleteContentBackward, None);
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Prevent(Some(Action::DeleteText {
                text: String::new(),
                selection: Selection::caret(Path::from([0, 0])),
            }))
        );
    }

    #[test]
    fn replacement_reads_target_node() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 2);
        let event = InputEvent::new(InputType::InsertReplacementText)
            .with_data("ba")
            .with_target_range(DomRange::new(DomPoint::new(text, 0), DomPoint::new(text, 2)));
        assert_eq!(
            before_input(&f.doc, &f.registry, &event),
            Verdict::Allow(Deferred::InsertReplacementText { node: text })
        );
    }

    #[test]
    fn composing_prevents() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 1);
        let mut event = f.doc.before_input("insertText", Some("x"));
        event.is_composing = true;
        assert_eq!(before_input(&f.doc, &f.registry, &event), Verdict::Prevent(None));
    }

    // ── settle ──────────────────────────────────────────────────

    #[test]
    fn settle_reads_typed_text() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 1);
        let event = f.doc.before_input("insertText", Some("c"));
        let Verdict::Allow(task) = before_input(&f.doc, &f.registry, &event) else {
            panic!("expected allow");
        };
        f.doc.apply_default_input(&event).unwrap();

        assert_eq!(
            settle(&mut f.doc, task),
            Some(Action::InsertText {
                text: "acb".into(),
                selection: Selection::caret(Path::from([0, 0, 2])),
            })
        );
    }

    #[test]
    fn settle_restores_line_break() {
        let mut f = fixture();
        let (p2, br) = (f.p2, f.br);
        caret_at(&mut f, p2, 0);
        let event = f.doc.before_input("insertText", Some("x"));
        let Verdict::Allow(task) = before_input(&f.doc, &f.registry, &event) else {
            panic!("expected allow");
        };
        f.doc.apply_default_input(&event).unwrap();
        assert_eq!(f.doc.inner_html(p2), "x");

        let action = settle(&mut f.doc, task);
        assert_eq!(
            action,
            Some(Action::InsertText {
                text: "x".into(),
                selection: Selection::caret(Path::from([1, 0, 1])),
            })
        );
        assert_eq!(f.doc.children(p2), vec![br]);
    }

    #[test]
    fn settle_reads_shortened_text() {
        let mut f = fixture();
        let text = f.text;
        caret_at(&mut f, text, 2);
        let event = f.doc.before_input(InputType::DeleteContentBackward, None);
        let Verdict::Allow(task) = before_input(&f.doc, &f.registry, &event) else {
            panic!("expected allow");
        };
        f.doc.apply_default_input(&event).unwrap();
        assert_eq!(
            settle(&mut f.doc, task),
            Some(Action::DeleteText {
                text: "a".into(),
                selection: Selection::caret(Path::from([0, 0, 1])),
            })
        );
    }
}
