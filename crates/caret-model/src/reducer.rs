//! Actions and the reducer, the only place document edits are committed.
//!
//! # Actions
//!
//! | Action                  | Effect                                              |
//! |-------------------------|-----------------------------------------------------|
//! | `Focus`                 | `has_focus = true`, clears `tab_lost_focus`         |
//! | `Blur`                  | `has_focus = false`, records `tab_lost_focus`       |
//! | `SelectionChange`       | Replace the selection                               |
//! | `InsertText`            | Write text at the old anchor, then select           |
//! | `DeleteText`            | Select, then write text at the new anchor           |
//! | `InsertReplacementText` | Write text at the anchor, selection unchanged       |
//!
//! # Ordering
//!
//! `InsertText` writes before it selects because the new selection may point
//! past the end of the old text. `DeleteText` selects first because its text
//! is already the final content and the new caret identifies the run to
//! write into.
//!
//! # Identity
//!
//! [`reduce`] returns [`Cow::Borrowed`] for no-ops. Hosts compare states by
//! reference to skip work, so a no-op must never allocate a new state.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::selection::Selection;
use crate::state::EditorState;

/// Everything that can change an [`EditorState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Focus,
    Blur {
        /// True when the blur came from an OS tab or window switch.
        #[serde(default)]
        tab_lost_focus: bool,
    },
    SelectionChange { selection: Selection },
    InsertText { text: String, selection: Selection },
    DeleteText { text: String, selection: Selection },
    InsertReplacementText { text: String },
}

impl Action {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::Blur { .. } => "blur",
            Self::SelectionChange { .. } => "selectionChange",
            Self::InsertText { .. } => "insertText",
            Self::DeleteText { .. } => "deleteText",
            Self::InsertReplacementText { .. } => "insertReplacementText",
        }
    }
}

/// A reducer function, so hosts can wrap or replace [`reduce`].
pub type Reducer = for<'a> fn(&'a EditorState, &Action) -> Cow<'a, EditorState>;

/// Apply `action` to `state`.
#[must_use]
pub fn reduce<'a>(state: &'a EditorState, action: &Action) -> Cow<'a, EditorState> {
    match action {
        Action::Focus => {
            if state.has_focus {
                return Cow::Borrowed(state);
            }
            Cow::Owned(EditorState {
                has_focus: true,
                tab_lost_focus: false,
                ..state.clone()
            })
        }

        Action::Blur { tab_lost_focus } => {
            if !state.has_focus {
                return Cow::Borrowed(state);
            }
            Cow::Owned(EditorState {
                has_focus: false,
                tab_lost_focus: *tab_lost_focus,
                ..state.clone()
            })
        }

        Action::SelectionChange { selection } => Cow::Owned(state.select(selection.clone())),

        Action::InsertText { text, selection } => {
            if state.selection.is_none() {
                tracing::warn!("insertText without a selection");
                return Cow::Borrowed(state);
            }
            commit(state, state.set_text(text).map(|next| next.select(selection.clone())))
        }

        Action::DeleteText { text, selection } => commit(state, state.select(selection.clone()).set_text(text)),

        Action::InsertReplacementText { text } => {
            if state.selection.is_none() {
                tracing::warn!("insertReplacementText without a selection");
                return Cow::Borrowed(state);
            }
            commit(state, state.set_text(text))
        }
    }
}

/// Turn a text write into the reducer result.
///
/// Stale paths are expected and degrade to a no-op. A write aimed at an
/// element means the caller built a bad selection.
fn commit(state: &EditorState, next: Result<EditorState, ModelError>) -> Cow<'_, EditorState> {
    match next {
        Ok(next) => Cow::Owned(next),
        Err(err @ ModelError::NotText(_)) => {
            tracing::error!(%err, "text write addressed an element");
            if cfg!(debug_assertions) {
                panic!("{err}");
            }
            Cow::Borrowed(state)
        }
        Err(err) => {
            tracing::warn!(%err, "text write skipped");
            Cow::Borrowed(state)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
