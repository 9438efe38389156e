// SPDX-License-Identifier: MIT
//
// `beforeinput` events.
//
// Browsers announce every edit of an editable host with a `beforeinput`
// event before touching the DOM. The event names the kind of edit in its
// `inputType` string, carries the inserted text (if any), and lists the
// static ranges the edit will replace. Handlers may prevent the default
// action; if they do not, the browser mutates the DOM right after the
// event returns.
//
// Only the input types the editor reacts to get their own variant. The
// full list is long (formatting commands, history, drag and drop) and
// grows with browser releases, so everything else is kept verbatim in
// `InputType::Other`.

use std::fmt;

use crate::range::DomRange;

// ─── InputType ───────────────────────────────────────────────────────────────

/// The `inputType` of a `beforeinput` event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InputType {
    /// Typed characters.
    InsertText,
    /// Spellcheck or autocorrect substitution of existing text.
    InsertReplacementText,
    /// Backspace.
    DeleteContentBackward,
    /// Delete.
    DeleteContentForward,
    /// Enter.
    InsertParagraph,
    /// Shift+Enter.
    InsertLineBreak,
    InsertFromPaste,
    InsertFromDrop,
    /// IME composition in progress.
    InsertCompositionText,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteByCut,
    HistoryUndo,
    HistoryRedo,
    /// Anything else, verbatim.
    Other(String),
}

impl InputType {
    /// Classify an `inputType` string.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name {
            "insertText" => Self::InsertText,
            "insertReplacementText" => Self::InsertReplacementText,
            "deleteContentBackward" => Self::DeleteContentBackward,
            "deleteContentForward" => Self::DeleteContentForward,
            "insertParagraph" => Self::InsertParagraph,
            "insertLineBreak" => Self::InsertLineBreak,
            "insertFromPaste" => Self::InsertFromPaste,
            "insertFromDrop" => Self::InsertFromDrop,
            "insertCompositionText" => Self::InsertCompositionText,
            "deleteWordBackward" => Self::DeleteWordBackward,
            "deleteWordForward" => Self::DeleteWordForward,
            "deleteByCut" => Self::DeleteByCut,
            "historyUndo" => Self::HistoryUndo,
            "historyRedo" => Self::HistoryRedo,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The `inputType` string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::InsertText => "insertText",
            Self::InsertReplacementText => "insertReplacementText",
            Self::DeleteContentBackward => "deleteContentBackward",
            Self::DeleteContentForward => "deleteContentForward",
            Self::InsertParagraph => "insertParagraph",
            Self::InsertLineBreak => "insertLineBreak",
            Self::InsertFromPaste => "insertFromPaste",
            Self::InsertFromDrop => "insertFromDrop",
            Self::InsertCompositionText => "insertCompositionText",
            Self::DeleteWordBackward => "deleteWordBackward",
            Self::DeleteWordForward => "deleteWordForward",
            Self::DeleteByCut => "deleteByCut",
            Self::HistoryUndo => "historyUndo",
            Self::HistoryRedo => "historyRedo",
            Self::Other(name) => name,
        }
    }

    /// True for the single-step deletes (Backspace and Delete).
    #[must_use]
    pub const fn is_content_delete(&self) -> bool {
        matches!(self, Self::DeleteContentBackward | Self::DeleteContentForward)
    }
}

impl From<&str> for InputType {
    fn from(name: &str) -> Self {
        Self::parse(name)
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── InputEvent ──────────────────────────────────────────────────────────────

/// A `beforeinput` event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    pub input_type: InputType,
    /// Inserted text for insert types; `None` for deletes.
    pub data: Option<String>,
    /// The ranges the edit will replace (`getTargetRanges()`), start before
    /// end. Usually one.
    pub target_ranges: Vec<DomRange>,
    /// Part of an IME composition session.
    pub is_composing: bool,
}

impl InputEvent {
    #[must_use]
    pub fn new(input_type: impl Into<InputType>) -> Self {
        Self {
            input_type: input_type.into(),
            data: None,
            target_ranges: Vec::new(),
            is_composing: false,
        }
    }

    /// Builder: set `data`.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<String>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Builder: add a target range.
    #[must_use]
    pub fn with_target_range(mut self, range: DomRange) -> Self {
        self.target_ranges.push(range);
        self
    }

    /// `data` or the empty string.
    #[must_use]
    pub fn data(&self) -> &str {
        self.data.as_deref().unwrap_or_default()
    }

    /// The first target range.
    #[must_use]
    pub fn target_range(&self) -> Option<&DomRange> {
        self.target_ranges.first()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
