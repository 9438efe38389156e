// SPDX-License-Identifier: MIT
//
// Native events the editor listens to.

use crate::input::InputEvent;
use crate::node::DomNodeId;

/// An event delivered by the native surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeEvent {
    /// `beforeinput` on the editable host.
    BeforeInput(InputEvent),
    /// `selectionchange` on the document. Fires for user-driven changes and
    /// as a side effect of the browser's own edits. Carries no payload; the
    /// current selection is read from the surface.
    SelectionChange,
    /// `focus` on the given element.
    Focus(DomNodeId),
    /// `blur` on the given element. When the whole window lost focus, the
    /// element is still the active element while this is handled.
    Blur(DomNodeId),
}

impl NativeEvent {
    /// The DOM event name, for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BeforeInput(_) => "beforeinput",
            Self::SelectionChange => "selectionchange",
            Self::Focus(_) => "focus",
            Self::Blur(_) => "blur",
        }
    }
}
