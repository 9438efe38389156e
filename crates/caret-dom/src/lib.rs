// SPDX-License-Identifier: MIT
//
// caret-dom: the native editable surface for caret.
//
// The editor core never talks to a browser directly. It talks to the
// `NativeDom` trait: tree queries, a few mutations, the Selection API, and
// focus. This crate defines that seam, the event vocabulary that crosses
// it (`beforeinput` with its input types, `selectionchange`, focus/blur),
// the "after typing" queue that orders work around the browser's own
// writes, and `Document`, an in-memory implementation that simulates the
// browser's default actions so the whole engine runs headless.

pub mod document;
pub mod dom;
pub mod error;
pub mod event;
pub mod input;
pub mod node;
pub mod range;
pub mod typing;

pub use document::Document;
pub use dom::NativeDom;
pub use error::DomError;
pub use event::NativeEvent;
pub use input::{InputEvent, InputType};
pub use node::DomNodeId;
pub use range::{DomPoint, DomRange, DomSelection};
pub use typing::AfterTyping;
