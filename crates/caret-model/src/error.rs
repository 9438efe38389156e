//! Model errors.

use thiserror::Error;

use crate::path::Path;

/// Why a tree operation could not be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// The path does not address an existing node. Stale paths are expected
    /// while the DOM and the model are being reconciled.
    #[error("path {0:?} does not resolve to a node")]
    NotFound(Path),

    /// A text-only operation was pointed at an element.
    #[error("path {0:?} addresses an element, not a text node")]
    NotText(Path),

    /// The root can only be replaced by another element.
    #[error("path {0:?} would replace the root with a non-element")]
    NotElement(Path),

    /// Range deletion across text runs is not supported.
    #[error("range {anchor:?}..{focus:?} crosses a text node boundary")]
    CrossesBoundary { anchor: Path, focus: Path },

    /// The operation writes at the selection, and there is none.
    #[error("state has no selection")]
    NoSelection,
}
