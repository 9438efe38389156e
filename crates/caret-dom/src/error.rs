// SPDX-License-Identifier: MIT
//
// Errors raised by the native surface.

use thiserror::Error;

use crate::node::DomNodeId;

/// A DOM operation that could not be carried out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("unknown DOM node {0:?}")]
    UnknownNode(DomNodeId),

    #[error("DOM node {0:?} is not a text node")]
    NotText(DomNodeId),

    #[error("DOM node {child:?} is not a child of {parent:?}")]
    NotAChild { parent: DomNodeId, child: DomNodeId },

    #[error("offset {offset} is out of bounds for {node:?} (length {len})")]
    OffsetOutOfBounds { node: DomNodeId, offset: usize, len: usize },

    #[error("the document has no selection")]
    NoSelection,
}
