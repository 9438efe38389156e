// SPDX-License-Identifier: MIT
//
// Editor errors.
//
// Only failures a host can act on are errors. Stale paths, unregistered
// nodes and unhandled input types are expected while the browser and the
// model disagree for a moment; those degrade to no-ops with a `tracing`
// diagnostic instead.

use caret_dom::{DomError, DomNodeId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    /// An operation that needs the rendered tree ran before `mount` or
    /// after `unmount`.
    #[error("editor is not mounted")]
    NotMounted,

    /// The container node passed to `mount` does not exist.
    #[error("container {0:?} is not in the document")]
    ContainerMissing(DomNodeId),

    #[error(transparent)]
    Dom(#[from] DomError),
}
