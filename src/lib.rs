// SPDX-License-Identifier: MIT
//
// caret: a contentEditable rich-text editor core.
//
// The document lives in the host as an immutable `EditorState` (see
// `caret-model`); the editable surface is reached through the `NativeDom`
// trait (see `caret-dom`). This crate keeps the two in step:
//
//   registry    → two-way index between DOM nodes and document paths
//   bridge      → native selection ↔ model selection, direction-preserving
//   interceptor → classifies `beforeinput`, defers reads past the browser's edit
//   render      → host render functions, path refs, differential commit
//   editor      → the controller: event pump, dispatch, commit phase
//   config      → `EditorOptions`, applied to the container on mount
//
// Nothing here owns the state. The editor proposes the next state through
// `Host::on_change` and renders whatever the host hands back.

pub mod bridge;
pub mod config;
pub mod editor;
pub mod error;
pub mod interceptor;
pub mod registry;
pub mod render;

pub use caret_dom as dom;
pub use caret_model as model;

pub use config::EditorOptions;
pub use editor::{CommitEffects, Editor, Host, StateHost};
pub use error::EditorError;
pub use registry::{PathRefOp, Registry};
pub use render::{Children, DefaultRender, PathRef, Render, RenderStats, Renderable};
