//! # caret-model: Document model for caret
//!
//! Pure data and algorithms, no DOM and no I/O:
//!
//! - **[`id`]**: `NodeId`, the stable identity of every node
//! - **[`element`]**: `Element`, `Text` and `Node`, with normalization
//! - **[`path`]**: `Path`, tree coordinates with an optional text offset
//! - **[`selection`]**: `Selection`, an anchor/focus pair with direction
//! - **[`tree`]**: path resolution and the get/set/modify lens
//! - **[`state`]**: `EditorState`, the host-owned value
//! - **[`reducer`]**: `Action` and `reduce`
//! - **[`info`]**: `SelectionInfo` for host-side queries

pub mod element;
pub mod error;
pub mod id;
pub mod info;
pub mod path;
pub mod reducer;
pub mod selection;
pub mod state;
pub mod tree;

pub use element::{Element, Node, Text, count_nodes, is_normalized, normalize, text_content};
pub use error::ModelError;
pub use id::NodeId;
pub use info::{PointInfo, SelectionInfo};
pub use path::Path;
pub use reducer::{Action, Reducer, reduce};
pub use selection::Selection;
pub use state::EditorState;
pub use tree::{Point, resolve_path};
