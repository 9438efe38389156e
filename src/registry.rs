// SPDX-License-Identifier: MIT
//
// Node-path registry.
//
// A two-way index between live DOM nodes and document paths. The render
// layer is its only writer: every mounted document node reports itself
// through its path ref with `Add` on mount and `Remove` on unmount. The
// selection bridge is its only reader.
//
// Both directions are hash lookups. Writes are idempotent per
// (node, path) pair, and a `Remove` only drops entries that still describe
// that exact pair, so a stale unmount cannot erase a newer mount that
// reused the path.
//
// After every render the registry holds exactly one entry per document
// node. `check` verifies that in debug builds; the usual culprit is a
// custom render function that never attaches the path ref it was given.

use std::collections::HashMap;

use caret_dom::DomNodeId;
use caret_model::{Element, Path, count_nodes};

/// The path-ref callback vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathRefOp {
    Add,
    Remove,
}

/// Bidirectional DOM node ↔ path index.
#[derive(Debug, Default)]
pub struct Registry {
    node_paths: HashMap<DomNodeId, Path>,
    path_nodes: HashMap<Path, DomNodeId>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Dispatch a path-ref callback.
    pub fn apply(&mut self, op: PathRefOp, node: DomNodeId, path: &Path) {
        match op {
            PathRefOp::Add => self.register(node, path),
            PathRefOp::Remove => self.unregister(node, path),
        }
    }

    /// Record that `node` renders the document node at `path`.
    pub fn register(&mut self, node: DomNodeId, path: &Path) {
        if self.node_paths.get(&node) == Some(path) && self.path_nodes.get(path) == Some(&node) {
            return;
        }
        if let Some(old_path) = self.node_paths.remove(&node) {
            if self.path_nodes.get(&old_path) == Some(&node) {
                self.path_nodes.remove(&old_path);
            }
        }
        if let Some(old_node) = self.path_nodes.insert(path.clone(), node) {
            if old_node != node && self.node_paths.get(&old_node) == Some(path) {
                self.node_paths.remove(&old_node);
            }
        }
        self.node_paths.insert(node, path.clone());
    }

    /// Forget the (node, path) pair. Entries that have since been re-bound
    /// are left alone.
    pub fn unregister(&mut self, node: DomNodeId, path: &Path) {
        if self.node_paths.get(&node) == Some(path) {
            self.node_paths.remove(&node);
        }
        if self.path_nodes.get(path) == Some(&node) {
            self.path_nodes.remove(path);
        }
    }

    /// The path rendered by `node`.
    #[must_use]
    pub fn path(&self, node: DomNodeId) -> Option<&Path> {
        self.node_paths.get(&node)
    }

    /// The DOM node rendering `path`.
    #[must_use]
    pub fn node(&self, path: &Path) -> Option<DomNodeId> {
        self.path_nodes.get(path).copied()
    }

    /// Number of registered nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.node_paths.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node_paths.is_empty()
    }

    /// Every (node, path) pair, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = (DomNodeId, &Path)> {
        self.node_paths.iter().map(|(&node, path)| (node, path))
    }

    /// Debug builds: panic unless every node of `root` has exactly one
    /// entry. Release builds skip the count.
    pub fn check(&self, root: &Element) {
        if !cfg!(debug_assertions) {
            return;
        }
        let expected = count_nodes(root);
        if expected != self.len() || self.path_nodes.len() != self.len() {
            tracing::error!(expected, registered = self.len(), "path registry out of sync with the document");
            panic!(
                "It looks like the path ref in the custom render function is not used. \
                 Expected {expected} registered nodes, found {}.",
                self.len()
            );
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
