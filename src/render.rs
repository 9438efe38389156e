// SPDX-License-Identifier: MIT
//
// Render layer: model tree → native DOM, with path refs.
//
// The host decides what each element looks like through a `Render`
// function: `(element, children, path_ref) -> Renderable`. A renderable is
// a small tree of DOM elements with exactly one slot where the element's
// rendered children go. Text runs are not host-rendered: a non-empty run
// becomes a DOM text node and an empty run becomes the `<br>` placeholder.
//
// The path ref is the registry's only write path. Attaching it to a
// renderable node means "this DOM node renders the element at this path";
// the reconciler then issues `Add` when the pair appears and `Remove` when
// it goes away. A render function that drops its path ref leaves the
// element unregistered, which the registry's debug check reports.
//
// Reconciliation is keyed by model node identity:
//
//   1. The root element is reference-equal to the last rendered one: skip
//      the pass entirely.
//   2. Every model node looks up what it mounted last time by `NodeId`.
//      Same kind and same tag: reuse the DOM node, patch text data and
//      attributes only where they differ.
//   3. A child list is replaced only when it differs from the DOM's.
//   4. Registry pairs are diffed: `Remove` for pairs that disappeared,
//      `Add` for pairs that are new. Unchanged pairs are not touched.
//
// The root element is represented by the container the editor mounts on,
// registered at the root path. Its children are placed directly into the
// container and its own render function is never called.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::rc::Rc;

use caret_dom::{DomError, DomNodeId, NativeDom};
use caret_model::{Element, Node, NodeId, Path};

use crate::registry::{PathRefOp, Registry};

// ─── Render function ─────────────────────────────────────────────────────────

/// Where an element's rendered children go. Consumed by
/// [`Renderable::slot`], so children are placed at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct Children {
    len: usize,
}

impl Children {
    const fn new(len: usize) -> Self {
        Self { len }
    }

    /// Number of model children.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The path-ref callback handed to a render function. Attach it with
/// [`Renderable::with_ref`] to the DOM node that represents the element.
#[derive(Debug, PartialEq, Eq)]
pub struct PathRef {
    path: Path,
}

impl PathRef {
    /// The path of the element being rendered.
    #[inline]
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }
}

/// One item in a renderable's child list.
#[derive(Debug, PartialEq, Eq)]
pub enum Part {
    /// The element's rendered children.
    Slot(Children),
    /// A nested DOM element.
    Element(Renderable),
}

/// A DOM element description produced by a render function.
#[derive(Debug, PartialEq, Eq)]
pub struct Renderable {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
    pub parts: Vec<Part>,
    pub path_ref: Option<PathRef>,
}

impl Renderable {
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            parts: Vec::new(),
            path_ref: None,
        }
    }

    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn attrs(mut self, attributes: impl IntoIterator<Item = (String, String)>) -> Self {
        self.attributes.extend(attributes);
        self
    }

    /// Place the element's children here.
    #[must_use]
    pub fn slot(mut self, children: Children) -> Self {
        self.parts.push(Part::Slot(children));
        self
    }

    /// Append a nested DOM element.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.parts.push(Part::Element(child));
        self
    }

    /// Mark this node as the one representing the element.
    #[must_use]
    pub fn with_ref(mut self, path_ref: PathRef) -> Self {
        self.path_ref = Some(path_ref);
        self
    }
}

/// A host render function.
pub trait Render {
    fn render(&self, element: &Element, children: Children, path_ref: PathRef) -> Renderable;
}

impl<F> Render for F
where
    F: Fn(&Element, Children, PathRef) -> Renderable,
{
    fn render(&self, element: &Element, children: Children, path_ref: PathRef) -> Renderable {
        self(element, children, path_ref)
    }
}

/// Tag → DOM tag, props → attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRender;

impl Render for DefaultRender {
    fn render(&self, element: &Element, children: Children, path_ref: PathRef) -> Renderable {
        Renderable::new(element.tag.as_str())
            .attrs(element.props.clone())
            .slot(children)
            .with_ref(path_ref)
    }
}

// ─── RenderStats ─────────────────────────────────────────────────────────────

/// What a render pass did to the DOM, for profiling and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderStats {
    /// The root was reference-equal to the last render.
    pub skipped: bool,
    /// DOM nodes created.
    pub nodes_created: usize,
    /// DOM nodes kept from the previous pass.
    pub nodes_reused: usize,
    /// Previously mounted nodes that were dropped.
    pub nodes_removed: usize,
    pub texts_patched: usize,
    pub attributes_patched: usize,
    /// Child lists rewritten.
    pub children_replaced: usize,
    pub refs_added: usize,
    pub refs_removed: usize,
}

impl RenderStats {
    /// DOM mutations issued.
    #[inline]
    #[must_use]
    pub const fn dom_writes(&self) -> usize {
        self.nodes_created + self.texts_patched + self.attributes_patched + self.children_replaced
    }
}

// ─── Reconciler ──────────────────────────────────────────────────────────────

/// A DOM element mounted from a renderable, with its nested elements.
#[derive(Debug)]
struct MountedPart {
    dom: DomNodeId,
    tag: String,
    attributes: BTreeMap<String, String>,
    nested: Vec<MountedPart>,
}

#[derive(Debug)]
enum Mounted {
    Text(DomNodeId),
    LineBreak(DomNodeId),
    Element(MountedPart),
}

/// Keeps the DOM in step with the model tree.
#[derive(Debug, Default)]
pub struct Reconciler {
    mounted: HashMap<NodeId, Mounted>,
    refs: HashMap<DomNodeId, Path>,
    last_root: Option<Rc<Element>>,
}

impl Reconciler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `root` into `container` and update `registry`.
    ///
    /// # Errors
    ///
    /// Propagates DOM failures. The pass stops at the first one and the
    /// next pass mounts every node afresh.
    pub fn render<D>(
        &mut self,
        dom: &mut D,
        container: DomNodeId,
        root: &Rc<Element>,
        renderer: &dyn Render,
        registry: &mut Registry,
    ) -> Result<RenderStats, DomError>
    where
        D: NativeDom + ?Sized,
    {
        if self.last_root.as_ref().is_some_and(|last| Rc::ptr_eq(last, root)) {
            return Ok(RenderStats {
                skipped: true,
                ..RenderStats::default()
            });
        }

        let mut pass = Pass {
            dom,
            renderer,
            previous: std::mem::take(&mut self.mounted),
            next: HashMap::new(),
            refs: HashMap::new(),
            stats: RenderStats::default(),
        };
        pass.refs.insert(container, Path::root());
        let children = pass.mount_children(root, &Path::root())?;
        pass.set_children(container, &children)?;

        let Pass {
            previous,
            next,
            refs,
            mut stats,
            ..
        } = pass;
        stats.nodes_removed += previous.len();

        for (&node, path) in &self.refs {
            if refs.get(&node) != Some(path) {
                registry.apply(PathRefOp::Remove, node, path);
                stats.refs_removed += 1;
            }
        }
        for (&node, path) in &refs {
            if self.refs.get(&node) != Some(path) {
                registry.apply(PathRefOp::Add, node, path);
                stats.refs_added += 1;
            }
        }

        self.mounted = next;
        self.refs = refs;
        self.last_root = Some(Rc::clone(root));
        tracing::trace!(?stats, "render pass");
        Ok(stats)
    }

    /// Remove every path ref and detach the rendered tree.
    ///
    /// # Errors
    ///
    /// Propagates a failure to clear `container`.
    pub fn unmount<D>(&mut self, dom: &mut D, container: DomNodeId, registry: &mut Registry) -> Result<(), DomError>
    where
        D: NativeDom + ?Sized,
    {
        for (node, path) in self.refs.drain() {
            registry.apply(PathRefOp::Remove, node, &path);
        }
        self.mounted.clear();
        self.last_root = None;
        dom.replace_children(container, &[])
    }

    /// Forget the last rendered root so the next pass walks the tree.
    pub fn invalidate(&mut self) {
        self.last_root = None;
    }
}

/// State of one render pass.
struct Pass<'a, D: ?Sized> {
    dom: &'a mut D,
    renderer: &'a dyn Render,
    previous: HashMap<NodeId, Mounted>,
    next: HashMap<NodeId, Mounted>,
    refs: HashMap<DomNodeId, Path>,
    stats: RenderStats,
}

impl<D> Pass<'_, D>
where
    D: NativeDom + ?Sized,
{
    fn mount_children(&mut self, element: &Element, path: &Path) -> Result<Vec<DomNodeId>, DomError> {
        element
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| self.mount_node(child, &path.append_offset(i)))
            .collect()
    }

    fn mount_node(&mut self, node: &Node, path: &Path) -> Result<DomNodeId, DomError> {
        let previous = self.previous.remove(&node.id());
        let (dom, mounted) = match node {
            Node::Text(text) if text.is_empty() => {
                let dom = match previous {
                    Some(Mounted::LineBreak(dom)) => self.reuse(dom),
                    other => self.create(other, |dom| dom.create_element("br")),
                };
                (dom, Mounted::LineBreak(dom))
            }
            Node::Text(text) => {
                let dom = match previous {
                    Some(Mounted::Text(dom)) => {
                        // The browser has often written this text already.
                        if self.dom.text_content(dom).as_deref() != Some(text.text.as_str()) {
                            self.dom.set_text_data(dom, &text.text)?;
                            self.stats.texts_patched += 1;
                        }
                        self.reuse(dom)
                    }
                    other => self.create(other, |dom| dom.create_text(&text.text)),
                };
                (dom, Mounted::Text(dom))
            }
            Node::Element(element) => {
                let mut slot = Some(self.mount_children(element, path)?);
                let renderable = self.renderer.render(
                    element,
                    Children::new(element.children.len()),
                    PathRef { path: path.clone() },
                );
                let previous = match previous {
                    Some(Mounted::Element(part)) => Some(part),
                    other => {
                        self.stats.nodes_removed += usize::from(other.is_some());
                        None
                    }
                };
                let part = self.mount_part(renderable, previous, &mut slot)?;
                if slot.is_some_and(|children| !children.is_empty()) {
                    tracing::warn!(%path, tag = %element.tag, "render function has no slot for the children");
                }
                (part.dom, Mounted::Element(part))
            }
        };

        if node.is_text() {
            self.refs.insert(dom, path.clone());
        }
        self.next.insert(node.id(), mounted);
        Ok(dom)
    }

    fn mount_part(
        &mut self,
        renderable: Renderable,
        previous: Option<MountedPart>,
        slot: &mut Option<Vec<DomNodeId>>,
    ) -> Result<MountedPart, DomError> {
        let Renderable {
            tag,
            attributes,
            parts,
            path_ref,
        } = renderable;

        let (dom, mut nested_before, patch) = match previous {
            Some(part) if part.tag == tag => {
                let dom = self.reuse(part.dom);
                let changed = part.attributes != attributes;
                self.stats.attributes_patched += usize::from(changed);
                (dom, VecDeque::from(part.nested), changed)
            }
            other => {
                self.stats.nodes_removed += usize::from(other.is_some());
                self.stats.nodes_created += 1;
                let dom = self.dom.create_element(&tag);
                (dom, VecDeque::new(), !attributes.is_empty())
            }
        };
        if patch {
            self.dom.set_attributes(dom, &attributes)?;
        }
        if let Some(path_ref) = path_ref {
            self.refs.insert(dom, path_ref.path);
        }

        let mut children = Vec::new();
        let mut nested = Vec::new();
        for part in parts {
            match part {
                Part::Slot(_) => match slot.take() {
                    Some(slotted) => children.extend(slotted),
                    None => tracing::warn!(%tag, "children slotted twice"),
                },
                Part::Element(child) => {
                    let child = self.mount_part(child, nested_before.pop_front(), slot)?;
                    children.push(child.dom);
                    nested.push(child);
                }
            }
        }
        self.stats.nodes_removed += nested_before.len();
        self.set_children(dom, &children)?;

        Ok(MountedPart {
            dom,
            tag,
            attributes,
            nested,
        })
    }

    fn set_children(&mut self, parent: DomNodeId, children: &[DomNodeId]) -> Result<(), DomError> {
        if self.dom.children(parent) != children {
            tracing::trace!(?parent, count = children.len(), "replacing children");
            self.dom.replace_children(parent, children)?;
            self.stats.children_replaced += 1;
        }
        Ok(())
    }

    fn reuse(&mut self, dom: DomNodeId) -> DomNodeId {
        self.stats.nodes_reused += 1;
        dom
    }

    fn create(&mut self, replaced: Option<Mounted>, create: impl FnOnce(&mut D) -> DomNodeId) -> DomNodeId {
        self.stats.nodes_removed += usize::from(replaced.is_some());
        self.stats.nodes_created += 1;
        create(&mut *self.dom)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
