// SPDX-License-Identifier: MIT
//
// Editor controller: ties the model, the registry and the native surface
// together.
//
// The editor is a controlled component. The host owns the `EditorState`
// and the DOM; the editor only proposes new states through
// `Host::on_change` and keeps the DOM in step with whatever state the host
// hands back. One turn of the loop:
//
//   native events → interceptor / selection bridge → Action
//     → reducer → Host::on_change → commit → DOM + native selection
//
// `commit` is the synchronous render phase and runs its steps in a fixed
// order:
//
//   1. Normalize the host state.
//   2. Reconcile the DOM; the registry now describes the new tree.
//   3. Debug builds: check the registry covers every node.
//   4. Map `has_focus` onto DOM focus. Blur is skipped while
//      `tab_lost_focus` is set so an OS tab switch gives focus back.
//   5. Focused: write the model selection to the native selection, only if
//      they differ.
//
// Writing the selection fires `selectionchange`, which the next pump reads
// back as a no-op because the native selection now matches the model.
// `run` repeats pump + commit until the surface goes quiet, bounded by
// `EditorOptions::max_sync_rounds`.
//
// Typing: an allowed `beforeinput` opens the typing window, the surface
// applies its default action, and every `selectionchange` the edit fires is
// dropped until the deferred tasks have read the settled text.

use std::borrow::Cow;
use std::collections::VecDeque;

use bitflags::bitflags;

use caret_dom::{AfterTyping, DomNodeId, DomSelection, InputEvent, NativeDom, NativeEvent};
use caret_model::{Action, EditorState, Reducer, Selection, SelectionInfo, is_normalized, reduce};

use crate::bridge::{dom_selection_to_model, model_selection_to_dom, sync_selection};
use crate::config::EditorOptions;
use crate::error::EditorError;
use crate::interceptor::{self, Deferred, Verdict};
use crate::registry::Registry;
use crate::render::{DefaultRender, Reconciler, Render, RenderStats};

// ─── Host ────────────────────────────────────────────────────────────────────

/// The owner of the editor state.
pub trait Host {
    /// The current state.
    fn state(&self) -> &EditorState;

    /// The editor proposes `next`. The host decides what to commit; the
    /// editor renders whatever [`state`](Host::state) returns afterwards.
    fn on_change(&mut self, next: EditorState);
}

/// A host that accepts every change.
#[derive(Debug, Clone)]
pub struct StateHost {
    state: EditorState,
    changes: usize,
}

impl StateHost {
    #[must_use]
    pub const fn new(state: EditorState) -> Self {
        Self { state, changes: 0 }
    }

    /// Changes accepted so far.
    #[inline]
    #[must_use]
    pub const fn changes(&self) -> usize {
        self.changes
    }

    #[must_use]
    pub fn into_state(self) -> EditorState {
        self.state
    }
}

impl Host for StateHost {
    fn state(&self) -> &EditorState {
        &self.state
    }

    fn on_change(&mut self, next: EditorState) {
        self.changes += 1;
        self.state = next;
    }
}

// ─── CommitEffects ───────────────────────────────────────────────────────────

bitflags! {
    /// What a commit did.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct CommitEffects: u8 {
        /// First render after `mount`.
        const MOUNTED          = 0b0000_0001;
        /// The DOM was written.
        const PATCHED          = 0b0000_0010;
        /// Path refs were added or removed.
        const REFS             = 0b0000_0100;
        /// The native selection was rewritten.
        const SELECTION_SYNCED = 0b0000_1000;
        const FOCUSED          = 0b0001_0000;
        const BLURRED          = 0b0010_0000;
    }
}

// ─── Editor ──────────────────────────────────────────────────────────────────

/// The editor controller.
pub struct Editor {
    options: EditorOptions,
    reducer: Reducer,
    renderer: Box<dyn Render>,
    registry: Registry,
    reconciler: Reconciler,
    typing: AfterTyping<Deferred>,
    inbox: VecDeque<NativeEvent>,
    container: Option<DomNodeId>,
    fresh: bool,
    last_stats: RenderStats,
}

impl Editor {
    /// An unmounted editor with the default renderer and reducer.
    #[must_use]
    pub fn new(options: EditorOptions) -> Self {
        Self {
            options,
            reducer: reduce,
            renderer: Box::new(DefaultRender),
            registry: Registry::new(),
            reconciler: Reconciler::new(),
            typing: AfterTyping::new(),
            inbox: VecDeque::new(),
            container: None,
            fresh: false,
            last_stats: RenderStats::default(),
        }
    }

    /// Use a custom render function.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl Render + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self.reconciler.invalidate();
        self
    }

    /// Use a custom reducer, typically one that wraps [`reduce`].
    #[must_use]
    pub fn with_reducer(mut self, reducer: Reducer) -> Self {
        self.reducer = reducer;
        self
    }

    #[inline]
    #[must_use]
    pub const fn options(&self) -> &EditorOptions {
        &self.options
    }

    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The container the editor is mounted on.
    #[inline]
    #[must_use]
    pub const fn container(&self) -> Option<DomNodeId> {
        self.container
    }

    /// Stats of the most recent render pass.
    #[inline]
    #[must_use]
    pub const fn last_stats(&self) -> RenderStats {
        self.last_stats
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Make `container` editable and render the host state into it.
    ///
    /// # Errors
    ///
    /// [`EditorError::ContainerMissing`] if `container` does not exist,
    /// otherwise any DOM failure of the first commit.
    pub fn mount<D, H>(&mut self, dom: &mut D, container: DomNodeId, host: &H) -> Result<CommitEffects, EditorError>
    where
        D: NativeDom + ?Sized,
        H: Host + ?Sized,
    {
        if dom.node_name(container).is_none() {
            return Err(EditorError::ContainerMissing(container));
        }
        dom.set_attributes(container, &self.options.attributes())?;
        self.container = Some(container);
        self.fresh = true;
        tracing::debug!(?container, "editor mounted");
        self.commit(dom, host.state())
    }

    /// Tear down: remove every path ref, drop queued events and deferred
    /// tasks, and detach the rendered tree.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotMounted`] when there is nothing to tear down.
    pub fn unmount<D>(&mut self, dom: &mut D) -> Result<(), EditorError>
    where
        D: NativeDom + ?Sized,
    {
        let container = self.container.take().ok_or(EditorError::NotMounted)?;
        self.inbox.clear();
        self.typing.clear();
        self.reconciler.unmount(dom, container, &mut self.registry)?;
        tracing::debug!(?container, "editor unmounted");
        Ok(())
    }

    // ── Commit ──────────────────────────────────────────────────

    /// Bring the DOM, the focus and the native selection in line with
    /// `state`.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotMounted`] before `mount`, otherwise DOM failures.
    ///
    /// # Panics
    ///
    /// Debug builds panic when the render function did not attach a path
    /// ref for every element.
    pub fn commit<D>(&mut self, dom: &mut D, state: &EditorState) -> Result<CommitEffects, EditorError>
    where
        D: NativeDom + ?Sized,
    {
        let container = self.container.ok_or(EditorError::NotMounted)?;
        let state = state.normalized();
        debug_assert!(is_normalized(&state.element));
        let mut effects = CommitEffects::empty();
        if std::mem::take(&mut self.fresh) {
            effects |= CommitEffects::MOUNTED;
        }

        let stats = self
            .reconciler
            .render(dom, container, &state.element, self.renderer.as_ref(), &mut self.registry)?;
        if !stats.skipped {
            self.registry.check(&state.element);
            self.last_stats = stats;
        }
        effects.set(CommitEffects::PATCHED, stats.dom_writes() > 0);
        effects.set(CommitEffects::REFS, stats.refs_added + stats.refs_removed > 0);

        let active = dom.active_element() == Some(container);
        if state.has_focus && !active {
            dom.focus(container)?;
            effects |= CommitEffects::FOCUSED;
        } else if !state.has_focus && active && !state.tab_lost_focus {
            dom.blur(container);
            effects |= CommitEffects::BLURRED;
        }

        if state.has_focus {
            if let Some(selection) = &state.selection {
                if sync_selection(dom, &self.registry, container, selection)? {
                    effects |= CommitEffects::SELECTION_SYNCED;
                }
            }
        }
        Ok(effects)
    }

    // ── Events ──────────────────────────────────────────────────

    /// Queue an event delivered by the host, for example a `beforeinput`.
    pub fn enqueue(&mut self, event: NativeEvent) {
        self.inbox.push_back(event);
    }

    /// Handle queued and pending surface events, committing after each,
    /// until the surface goes quiet.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotMounted`] before `mount`, otherwise DOM failures.
    pub fn run<D, H>(&mut self, dom: &mut D, host: &mut H) -> Result<CommitEffects, EditorError>
    where
        D: NativeDom + ?Sized,
        H: Host + ?Sized,
    {
        if self.container.is_none() {
            return Err(EditorError::NotMounted);
        }
        let mut effects = CommitEffects::empty();
        for _ in 0..self.options.max_sync_rounds {
            self.inbox.extend(dom.drain_events());
            if self.inbox.is_empty() {
                return Ok(effects);
            }
            while let Some(event) = self.inbox.pop_front() {
                self.handle_event(dom, host, event)?;
                effects |= self.commit(dom, host.state())?;
            }
        }
        tracing::warn!(
            rounds = self.options.max_sync_rounds,
            pending = self.inbox.len(),
            "editor did not settle"
        );
        Ok(effects)
    }

    /// Handle one native event without committing.
    ///
    /// # Errors
    ///
    /// DOM failures while applying or reading an edit.
    pub fn handle_event<D, H>(&mut self, dom: &mut D, host: &mut H, event: NativeEvent) -> Result<(), EditorError>
    where
        D: NativeDom + ?Sized,
        H: Host + ?Sized,
    {
        let Some(container) = self.container else {
            tracing::trace!(event = event.name(), "event while unmounted");
            return Ok(());
        };
        match event {
            NativeEvent::BeforeInput(input) => self.before_input(dom, host, &input)?,
            NativeEvent::SelectionChange => {
                if self.typing.is_typing() {
                    tracing::trace!("selectionchange while typing, dropped");
                } else {
                    self.selection_change(dom, host);
                }
            }
            NativeEvent::Focus(node) if node == container => {
                self.dispatch(host, &Action::Focus);
                if host.state().selection.is_none() {
                    self.selection_change(dom, host);
                }
            }
            NativeEvent::Blur(node) if node == container => {
                // Still active after a blur: the window lost focus, not the editor.
                let tab_lost_focus = dom.active_element() == Some(container);
                self.dispatch(host, &Action::Blur { tab_lost_focus });
            }
            NativeEvent::Focus(_) | NativeEvent::Blur(_) => {}
        }
        Ok(())
    }

    fn before_input<D, H>(&mut self, dom: &mut D, host: &mut H, input: &InputEvent) -> Result<(), EditorError>
    where
        D: NativeDom + ?Sized,
        H: Host + ?Sized,
    {
        match interceptor::before_input(dom, &self.registry, input) {
            Verdict::Prevent(action) => {
                if let Some(action) = action {
                    self.dispatch(host, &action);
                }
            }
            Verdict::Allow(task) => {
                self.typing.begin();
                self.typing.defer(task);
                dom.apply_default_input(input)?;
                for event in dom.drain_events() {
                    self.handle_event(dom, host, event)?;
                }
                for task in self.typing.drain() {
                    match interceptor::settle(dom, task) {
                        Some(action) => {
                            self.dispatch(host, &action);
                        }
                        None => tracing::warn!(input_type = %input.input_type, "edit could not be read back"),
                    }
                }
            }
        }
        Ok(())
    }

    fn selection_change<D, H>(&self, dom: &D, host: &mut H)
    where
        D: NativeDom + ?Sized,
        H: Host + ?Sized,
    {
        let Some(native) = dom.selection() else {
            return;
        };
        let Some(selection) = dom_selection_to_model(&native, &self.registry) else {
            tracing::trace!(?native, "selection outside the editor");
            return;
        };
        let current = host.state().selection.as_ref();
        if current == Some(&selection) || current.is_some_and(|current| self.shows(dom, current, native)) {
            return;
        }
        self.dispatch(host, &Action::SelectionChange { selection });
    }

    /// Whether `native` already shows the model selection `current`.
    fn shows<D>(&self, dom: &D, current: &Selection, native: DomSelection) -> bool
    where
        D: NativeDom + ?Sized,
    {
        self.container
            .and_then(|container| model_selection_to_dom(dom, &self.registry, container, current))
            == Some(native)
    }

    /// Reduce `action` against the normalized host state and propose the
    /// result. Returns whether the host was called.
    pub fn dispatch<H>(&self, host: &mut H, action: &Action) -> bool
    where
        H: Host + ?Sized,
    {
        tracing::debug!(target: "caret::action", action = action.name(), ?action);
        let next = {
            let state = host.state().normalized();
            match (self.reducer)(&state, action) {
                Cow::Owned(next) => Some(next),
                Cow::Borrowed(_) => None,
            }
        };
        let changed = next.is_some();
        if let Some(next) = next {
            host.on_change(next);
        }
        changed
    }

    // ── Queries ─────────────────────────────────────────────────

    /// Move DOM focus to the editor.
    ///
    /// # Errors
    ///
    /// [`EditorError::NotMounted`] before `mount`.
    pub fn focus<D>(&self, dom: &mut D) -> Result<(), EditorError>
    where
        D: NativeDom + ?Sized,
    {
        let container = self.container.ok_or(EditorError::NotMounted)?;
        dom.focus(container)?;
        Ok(())
    }

    /// Translate a native selection obtained outside the event pipeline
    /// into model terms. `None` if either end is outside the editor.
    #[must_use]
    pub fn create_selection_info(&self, native: &DomSelection, state: &EditorState) -> Option<SelectionInfo> {
        let selection = dom_selection_to_model(native, &self.registry)?;
        Some(SelectionInfo::new(&state.element, &selection))
    }

    /// [`create_selection_info`](Self::create_selection_info) for the live
    /// native selection.
    #[must_use]
    pub fn selection_info<D>(&self, dom: &D, state: &EditorState) -> Option<SelectionInfo>
    where
        D: NativeDom + ?Sized,
    {
        self.create_selection_info(&dom.selection()?, state)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorOptions::default())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("options", &self.options)
            .field("container", &self.container)
            .field("registered", &self.registry.len())
            .field("typing", &self.typing.is_typing())
            .field("inbox", &self.inbox.len())
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
