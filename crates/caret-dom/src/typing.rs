// SPDX-License-Identifier: MIT
//
// "After typing": work deferred until the browser's own edit has landed.
//
// When a `beforeinput` event is not prevented, the browser writes to the
// DOM only after every handler has returned. A handler that wants the
// resulting text has to wait for that write. `AfterTyping` is the queue it
// waits in:
//
//   1. `begin()` when a native input event starts. Sets the typing flag.
//   2. `defer(task)` for every read that must see the settled DOM.
//   3. The browser (or the in-memory document) applies its default action.
//   4. `drain()` clears the flag and hands back the tasks in FIFO order.
//
// The typing flag also tells the `selectionchange` handler that the
// selection moved because of the edit, not because of the user. Those
// changes are dropped; the deferred task computes the selection itself.
//
// Tasks are plain values, not closures, so the queue can be inspected in
// tests and discarded on teardown without running anything.

use std::collections::VecDeque;

/// One-shot deferred task queue plus the "is typing" flag.
#[derive(Debug)]
pub struct AfterTyping<T> {
    typing: bool,
    queue: VecDeque<T>,
}

impl<T> AfterTyping<T> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            typing: false,
            queue: VecDeque::new(),
        }
    }

    /// A native input event started.
    pub fn begin(&mut self) {
        self.typing = true;
    }

    /// True between [`begin`](Self::begin) and [`drain`](Self::drain).
    #[inline]
    #[must_use]
    pub const fn is_typing(&self) -> bool {
        self.typing
    }

    /// Queue a task to run once the native edit has settled.
    pub fn defer(&mut self, task: T) {
        self.queue.push_back(task);
    }

    /// Number of queued tasks.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// End the typing window and take every queued task, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        self.typing = false;
        self.queue.drain(..).collect()
    }

    /// Discard queued tasks without running them.
    pub fn clear(&mut self) {
        self.typing = false;
        self.queue.clear();
    }
}

impl<T> Default for AfterTyping<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        let queue: AfterTyping<u8> = AfterTyping::new();
        assert!(!queue.is_typing());
        assert!(queue.is_empty());
    }

    #[test]
    fn begin_sets_flag_and_drain_clears_it() {
        let mut queue = AfterTyping::new();
        queue.begin();
        queue.defer(1);
        queue.defer(2);
        assert!(queue.is_typing());
        assert_eq!(queue.len(), 2);

        assert_eq!(queue.drain(), vec![1, 2]);
        assert!(!queue.is_typing());
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_is_one_shot() {
        let mut queue = AfterTyping::new();
        queue.begin();
        queue.defer("read");
        assert_eq!(queue.drain().len(), 1);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn clear_discards() {
        let mut queue = AfterTyping::new();
        queue.begin();
        queue.defer(());
        queue.clear();
        assert!(queue.is_empty());
        assert!(!queue.is_typing());
    }
}
