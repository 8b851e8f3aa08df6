//! Bounded undo/redo history of full state snapshots.

use std::collections::VecDeque;

use super::CompositionState;

/// Default maximum count of snapshots to retain, current one included.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Linear history with a cursor.
///
/// `entries[cursor]` is always the snapshot matching the live state after the
/// last historized commit, undo or redo.
#[derive(Debug)]
pub(crate) struct History {
    entries: VecDeque<CompositionState>,
    cursor: usize,
    limit: usize,
}

impl History {
    pub(crate) fn new(initial: CompositionState, limit: usize) -> Self {
        let mut entries = VecDeque::new();
        entries.push_back(initial);
        Self {
            entries,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Records `state`, discarding any redo branch and evicting the oldest
    /// entry once over the limit.
    pub(crate) fn push(&mut self, state: CompositionState) {
        self.entries.truncate(self.cursor + 1);
        self.entries.push_back(state);
        self.cursor = self.entries.len() - 1;
        if self.entries.len() > self.limit {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }

    pub(crate) fn undo(&mut self) -> Option<&CompositionState> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor)
    }

    pub(crate) fn redo(&mut self) -> Option<&CompositionState> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor)
    }

    pub(crate) fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub(crate) fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn cursor(&self) -> usize {
        self.cursor
    }
}
