//! Append-only answer/move history with a movable cursor.
//!
//! Two navigation modes share one list and must not be mixed up:
//! - linear undo pops the newest entry;
//! - replay walks the cursor over existing entries without touching them.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct History<E> {
    entries: Vec<E>,
    /// Entry currently pointed at; `None` when empty.
    cursor: Option<usize>,
}

impl<E> Default for History<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
        }
    }
}

impl<E> History<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append and move the cursor onto the new entry.
    pub fn push(&mut self, entry: E) {
        self.entries.push(entry);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Remove the newest entry; the cursor follows back to the new end.
    pub fn pop(&mut self) -> Option<E> {
        let entry = self.entries.pop();
        self.cursor = self.entries.len().checked_sub(1);
        entry
    }

    pub fn last(&self) -> Option<&E> {
        self.entries.last()
    }

    pub fn get(&self, index: usize) -> Option<&E> {
        self.entries.get(index)
    }

    pub fn entries(&self) -> &[E] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Entry under the cursor.
    pub fn current(&self) -> Option<&E> {
        self.cursor.and_then(|i| self.entries.get(i))
    }

    /// Place the cursor on an existing entry; out-of-range positions are ignored.
    pub fn seek(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.cursor = Some(index);
            true
        } else {
            false
        }
    }

    pub fn seek_end(&mut self) {
        self.cursor = self.entries.len().checked_sub(1);
    }

    pub fn at_end(&self) -> bool {
        self.cursor == self.entries.len().checked_sub(1)
    }

    /// Position of the newest entry matching `predicate`.
    pub fn rposition<P>(&self, predicate: P) -> Option<usize>
    where
        P: FnMut(&E) -> bool,
    {
        self.entries.iter().rposition(predicate)
    }

    /// Newest entry matching `predicate`.
    pub fn find_last<P>(&self, mut predicate: P) -> Option<&E>
    where
        P: FnMut(&E) -> bool,
    {
        self.entries.iter().rev().find(|entry| predicate(*entry))
    }
}
