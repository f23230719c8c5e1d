// Copyright 2026 The Skein Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Per-buffer undo ring for the input editor (spec §3 "Undo ring", §4.C).
//!
//! Unlike the teacher's `ViewUndoStack` (which tracks undo *groups* of rope
//! edits with a shared `before`/`after` per group), the input editor here
//! undoes whole-line snapshots: each entry is the full input text plus
//! cursor position at the time `add()` was called. The capacity/VecDeque
//! shape is kept from the teacher; the group semantics are not needed
//! because a single-line input buffer has no concept of concurrent edits
//! to merge into one group.

use std::collections::VecDeque;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub text: String,
    pub cursor: usize,
}

/// A doubly-linked list of snapshots with a current pointer, a staging
/// slot, and a bounded capacity (spec §3 "Undo ring").
pub struct UndoRing {
    entries: VecDeque<Snapshot>,
    /// Index into `entries` of the snapshot currently "applied". `None`
    /// once the ring is empty (nothing has been committed yet).
    cursor: Option<usize>,
    capacity: usize,
    /// The `snap()`-staged pre-edit snapshot, consumed by the next `add()`.
    staged: Option<Snapshot>,
}

impl UndoRing {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), cursor: None, capacity, staged: None }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stage `current` as the pre-edit snapshot for a future `add()`. A
    /// no-op if undo is disabled (`capacity == 0`).
    pub fn snap(&mut self, current: &Snapshot) {
        if self.capacity == 0 {
            return;
        }
        self.staged = Some(current.clone());
    }

    /// Commit `after` as a new undo entry if it differs from the staged
    /// pre-edit snapshot. Drops the oldest entry if over capacity, and
    /// discards any redo-future beyond the current cursor (spec §4.C).
    pub fn add(&mut self, after: Snapshot) {
        if self.capacity == 0 {
            self.staged = None;
            return;
        }
        let before = self.staged.take();
        if before.as_ref() == Some(&after) {
            // no actual change since snap(); nothing to record.
            return;
        }
        if let Some(before) = before {
            if let Some(cur) = self.cursor {
                self.entries.truncate(cur + 1);
            } else {
                self.entries.clear();
            }
            if self.entries.is_empty() {
                self.entries.push_back(before);
            }
            self.entries.push_back(after);
            while self.entries.len() > self.capacity + 1 {
                self.entries.pop_front();
            }
            self.cursor = Some(self.entries.len() - 1);
        }
    }

    /// Step one entry back and return the snapshot to restore, or `None`
    /// if there is nothing further to undo. If the cursor was at the tail
    /// and the caller's current state had diverged from it (the usual case
    /// right after typing), the caller must `snap`+`add` the diverged state
    /// first so `redo` can return to it (spec §4.C).
    pub fn undo(&mut self) -> Option<&Snapshot> {
        let cur = self.cursor?;
        if cur == 0 {
            return None;
        }
        self.cursor = Some(cur - 1);
        self.entries.get(cur - 1)
    }

    pub fn redo(&mut self) -> Option<&Snapshot> {
        let cur = self.cursor?;
        if cur + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cur + 1);
        self.entries.get(cur + 1)
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        matches!(self.cursor, Some(c) if c + 1 < self.entries.len())
    }

    /// Discards all undo history (spec §4.C "return" submission: "free all
    /// undos").
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
        self.staged = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(text: &str, cursor: usize) -> Snapshot {
        Snapshot { text: text.to_string(), cursor }
    }

    #[test]
    fn undo_redo_round_trip() {
        // insert("hel"), insert("lo"), delete_prev_word
        let mut ring = UndoRing::new(10);
        ring.snap(&snap("", 0));
        ring.add(snap("hel", 3));
        ring.snap(&snap("hel", 3));
        ring.add(snap("hello", 5));
        ring.snap(&snap("hello", 5));
        ring.add(snap("", 0));

        assert_eq!(ring.undo(), Some(&snap("hello", 5)));
        assert_eq!(ring.undo(), Some(&snap("hel", 3)));
        assert_eq!(ring.redo(), Some(&snap("hello", 5)));
        assert!(ring.can_redo());
    }

    #[test]
    fn redo_future_discarded_on_new_edit() {
        let mut ring = UndoRing::new(10);
        ring.snap(&snap("", 0));
        ring.add(snap("a", 1));
        ring.snap(&snap("a", 1));
        ring.add(snap("ab", 2));
        ring.undo();
        assert!(ring.can_redo());
        ring.snap(&snap("a", 1));
        ring.add(snap("ax", 2));
        assert!(!ring.can_redo(), "a fresh edit must drop the redo-future");
    }

    #[test]
    fn capacity_drops_oldest() {
        let mut ring = UndoRing::new(2);
        ring.snap(&snap("", 0));
        ring.add(snap("a", 1));
        ring.snap(&snap("a", 1));
        ring.add(snap("ab", 2));
        ring.snap(&snap("ab", 2));
        ring.add(snap("abc", 3));
        assert!(ring.len() <= 3);
        // oldest ("") must have been evicted, so we can't undo all the way
        // back to empty.
        while ring.can_undo() {
            ring.undo();
        }
        assert_ne!(ring.entries[0], snap("", 0));
    }

    #[test]
    fn zero_capacity_disables_tracking() {
        let mut ring = UndoRing::new(0);
        ring.snap(&snap("", 0));
        ring.add(snap("a", 1));
        assert!(!ring.can_undo());
        assert!(ring.is_empty());
    }
}
