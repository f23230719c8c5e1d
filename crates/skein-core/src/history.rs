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

//! Per-buffer and global command history rings with bash/readline
//! semantics (spec §4.B). A live edit is promoted back into the ring entry
//! it was recalled from when the user moves past it, exactly as
//! readline/bash do.

use std::collections::VecDeque;

/// A bounded ring of history entries, shared shape for both the per-buffer
/// and the process-global ring (spec §3 "History entry").
pub struct HistoryRing {
    entries: VecDeque<String>,
    capacity: usize,
    /// Cursor into `entries` while navigating (`None` means "at the live
    /// input line", i.e. not currently recalling history).
    cursor: Option<usize>,
    /// The user's in-progress input, saved when `previous()` first moves
    /// off it, so `next()` can return to it (spec: "save current input as
    /// a pseudo-entry").
    pending_input: Option<String>,
}

impl HistoryRing {
    pub fn new(capacity: usize) -> Self {
        Self { entries: VecDeque::new(), capacity, cursor: None, pending_input: None }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.entries.iter()
    }

    /// Adds `text` to the front of the ring unless it equals the current
    /// head (no back-to-back duplicates), evicting the tail if over
    /// capacity. Returns `true` if an entry referenced by a search cursor
    /// elsewhere may have been dropped (caller should clear that cursor).
    pub fn add(&mut self, text: &str) -> bool {
        if self.entries.front().map(|h| h.as_str()) == Some(text) {
            return false;
        }
        self.entries.push_front(text.to_string());
        self.cursor = None;
        self.pending_input = None;
        if self.capacity > 0 && self.entries.len() > self.capacity {
            self.entries.pop_back();
            return true;
        }
        false
    }

    /// Move toward older entries. `current_input` is the text presently in
    /// the input line (needed the first time, to stash it as the
    /// pseudo-entry the user returns to at the end of `next()`).
    pub fn previous(&mut self, current_input: &str) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let next_cursor = match self.cursor {
            None => {
                self.pending_input = Some(current_input.to_string());
                0
            }
            Some(c) if c + 1 < self.entries.len() => c + 1,
            Some(c) => c,
        };
        self.cursor = Some(next_cursor);
        self.entries.get(next_cursor).map(|s| s.as_str())
    }

    /// Move toward newer entries, persisting `current_input` back into the
    /// ring entry being left (readline-style live edit promotion). Returns
    /// `None` once past the newest entry, meaning the caller should restore
    /// `pending_input` (the text that was live before recall began).
    pub fn next(&mut self, current_input: &str) -> Option<&str> {
        let cur = self.cursor?;
        if let Some(slot) = self.entries.get_mut(cur) {
            *slot = current_input.to_string();
        }
        if cur == 0 {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(cur - 1);
        self.entries.get(cur - 1).map(|s| s.as_str())
    }

    /// The stashed live input a `next()` past the newest entry should
    /// restore, consuming it (matches readline: the pseudo-entry is used
    /// exactly once per recall session).
    pub fn take_pending_input(&mut self) -> Option<String> {
        self.pending_input.take()
    }

    pub fn is_navigating(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
        self.pending_input = None;
    }

    /// Linear search honoring exact/regex/case (spec §4.B `search`).
    /// Returns the matching text and its ring index, closest-to-head first
    /// in the given direction.
    pub fn search(
        &self,
        query: &str,
        from: usize,
        backward: bool,
        exact: bool,
        regex: Option<&regex::Regex>,
    ) -> Option<(usize, &str)> {
        let idxs: Box<dyn Iterator<Item = usize>> = if backward {
            Box::new(from..self.entries.len())
        } else {
            Box::new((0..=from.min(self.entries.len().saturating_sub(1))).rev())
        };
        for i in idxs {
            let entry = self.entries.get(i)?;
            let hit = if let Some(re) = regex {
                re.is_match(entry)
            } else if exact {
                entry.contains(query)
            } else {
                entry.to_lowercase().contains(&query.to_lowercase())
            };
            if hit {
                return Some((i, entry.as_str()));
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_head_is_noop() {
        let mut ring = HistoryRing::new(10);
        ring.add("hello");
        ring.add("hello");
        assert_eq!(ring.len(), 1);
    }

    #[test]
    fn capacity_eviction() {
        let mut ring = HistoryRing::new(2);
        ring.add("a");
        ring.add("b");
        ring.add("c");
        assert_eq!(ring.len(), 2);
        assert_eq!(ring.iter().cloned().collect::<Vec<_>>(), vec!["c", "b"]);
    }

    #[test]
    fn recall_with_live_edit_scenario() {
        // History entries (newest first): ["/quit", "hello world"].
        let mut ring = HistoryRing::new(10);
        ring.add("hello world");
        ring.add("/quit");

        assert_eq!(ring.previous("ab"), Some("/quit"));
        assert_eq!(ring.previous("/quit"), Some("hello world"));
        assert_eq!(ring.next("hello world"), Some("/quit"));
        assert_eq!(ring.next("/quit"), None);
        assert_eq!(ring.take_pending_input().as_deref(), Some("ab"));
    }
}
