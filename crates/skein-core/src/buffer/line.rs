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

//! Lines and line lists (spec §3 "Line (formatted)"). The original's
//! doubly-linked `gui_line`/`gui_lines` pair becomes a plain `Vec<Line>`
//! ordered by `id_within_buffer`; siblings are just adjacent indices, so
//! there is no pointer-patching on insert/remove (Design Notes: arena +
//! stable indices for every entity kind).

use bitflags::bitflags;

bitflags! {
    /// Per-line display flags. Replaces the original's ad hoc `displayed`,
    /// `highlight` and `refresh_needed` booleans with one set (Design
    /// Notes: "`MSG_TYPE_*` bitmasks... a `LineTags` set").
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LineFlags: u8 {
        const DISPLAYED      = 0b001;
        const HIGHLIGHT       = 0b010;
        const REFRESH_NEEDED  = 0b100;
    }
}

/// A single line of a formatted buffer.
#[derive(Debug, Clone)]
pub struct Line {
    pub id_within_buffer: u64,
    pub timestamp: i64,
    pub timestamp_us: i64,
    pub print_timestamp: i64,
    pub print_timestamp_us: i64,
    pub prefix: Option<String>,
    pub message: Option<String>,
    pub tags: Vec<String>,
    pub flags: LineFlags,
    /// Explicit row index; only meaningful for free-kind buffers.
    pub y: Option<i64>,
    /// Id of the buffer that actually owns this line; tracked so a merged
    /// group's mixed view can attribute each row without copying lines
    /// (Design Notes: "store lines centrally per buffer... mixed view as a
    /// cursor over peer iterators").
    pub owner_id: u64,
}

impl Line {
    pub fn is_highlight(&self) -> bool {
        self.flags.contains(LineFlags::HIGHLIGHT)
    }
}

/// The ordered collection of lines belonging to one buffer, plus the
/// bookkeeping the original kept alongside the doubly-linked list.
#[derive(Debug, Default)]
pub struct LineList {
    lines: Vec<Line>,
    next_line_id: u64,
    pub last_read: Option<u64>,
    pub first_not_read: bool,
    pub lines_hidden: usize,
    pub prefix_max_length: usize,
    pub refresh_needed: bool,
}

impl LineList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Line> {
        self.lines.iter()
    }

    pub fn first(&self) -> Option<&Line> {
        self.lines.first()
    }

    pub fn last(&self) -> Option<&Line> {
        self.lines.last()
    }

    pub fn get(&self, idx: usize) -> Option<&Line> {
        self.lines.get(idx)
    }

    /// Appends a new line, assigning it the next monotonic
    /// `id_within_buffer` and updating `prefix_max_length`.
    pub fn push(&mut self, owner_id: u64, prefix: Option<String>, message: Option<String>, tags: Vec<String>, timestamp: i64, timestamp_us: i64) -> u64 {
        let id = self.next_line_id;
        self.next_line_id += 1;
        if let Some(p) = &prefix {
            self.prefix_max_length = self.prefix_max_length.max(p.chars().count());
        }
        self.lines.push(Line {
            id_within_buffer: id,
            timestamp,
            timestamp_us,
            print_timestamp: timestamp,
            print_timestamp_us: timestamp_us,
            prefix,
            message,
            tags,
            flags: LineFlags::DISPLAYED,
            y: None,
            owner_id,
        });
        self.refresh_needed = true;
        id
    }

    /// Clears all lines (spec §6.1 `clear(buffer)`), resetting the
    /// per-list bookkeeping but preserving `next_line_id` monotonicity.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.last_read = None;
        self.first_not_read = false;
        self.lines_hidden = 0;
        self.prefix_max_length = 0;
        self.refresh_needed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_monotonic_ids() {
        let mut list = LineList::new();
        let a = list.push(1, Some("nick".into()), Some("hi".into()), vec![], 0, 0);
        let b = list.push(1, None, Some("bye".into()), vec![], 1, 0);
        assert!(b > a);
        assert_eq!(list.len(), 2);
        assert_eq!(list.prefix_max_length, 4);
    }

    #[test]
    fn clear_resets_bookkeeping_not_ids() {
        let mut list = LineList::new();
        list.push(1, None, Some("hi".into()), vec![], 0, 0);
        list.clear();
        assert!(list.is_empty());
        let next = list.push(1, None, Some("again".into()), vec![], 1, 0);
        assert_eq!(next, 1, "ids keep incrementing across a clear");
    }
}
