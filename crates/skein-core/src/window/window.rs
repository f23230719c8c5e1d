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

//! The `Window` entity (spec §3 "Window"). Tree shape and resize/focus
//! traversal live in `tree.rs`; per-buffer scroll bookkeeping in
//! `scroll.rs`. This module only owns one window's own rectangle, its
//! scroll-list, and the coordinate map the renderer fills in.

use std::collections::VecDeque;

use crate::arena::Handle;
use crate::buffer::Buffer;
use crate::dirty::RefreshFlag;
use crate::window::scroll::ScrollState;
use crate::window::tree::TreeNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }
}

/// One cell of the renderer-filled coordinate map (spec §4.F "Coordinate
/// map"): which line a rendered row corresponds to, and where within that
/// line's message text each displayed column range falls, so mouse/copy
/// operations can map a screen hit back to buffer content.
#[derive(Debug, Clone, Default)]
pub struct CoordCell {
    pub line_id: Option<u64>,
    /// Byte offset into the line's rendered message where this row's first
    /// displayed column begins (non-zero for a wrapped continuation row).
    pub message_offset: usize,
}

/// Upper bound on how many distinct buffers' scroll state a window keeps
/// around before garbage-collecting the least-recently-used unmodified
/// entry (spec §4.F "Scroll state switching").
pub const MAX_SCROLL_HISTORY: usize = 64;

pub struct Window {
    pub number: i64,
    pub rect: Rect,
    pub chat_rect: Rect,
    pub buffer: Handle<Buffer>,
    /// Per-(window, buffer) scroll state, most-recently-shown buffer at the
    /// front. Index 0's buffer is always `self.buffer`.
    pub scroll_list: VecDeque<(Handle<Buffer>, ScrollState)>,
    /// One row per `chat_rect.height`, filled by the renderer after each
    /// repaint (spec §4.F "Coordinate map").
    pub coords: Vec<CoordCell>,
    pub refresh: RefreshFlag,
    /// Saved `(plugin, name)` pair for a buffer a layout wants this window
    /// to show once that buffer exists (spec §6.4, optional layout format).
    pub layout_hint: Option<(String, String)>,
    pub tree_leaf: Handle<TreeNode>,
}

impl Window {
    pub fn new(number: i64, rect: Rect, buffer: Handle<Buffer>, tree_leaf: Handle<TreeNode>) -> Self {
        let mut scroll_list = VecDeque::new();
        scroll_list.push_front((buffer, ScrollState::default()));
        Window {
            number,
            rect,
            chat_rect: rect,
            buffer,
            scroll_list,
            coords: Vec::new(),
            refresh: RefreshFlag::default(),
            layout_hint: None,
            tree_leaf,
        }
    }

    /// Looks up (or creates) the scroll state for `buffer` and promotes it
    /// to the front, without changing `self.buffer` — the caller is
    /// responsible for that switch (spec §4.F "Scroll state switching").
    pub fn recall_scroll(&mut self, buffer: Handle<Buffer>) -> ScrollState {
        if let Some(pos) = self.scroll_list.iter().position(|(b, _)| *b == buffer) {
            let (_, state) = self.scroll_list.remove(pos).unwrap();
            self.scroll_list.push_front((buffer, state.clone()));
            state
        } else {
            let state = ScrollState::default();
            self.scroll_list.push_front((buffer, state.clone()));
            self.gc_scroll_list();
            state
        }
    }

    pub fn current_scroll(&self) -> &ScrollState {
        &self.scroll_list[0].1
    }

    pub fn current_scroll_mut(&mut self) -> &mut ScrollState {
        &mut self.scroll_list[0].1
    }

    /// Switches the window's current buffer, preserving that buffer's own
    /// scroll state if it was visited before.
    pub fn switch_buffer(&mut self, buffer: Handle<Buffer>) {
        self.buffer = buffer;
        self.recall_scroll(buffer);
    }

    /// Drops unmodified non-front scroll-list entries once the list grows
    /// past `MAX_SCROLL_HISTORY`, oldest first.
    fn gc_scroll_list(&mut self) {
        while self.scroll_list.len() > MAX_SCROLL_HISTORY {
            let drop_at = self
                .scroll_list
                .iter()
                .enumerate()
                .skip(1)
                .find(|(_, (_, s))| s.is_unmodified())
                .map(|(i, _)| i);
            match drop_at {
                Some(i) => {
                    self.scroll_list.remove(i);
                }
                None => break,
            }
        }
    }

    pub fn resize(&mut self, rect: Rect) {
        if self.rect != rect {
            self.rect = rect;
            self.chat_rect = rect;
            self.coords.clear();
            self.refresh.ask(crate::dirty::RefreshLevel::Everything);
        }
    }
}

/// A rendered line hit-tested at a screen coordinate (spec.md:246
/// `get_context_at(w, x, y)`). Everything but `in_chat` is `None`/`false`
/// when the hit falls outside the chat area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    pub in_chat: bool,
    pub line_id: Option<u64>,
    /// Byte offset into the hit line's message text the hit resolved to.
    pub line_x: usize,
    /// Word (if any) covering `line_x`; `None` on whitespace.
    pub word: Option<String>,
    /// Whether the hit line is the buffer's most recently printed line.
    pub focused_line: bool,
    pub line_before: Option<String>,
    pub line_after: Option<String>,
    pub word_before: Option<String>,
    pub word_after: Option<String>,
}

fn word_bounds(message: &str, at: usize) -> Option<(usize, usize)> {
    if at > message.len() {
        return None;
    }
    let bytes = message.as_bytes();
    if at >= bytes.len() || bytes[at].is_ascii_whitespace() {
        return None;
    }
    let mut start = at;
    while start > 0 && !bytes[start - 1].is_ascii_whitespace() {
        start -= 1;
    }
    let mut end = at;
    while end < bytes.len() && !bytes[end].is_ascii_whitespace() {
        end += 1;
    }
    Some((start, end))
}

/// Splits `message` on whitespace and returns the word (if any) covering
/// byte offset `at`, used by `get_context_at` once the coordinate map has
/// resolved a screen hit to a line and an offset into its message text.
pub fn word_at(message: &str, at: usize) -> Option<String> {
    word_bounds(message, at).map(|(s, e)| message[s..e].to_string())
}

/// The word immediately preceding byte offset `start` (exclusive), skipping
/// the whitespace run between them.
fn word_before(message: &str, start: usize) -> Option<String> {
    let bytes = message.as_bytes();
    let mut i = start;
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    if i == 0 {
        return None;
    }
    word_bounds(message, i - 1).map(|(s, e)| message[s..e].to_string())
}

/// The word immediately following byte offset `end` (exclusive), skipping
/// the whitespace run between them.
fn word_after(message: &str, end: usize) -> Option<String> {
    let bytes = message.as_bytes();
    let mut i = end;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= bytes.len() {
        return None;
    }
    word_bounds(message, i).map(|(s, e)| message[s..e].to_string())
}

/// Fills `window.coords` with one row per currently visible line, starting
/// at the window's current scroll position. No soft-wrap: each row maps to
/// exactly one buffer line (`message_offset` always 0), the same
/// restriction the teacher's own fixed-width terminal rendering lives with.
/// `lines` must be the buffer's lines in display (oldest-to-newest) order,
/// e.g. `BufferStore::mixed_lines`.
pub fn fill_coords(window: &mut Window, lines: &[&crate::buffer::line::Line]) {
    let height = window.chat_rect.height as usize;
    let start = window.current_scroll().start_line;
    window.coords.clear();
    window.coords.reserve(height);
    for row in 0..height {
        let cell = match lines.get(start + row) {
            Some(line) => CoordCell { line_id: Some(line.id_within_buffer), message_offset: 0 },
            None => CoordCell::default(),
        };
        window.coords.push(cell);
    }
}

/// Resolves a screen hit at `(x, y)` against `window`'s coordinate map and
/// the `lines` it is currently showing (spec.md:246 `get_context_at`).
/// `lines` must be the same ordered slice `fill_coords` was last called
/// with for this window.
pub fn get_context_at(window: &Window, lines: &[&crate::buffer::line::Line], x: u16, y: u16) -> Context {
    let mut ctx = Context { in_chat: window.chat_rect.contains(x, y), ..Context::default() };
    if !ctx.in_chat {
        return ctx;
    }
    let row = (y - window.chat_rect.y) as usize;
    let Some(cell) = window.coords.get(row) else { return ctx };
    let Some(line_id) = cell.line_id else { return ctx };
    let Some(idx) = lines.iter().position(|l| l.id_within_buffer == line_id) else { return ctx };

    let line = lines[idx];
    ctx.line_id = Some(line_id);
    ctx.focused_line = idx + 1 == lines.len();

    let message = line.message.as_deref().unwrap_or("");
    let column = (x - window.chat_rect.x) as usize;
    let at = skein_unicode::byte_offset_of_codepoint(message, cell.message_offset + column).min(message.len());
    ctx.line_x = at;

    if let Some((start, end)) = word_bounds(message, at) {
        ctx.word = Some(message[start..end].to_string());
        ctx.word_before = word_before(message, start);
        ctx.word_after = word_after(message, end);
    }

    if idx > 0 {
        ctx.line_before = lines[idx - 1].message.clone();
    }
    if idx + 1 < lines.len() {
        ctx.line_after = lines[idx + 1].message.clone();
    }
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_checks_half_open_bounds() {
        let r = Rect { x: 2, y: 2, width: 3, height: 3 };
        assert!(r.contains(2, 2));
        assert!(r.contains(4, 4));
        assert!(!r.contains(5, 4));
        assert!(!r.contains(1, 2));
    }

    #[test]
    fn word_at_finds_enclosing_token() {
        let msg = "hello world  foo";
        assert_eq!(word_at(msg, 1), Some("hello".to_string()));
        assert_eq!(word_at(msg, 6), Some("world".to_string()));
        assert_eq!(word_at(msg, 5), None);
        assert_eq!(word_at(msg, 12), None);
        assert_eq!(word_at(msg, 100), None);
    }

    fn line(id: u64, message: &str) -> crate::buffer::line::Line {
        crate::buffer::line::Line {
            id_within_buffer: id,
            timestamp: id as i64,
            timestamp_us: 0,
            print_timestamp: id as i64,
            print_timestamp_us: 0,
            prefix: None,
            message: Some(message.to_string()),
            tags: Vec::new(),
            flags: crate::buffer::line::LineFlags::DISPLAYED,
            y: None,
            owner_id: 1,
        }
    }

    #[test]
    fn fill_coords_maps_rows_to_scrolled_lines() {
        let rect = Rect { x: 0, y: 0, width: 20, height: 2 };
        let mut win = Window::new(0, rect, Handle::dangling(), Handle::dangling());
        let lines = vec![line(0, "hello world"), line(1, "second line"), line(2, "third line")];
        let refs: Vec<&crate::buffer::line::Line> = lines.iter().collect();
        win.current_scroll_mut().start_line = 1;
        fill_coords(&mut win, &refs);
        assert_eq!(win.coords.len(), 2);
        assert_eq!(win.coords[0].line_id, Some(1));
        assert_eq!(win.coords[1].line_id, Some(2));
    }

    #[test]
    fn get_context_at_resolves_word_and_neighbour_lines() {
        let rect = Rect { x: 0, y: 0, width: 20, height: 2 };
        let mut win = Window::new(0, rect, Handle::dangling(), Handle::dangling());
        let lines = vec![line(0, "hello world"), line(1, "second line")];
        let refs: Vec<&crate::buffer::line::Line> = lines.iter().collect();
        fill_coords(&mut win, &refs);

        let ctx = get_context_at(&win, &refs, 1, 0);
        assert!(ctx.in_chat);
        assert_eq!(ctx.line_id, Some(0));
        assert_eq!(ctx.word, Some("hello".to_string()));
        assert_eq!(ctx.word_after, Some("world".to_string()));
        assert_eq!(ctx.word_before, None);
        assert!(ctx.line_before.is_none());
        assert_eq!(ctx.line_after.as_deref(), Some("second line"));
        assert!(!ctx.focused_line);

        let miss = get_context_at(&win, &refs, 0, 5);
        assert!(!miss.in_chat);
    }
}
