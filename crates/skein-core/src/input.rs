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

//! The line input editor (spec §4.C): a UTF-8 edit buffer with cursor,
//! undo/redo, clipboard, completion state and paste detection. Unlike the
//! teacher's `View`, which edits a shared `xi_rope::Rope` document, this
//! edits a single line's worth of text in place — the input line is short
//! and doesn't need a rope's logarithmic splice cost.

use crate::undo::{Snapshot, UndoRing};
use skein_unicode::{
    byte_offset_of_codepoint, codepoint_len, codepoint_of_byte, is_whitespace_char,
    is_word_char_input, next_char, prev_char, sanitize_utf8,
};

/// Process-wide clipboard slot (spec §5 "Shared resources"). Writable only
/// from the input editor's delete/paste operations.
#[derive(Debug, Clone, Default)]
pub struct Clipboard(String);

impl Clipboard {
    pub fn set(&mut self, text: impl Into<String>) {
        self.0 = text.into();
    }

    pub fn get(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasteOutcome {
    Inserted,
    Pending,
}

/// The editable input line owned by a buffer.
pub struct InputEditor {
    text: String,
    /// Cursor position, in codepoints.
    cursor: usize,
    /// Leftmost codepoint currently drawn (horizontal scroll of the input
    /// line itself, independent of the window's line scroll).
    pub display_left: usize,
    pub prompt: String,
    pub multiline: bool,
    pub get_empty: bool,
    undo: UndoRing,
    /// Burst-paste buffer: bytes accumulated while `input_paste_pending` is
    /// asserted, waiting for `paste_confirm`/cancellation.
    pending_paste: Option<String>,
    paste_threshold_bytes: usize,
}

impl InputEditor {
    pub fn new(undo_capacity: usize, paste_threshold_bytes: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            display_left: 0,
            prompt: String::new(),
            multiline: false,
            get_empty: false,
            undo: UndoRing::new(undo_capacity),
            pending_paste: None,
            paste_threshold_bytes,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Bytes used by the current text (spec §8 invariant `size(input) = bytelen`).
    pub fn size(&self) -> usize {
        self.text.len()
    }

    /// Codepoints in the current text.
    pub fn length(&self) -> usize {
        codepoint_len(&self.text)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot { text: self.text.clone(), cursor: self.cursor }
    }

    fn byte_at(&self, cp: usize) -> usize {
        byte_offset_of_codepoint(&self.text, cp)
    }

    /// Stages an undo snapshot before a mutation; call at the top of every
    /// public mutator (mirrors the teacher's `snap()`/`add()` pairing).
    fn begin_edit(&mut self) {
        self.undo.snap(&self.snapshot());
    }

    fn end_edit(&mut self) {
        self.undo.add(self.snapshot());
    }

    // ---- insertion -------------------------------------------------

    /// Inserts `s` at the cursor, normalizing invalid UTF-8 bytes
    /// (`sanitize_utf8` is applied by callers feeding raw bytes; `s` here
    /// is already-decoded text) and advancing the cursor by its codepoint
    /// length (spec §4.C `insert`).
    pub fn insert(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        self.begin_edit();
        let at = self.byte_at(self.cursor);
        self.text.insert_str(at, s);
        self.cursor += codepoint_len(s);
        self.end_edit();
    }

    /// Inserts raw bytes (e.g. from an fd read), sanitizing invalid UTF-8
    /// to `?` first.
    pub fn insert_bytes(&mut self, bytes: &[u8]) {
        let s = sanitize_utf8(bytes);
        self.insert(&s);
    }

    pub fn replace_all(&mut self, s: &str) {
        self.begin_edit();
        let old_len = codepoint_len(&self.text);
        self.text = sanitize_utf8(s.as_bytes());
        let new_len = codepoint_len(&self.text);
        if self.cursor > new_len || old_len != new_len {
            self.cursor = self.cursor.min(new_len);
        }
        self.end_edit();
    }

    // ---- deletion ----------------------------------------------------

    pub fn delete_prev_char(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.begin_edit();
        let end = self.byte_at(self.cursor);
        let start = prev_char(&self.text, end);
        self.text.drain(start..end);
        self.cursor -= 1;
        self.end_edit();
    }

    pub fn delete_next_char(&mut self) {
        if self.cursor >= self.length() {
            return;
        }
        self.begin_edit();
        let start = self.byte_at(self.cursor);
        let end = next_char(&self.text, start);
        self.text.drain(start..end);
        self.end_edit();
    }

    /// Skip non-word chars, then word chars; copies the deleted slice to
    /// the clipboard (spec §4.C `delete_prev_word`).
    pub fn delete_prev_word(&mut self, clipboard: &mut Clipboard) {
        self.delete_prev_word_with(clipboard, is_word_char_input)
    }

    /// Variant whose boundary is pure whitespace rather than the
    /// word-char class (spec `delete_prev_word_whitespace`).
    pub fn delete_prev_word_whitespace(&mut self, clipboard: &mut Clipboard) {
        self.delete_prev_word_with(clipboard, |c| !is_whitespace_char(c))
    }

    fn delete_prev_word_with(&mut self, clipboard: &mut Clipboard, is_word: impl Fn(char) -> bool) {
        if self.cursor == 0 {
            return;
        }
        self.begin_edit();
        let end_byte = self.byte_at(self.cursor);
        let chars: Vec<(usize, char)> = self.text[..end_byte].char_indices().collect();
        let mut i = chars.len();
        // skip trailing non-word chars
        while i > 0 && !is_word(chars[i - 1].1) {
            i -= 1;
        }
        while i > 0 && is_word(chars[i - 1].1) {
            i -= 1;
        }
        let p = chars.get(i).map(|(b, _)| *b).unwrap_or(0);
        let removed = self.text[p..end_byte].to_string();
        clipboard.set(removed);
        let cursor_delta = codepoint_of_byte(&self.text, end_byte) - codepoint_of_byte(&self.text, p);
        self.text.drain(p..end_byte);
        self.cursor -= cursor_delta;
        self.end_edit();
    }

    pub fn delete_next_word(&mut self, clipboard: &mut Clipboard) {
        if self.cursor >= self.length() {
            return;
        }
        self.begin_edit();
        let start_byte = self.byte_at(self.cursor);
        let rest: Vec<(usize, char)> =
            self.text[start_byte..].char_indices().map(|(i, c)| (i + start_byte, c)).collect();
        let mut i = 0;
        while i < rest.len() && !is_word_char_input(rest[i].1) {
            i += 1;
        }
        while i < rest.len() && is_word_char_input(rest[i].1) {
            i += 1;
        }
        let end_byte = rest.get(i).map(|(b, _)| *b).unwrap_or(self.text.len());
        let removed = self.text[start_byte..end_byte].to_string();
        clipboard.set(removed);
        self.text.drain(start_byte..end_byte);
        self.end_edit();
    }

    /// Multi-line aware: on a line boundary this extends to the previous
    /// line (spec `delete_to_line_start`).
    pub fn delete_to_line_start(&mut self, clipboard: &mut Clipboard) {
        self.begin_edit();
        let end_byte = self.byte_at(self.cursor);
        let line_start = self.text[..end_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let start_byte = if line_start == end_byte && line_start > 0 {
            // already at the start of this line; extend into the previous one.
            self.text[..line_start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0)
        } else {
            line_start
        };
        let removed = self.text[start_byte..end_byte].to_string();
        clipboard.set(removed);
        let delta = codepoint_of_byte(&self.text, end_byte) - codepoint_of_byte(&self.text, start_byte);
        self.text.drain(start_byte..end_byte);
        self.cursor -= delta;
        self.end_edit();
    }

    pub fn delete_to_line_end(&mut self, clipboard: &mut Clipboard) {
        self.begin_edit();
        let start_byte = self.byte_at(self.cursor);
        let line_end = self.text[start_byte..].find('\n').map(|i| i + start_byte);
        let end_byte = match line_end {
            Some(e) if e == start_byte => {
                // already at end of line; extend into the next one.
                self.text[start_byte + 1..].find('\n').map(|i| i + start_byte + 1).unwrap_or(self.text.len())
            }
            Some(e) => e,
            None => self.text.len(),
        };
        let removed = self.text[start_byte..end_byte].to_string();
        clipboard.set(removed);
        self.text.drain(start_byte..end_byte);
        self.end_edit();
    }

    pub fn delete_to_input_start(&mut self, clipboard: &mut Clipboard) {
        self.begin_edit();
        let end_byte = self.byte_at(self.cursor);
        let removed = self.text[..end_byte].to_string();
        clipboard.set(removed);
        self.text.drain(..end_byte);
        self.cursor = 0;
        self.end_edit();
    }

    pub fn delete_to_input_end(&mut self, clipboard: &mut Clipboard) {
        self.begin_edit();
        let start_byte = self.byte_at(self.cursor);
        let removed = self.text[start_byte..].to_string();
        clipboard.set(removed);
        self.text.truncate(start_byte);
        self.end_edit();
    }

    pub fn delete_line(&mut self, clipboard: &mut Clipboard) {
        self.begin_edit();
        let cur_byte = self.byte_at(self.cursor);
        let start = self.text[..cur_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let end = self.text[cur_byte..].find('\n').map(|i| i + cur_byte).unwrap_or(self.text.len());
        let removed = self.text[start..end].to_string();
        clipboard.set(removed);
        let cursor_at_start = codepoint_of_byte(&self.text, start);
        self.text.drain(start..end);
        self.cursor = cursor_at_start;
        self.end_edit();
    }

    pub fn delete_all(&mut self) {
        if self.text.is_empty() {
            return;
        }
        self.begin_edit();
        self.text.clear();
        self.cursor = 0;
        self.end_edit();
    }

    // ---- transpose -----------------------------------------------------

    /// Swaps the codepoint at `cursor-1` with `cursor`; if the cursor sits
    /// at the end, swaps the last two. No-op when `length() < 2`.
    pub fn transpose_chars(&mut self) {
        let len = self.length();
        if len < 2 {
            return;
        }
        self.begin_edit();
        let (a, b) = if self.cursor >= len { (len - 2, len - 1) } else { (self.cursor - 1, self.cursor) };
        let a_start = self.byte_at(a);
        let a_end = next_char(&self.text, a_start);
        let b_start = self.byte_at(b);
        let b_end = next_char(&self.text, b_start);
        let a_str = self.text[a_start..a_end].to_string();
        let b_str = self.text[b_start..b_end].to_string();
        let mut new_text = String::with_capacity(self.text.len());
        new_text.push_str(&self.text[..a_start]);
        new_text.push_str(&b_str);
        new_text.push_str(&a_str);
        new_text.push_str(&self.text[b_end..]);
        self.text = new_text;
        self.cursor = (b + 1).min(len);
        self.end_edit();
    }

    // ---- movement -------------------------------------------------------

    pub fn move_beginning_of_line(&mut self) {
        let cur_byte = self.byte_at(self.cursor);
        let line_start = self.text[..cur_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        self.cursor = codepoint_of_byte(&self.text, line_start);
    }

    pub fn move_end_of_line(&mut self) {
        let cur_byte = self.byte_at(self.cursor);
        let line_end = self.text[cur_byte..].find('\n').map(|i| i + cur_byte).unwrap_or(self.text.len());
        self.cursor = codepoint_of_byte(&self.text, line_end);
    }

    pub fn move_beginning_of_input(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end_of_input(&mut self) {
        self.cursor = self.length();
    }

    pub fn move_prev_char(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_next_char(&mut self) {
        if self.cursor < self.length() {
            self.cursor += 1;
        }
    }

    pub fn move_prev_word(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let cur_byte = self.byte_at(self.cursor);
        let chars: Vec<(usize, char)> = self.text[..cur_byte].char_indices().collect();
        let mut i = chars.len();
        while i > 0 && !is_word_char_input(chars[i - 1].1) {
            i -= 1;
        }
        while i > 0 && is_word_char_input(chars[i - 1].1) {
            i -= 1;
        }
        let byte = chars.get(i).map(|(b, _)| *b).unwrap_or(0);
        self.cursor = codepoint_of_byte(&self.text, byte);
    }

    pub fn move_next_word(&mut self) {
        let cur_byte = self.byte_at(self.cursor);
        let rest: Vec<(usize, char)> =
            self.text[cur_byte..].char_indices().map(|(i, c)| (i + cur_byte, c)).collect();
        let mut i = 0;
        while i < rest.len() && !is_word_char_input(rest[i].1) {
            i += 1;
        }
        while i < rest.len() && is_word_char_input(rest[i].1) {
            i += 1;
        }
        let byte = rest.get(i).map(|(b, _)| *b).unwrap_or(self.text.len());
        self.cursor = codepoint_of_byte(&self.text, byte);
    }

    /// Column-preserving previous/next line movement within a multi-line
    /// input.
    pub fn move_prev_line(&mut self) {
        let cur_byte = self.byte_at(self.cursor);
        let line_start = self.text[..cur_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        if line_start == 0 {
            return;
        }
        let col = cur_byte - line_start;
        let prev_line_start = self.text[..line_start - 1].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let prev_line_len = (line_start - 1) - prev_line_start;
        let new_byte = prev_line_start + col.min(prev_line_len);
        self.cursor = codepoint_of_byte(&self.text, new_byte);
    }

    pub fn move_next_line(&mut self) {
        let cur_byte = self.byte_at(self.cursor);
        let line_start = self.text[..cur_byte].rfind('\n').map(|i| i + 1).unwrap_or(0);
        let col = cur_byte - line_start;
        let line_end = self.text[cur_byte..].find('\n').map(|i| i + cur_byte);
        let Some(line_end) = line_end else { return };
        let next_line_start = line_end + 1;
        let next_line_end =
            self.text[next_line_start..].find('\n').map(|i| i + next_line_start).unwrap_or(self.text.len());
        let next_line_len = next_line_end - next_line_start;
        let new_byte = next_line_start + col.min(next_line_len);
        self.cursor = codepoint_of_byte(&self.text, new_byte);
    }

    // ---- clipboard -------------------------------------------------

    pub fn paste(&mut self, clipboard: &Clipboard) {
        let text = clipboard.get().to_string();
        self.insert(&text);
    }

    // ---- undo/redo -------------------------------------------------

    pub fn undo(&mut self) -> bool {
        if let Some(snap) = self.undo.undo() {
            self.text = snap.text.clone();
            self.cursor = snap.cursor;
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if let Some(snap) = self.undo.redo() {
            self.text = snap.text.clone();
            self.cursor = snap.cursor;
            true
        } else {
            false
        }
    }

    fn clear_undo(&mut self) {
        self.undo.clear();
    }

    // ---- paste burst detection -------------------------------------

    /// Feeds a burst of raw bytes from one fd read. If the burst exceeds
    /// the configured threshold, the bytes are buffered and
    /// `PasteOutcome::Pending` is returned instead of inserting — the
    /// caller should raise `input_paste_pending` and wait for
    /// `paste_confirm`/`paste_cancel` (SPEC_FULL open question 1).
    pub fn feed_paste_bytes(&mut self, bytes: &[u8]) -> PasteOutcome {
        if bytes.len() > self.paste_threshold_bytes {
            let text = sanitize_utf8(bytes);
            match &mut self.pending_paste {
                Some(buf) => buf.push_str(&text),
                None => self.pending_paste = Some(text),
            }
            PasteOutcome::Pending
        } else {
            self.insert_bytes(bytes);
            PasteOutcome::Inserted
        }
    }

    pub fn has_pending_paste(&self) -> bool {
        self.pending_paste.is_some()
    }

    /// Inserts the buffered paste bytes, normalising invalid UTF-8.
    pub fn confirm_paste(&mut self) {
        if let Some(text) = self.pending_paste.take() {
            self.insert(&text);
        }
    }

    /// Any non-paste key cancels a pending paste (spec §5 "Cancellation").
    pub fn cancel_paste(&mut self) {
        self.pending_paste = None;
    }

    /// Sets the cursor to a specific codepoint offset, clamping to the
    /// text's length (spec §6.1 `input_pos` property).
    pub fn set_cursor(&mut self, cp: usize) {
        self.cursor = cp.min(self.length());
    }

    /// Prepares the editor for submission (spec §4.C `return`): if input is
    /// empty and `get_empty` is off, this is a no-op and `None` is
    /// returned. Otherwise the current text is taken, the buffer cleared,
    /// undo history freed, and the (possibly multi-line-split) lines to
    /// submit are returned in order.
    pub fn take_for_submit(&mut self) -> Option<Vec<String>> {
        if self.text.is_empty() && !self.get_empty {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.clear_undo();
        self.pending_paste = None;
        if self.multiline {
            Some(vec![text])
        } else if text.contains('\n') {
            Some(text.split('\n').map(str::to_string).collect())
        } else {
            Some(vec![text])
        }
    }
}

/// One interactive edit command (spec §4.C). `Engine::input_dispatch` takes
/// one of these rather than a raw method call so it can snapshot
/// `(text, cursor)` before and after in one place and emit the matching
/// signal, instead of every call site doing its own before/after diff.
#[derive(Debug, Clone)]
pub enum InputOp {
    Insert(String),
    InsertBytes(Vec<u8>),
    ReplaceAll(String),
    DeletePrevChar,
    DeleteNextChar,
    DeletePrevWord,
    DeletePrevWordWhitespace,
    DeleteNextWord,
    DeleteToLineStart,
    DeleteToLineEnd,
    DeleteToInputStart,
    DeleteToInputEnd,
    DeleteLine,
    DeleteAll,
    TransposeChars,
    MoveBeginningOfLine,
    MoveEndOfLine,
    MoveBeginningOfInput,
    MoveEndOfInput,
    MovePrevChar,
    MoveNextChar,
    MovePrevWord,
    MoveNextWord,
    MovePrevLine,
    MoveNextLine,
    Paste,
    Undo,
    Redo,
    SetCursor(usize),
}

/// Applies one `InputOp` to `editor`. A free function, not a method, so a
/// caller holding `&mut editor` from one struct field and `&mut clipboard`
/// from another (as `Engine::input_dispatch` does) can pass both without
/// needing `InputEditor` itself to own a clipboard reference.
pub fn apply_input_op(editor: &mut InputEditor, clipboard: &mut Clipboard, op: InputOp) {
    match op {
        InputOp::Insert(s) => editor.insert(&s),
        InputOp::InsertBytes(b) => editor.insert_bytes(&b),
        InputOp::ReplaceAll(s) => editor.replace_all(&s),
        InputOp::DeletePrevChar => editor.delete_prev_char(),
        InputOp::DeleteNextChar => editor.delete_next_char(),
        InputOp::DeletePrevWord => editor.delete_prev_word(clipboard),
        InputOp::DeletePrevWordWhitespace => editor.delete_prev_word_whitespace(clipboard),
        InputOp::DeleteNextWord => editor.delete_next_word(clipboard),
        InputOp::DeleteToLineStart => editor.delete_to_line_start(clipboard),
        InputOp::DeleteToLineEnd => editor.delete_to_line_end(clipboard),
        InputOp::DeleteToInputStart => editor.delete_to_input_start(clipboard),
        InputOp::DeleteToInputEnd => editor.delete_to_input_end(clipboard),
        InputOp::DeleteLine => editor.delete_line(clipboard),
        InputOp::DeleteAll => editor.delete_all(),
        InputOp::TransposeChars => editor.transpose_chars(),
        InputOp::MoveBeginningOfLine => editor.move_beginning_of_line(),
        InputOp::MoveEndOfLine => editor.move_end_of_line(),
        InputOp::MoveBeginningOfInput => editor.move_beginning_of_input(),
        InputOp::MoveEndOfInput => editor.move_end_of_input(),
        InputOp::MovePrevChar => editor.move_prev_char(),
        InputOp::MoveNextChar => editor.move_next_char(),
        InputOp::MovePrevWord => editor.move_prev_word(),
        InputOp::MoveNextWord => editor.move_next_word(),
        InputOp::MovePrevLine => editor.move_prev_line(),
        InputOp::MoveNextLine => editor.move_next_line(),
        InputOp::Paste => editor.paste(clipboard),
        InputOp::Undo => {
            editor.undo();
        }
        InputOp::Redo => {
            editor.redo();
        }
        InputOp::SetCursor(cp) => editor.set_cursor(cp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_then_delete_round_trips() {
        let mut ed = InputEditor::new(10, 64);
        let s = "h\u{00e9}ll\u{1F600}o";
        ed.insert(s);
        assert_eq!(ed.text(), s);
        for _ in 0..codepoint_len(s) {
            ed.delete_prev_char();
        }
        assert_eq!(ed.text(), "");
        assert_eq!(ed.cursor(), 0);
    }

    #[test]
    fn undo_redo_scenario_from_spec() {
        let mut ed = InputEditor::new(10, 64);
        let mut clip = Clipboard::default();
        ed.insert("hel");
        ed.insert("lo");
        assert_eq!(ed.text(), "hello");
        ed.delete_prev_word(&mut clip);
        assert_eq!(ed.text(), "");
        assert_eq!(clip.get(), "hello");
        assert!(ed.undo());
        assert_eq!(ed.text(), "hello");
        assert_eq!(ed.cursor(), 5);
        assert!(ed.undo());
        assert_eq!(ed.text(), "hel");
        assert!(ed.redo());
        assert_eq!(ed.text(), "hello");
    }

    #[test]
    fn transpose_requires_two_chars() {
        let mut ed = InputEditor::new(10, 64);
        ed.insert("a");
        ed.transpose_chars();
        assert_eq!(ed.text(), "a");
        ed.insert("b");
        ed.transpose_chars();
        assert_eq!(ed.text(), "ba");
    }

    #[test]
    fn delete_on_empty_is_noop() {
        let mut ed = InputEditor::new(10, 64);
        ed.delete_prev_char();
        ed.delete_next_char();
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn size_matches_bytes_length_matches_codepoints() {
        let mut ed = InputEditor::new(10, 64);
        let s = "caf\u{00e9}";
        ed.insert(s);
        assert_eq!(ed.size(), s.len());
        assert_eq!(ed.length(), codepoint_len(s));
        assert!(ed.cursor() <= ed.length());
    }

    #[test]
    fn paste_burst_detection() {
        let mut ed = InputEditor::new(10, 8);
        let burst = vec![b'x'; 300];
        assert_eq!(ed.feed_paste_bytes(&burst), PasteOutcome::Pending);
        assert!(ed.has_pending_paste());
        assert_eq!(ed.text(), "");
        ed.confirm_paste();
        assert_eq!(ed.text().len(), 300);
    }

    #[test]
    fn submission_clears_and_splits_multiline_when_not_multiline_mode() {
        let mut ed = InputEditor::new(10, 64);
        ed.multiline = false;
        ed.insert("line one\nline two");
        let lines = ed.take_for_submit().unwrap();
        assert_eq!(lines, vec!["line one".to_string(), "line two".to_string()]);
        assert_eq!(ed.text(), "");
    }

    #[test]
    fn empty_submission_is_noop_unless_get_empty() {
        let mut ed = InputEditor::new(10, 64);
        assert!(ed.take_for_submit().is_none());
        ed.get_empty = true;
        assert_eq!(ed.take_for_submit(), Some(vec![String::new()]));
    }
}
