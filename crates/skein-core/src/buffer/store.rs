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

//! The buffer store (spec §4.E): creation, lookup, numbering, merge/zoom,
//! and the hide/visit/hotlist bookkeeping. Plays the role the teacher's
//! `BufferContainer`/`Documents` pair plays for editor instances, but
//! mutated directly on the main thread rather than behind an
//! `Arc<Mutex<_>>` — spec §5 mandates a single-threaded cooperative core
//! with no locks anywhere, so the synchronization wrapper is dropped while
//! the "one place that owns every buffer, addressed by a stable id" shape
//! is kept.

use std::collections::VecDeque;

use crate::arena::{Arena, Handle};
use crate::buffer::buffer::{Buffer, HotlistPriority};
use crate::buffer::property::{ActiveState, BufferFlags, BufferKind, HotlistOp, SetProperty, UnreadOp};
use crate::config::{BufferPosition, EngineConfig};
use crate::error::{EngineError, EngineResult};
use crate::signal::{Bus, Signal, SignalSink};

/// Buffer names reserved to the core itself; at most one buffer may carry
/// one of these (spec §3 invariants).
const RESERVED_NAMES: &[&str] = &["weechat", "secure", "color"];

/// Outcome of `apply_set` the caller needs to act on beyond what this store
/// can do alone. Only `display` needs this today — switching the window
/// showing a buffer is the window tree's job, which this store doesn't
/// own (spec §6.1 `set` table, `display` property).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetEffect {
    None,
    SwitchToBuffer,
}

pub struct BufferStore<S: SignalSink> {
    arena: Arena<Buffer>,
    /// Handles in display order: sorted by `number` non-decreasing, with
    /// every peer of a merged group occupying a contiguous run (spec §3
    /// invariant "Buffer list is sorted by number non-decreasing").
    order: Vec<Handle<Buffer>>,
    last_assigned_id: u64,
    visited: VecDeque<Handle<Buffer>>,
    pub config: EngineConfig,
    pub signals: Bus<S>,
}

impl<S: SignalSink> BufferStore<S> {
    pub fn new(config: EngineConfig, sink: S) -> Self {
        Self {
            arena: Arena::new(),
            order: Vec::new(),
            last_assigned_id: 0,
            visited: VecDeque::new(),
            config,
            signals: Bus::new(sink),
        }
    }

    /// `max(last_assigned + 1, now_microseconds)` (spec §4.E "Identity &
    /// indexing"), guaranteeing strict monotonicity even if the wall clock
    /// runs backward or two calls land in the same microsecond.
    pub fn generate_id(&mut self, now_us: u64) -> u64 {
        let candidate = (self.last_assigned_id + 1).max(now_us);
        self.last_assigned_id = candidate;
        candidate
    }

    pub fn get(&self, h: Handle<Buffer>) -> Option<&Buffer> {
        self.arena.get(h)
    }

    pub fn get_mut(&mut self, h: Handle<Buffer>) -> Option<&mut Buffer> {
        self.arena.get_mut(h)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Handles in list order (spec invariant: numbers non-decreasing).
    pub fn order(&self) -> &[Handle<Buffer>] {
        &self.order
    }

    fn find_order_index(&self, h: Handle<Buffer>) -> Option<usize> {
        self.order.iter().position(|&x| x == h)
    }

    fn reserved_name_taken(&self, name: &str) -> bool {
        RESERVED_NAMES.contains(&name)
            && self.order.iter().any(|&h| self.arena.get(h).map(|b| b.name.as_str()) == Some(name))
    }

    /// Creates a buffer (spec §6.1 `new`). Validates the reserved-name and
    /// `MAX_BUFFERS` invariants before doing anything observable, so a
    /// failure never mutates the list (spec §8 boundary case).
    pub fn create(
        &mut self,
        plugin_owner: &str,
        name: &str,
        kind: BufferKind,
        now_us: u64,
    ) -> EngineResult<Handle<Buffer>> {
        if name.is_empty() {
            return Err(EngineError::Validation("buffer name must not be empty".into()));
        }
        if self.reserved_name_taken(name) {
            return Err(EngineError::Validation(format!("reserved buffer name already open: {name}")));
        }
        let full_name = format!("{plugin_owner}.{name}");
        if self.order.iter().any(|&h| self.arena.get(h).map(|b| b.full_name.as_str()) == Some(full_name.as_str())) {
            return Err(EngineError::Validation(format!("buffer already exists: {full_name}")));
        }
        if self.order.len() >= self.config.max_buffers {
            return Err(EngineError::ResourceLimit("buffer count ceiling reached"));
        }

        let id = self.generate_id(now_us);
        let mut buffer = Buffer::new(id, plugin_owner, name, kind, &self.config);
        buffer.flags.insert(BufferFlags::OPENING);
        let number = self.next_number();
        buffer.number = number;
        let handle = self.arena.insert(buffer);
        let insert_at = self.order.iter().position(|&h| self.arena.get(h).map(|b| b.number) > Some(number)).unwrap_or(self.order.len());
        self.order.insert(insert_at, handle);

        // Buffers only stop suppressing their own signals once fully
        // initialised (spec §4.E "Signals": "a buffer still opening
        // suppresses signals until fully initialised").
        if let Some(b) = self.arena.get_mut(handle) {
            b.flags.remove(BufferFlags::OPENING);
        }
        self.signals.emit(Signal::BufferOpened(handle));
        Ok(handle)
    }

    fn next_number(&self) -> i64 {
        match self.config.position {
            BufferPosition::End => self.order.last().and_then(|&h| self.arena.get(h)).map(|b| b.number + 1).unwrap_or(1),
            BufferPosition::FirstGap => {
                let mut used: Vec<i64> = self.order.iter().filter_map(|&h| self.arena.get(h)).map(|b| b.number).collect();
                used.sort_unstable();
                used.dedup();
                let mut candidate = 1;
                for n in used {
                    if n == candidate {
                        candidate += 1;
                    } else if n > candidate {
                        break;
                    }
                }
                candidate
            }
        }
    }

    /// Closes a buffer: runs its close callback, emits `buffer_closing`,
    /// detaches it from any merged group, frees its lines, emits
    /// `buffer_closed`, and removes it from the list. Choosing a
    /// replacement buffer for windows that were showing it is the window
    /// tree's job, not the store's (spec §3 "Lifecycle"); callers needing
    /// that coordination should read `order()` before calling `close`.
    pub fn close(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        if !self.arena.is_valid(h) {
            return Err(EngineError::NotFound("buffer".into()));
        }
        if let Some(b) = self.arena.get_mut(h) {
            b.flags.insert(BufferFlags::CLOSING);
            if let Some(mut cb) = b.close_callback.take() {
                cb.on_close(b.id);
            }
        }
        self.signals.emit(Signal::BufferClosing(h));

        let run = self.merged_run(h);
        if run.len() > 1 {
            self.detach_from_group(h, &run)?;
        }

        if let Some(idx) = self.find_order_index(h) {
            self.order.remove(idx);
        }
        self.visited.retain(|&x| x != h);
        self.arena.remove(h);
        self.signals.emit(Signal::BufferClosed(h));
        Ok(())
    }

    /// The contiguous run of handles sharing `h`'s current number (spec §3
    /// invariant: merged peers occupy a contiguous run).
    fn merged_run(&self, h: Handle<Buffer>) -> Vec<Handle<Buffer>> {
        let Some(number) = self.arena.get(h).map(|b| b.number) else { return Vec::new() };
        self.order
            .iter()
            .copied()
            .filter(|&x| self.arena.get(x).map(|b| b.number) == Some(number))
            .collect()
    }

    // ---- search ------------------------------------------------------

    pub fn search_by_id(&self, id: u64) -> Option<Handle<Buffer>> {
        self.order.iter().copied().find(|&h| self.arena.get(h).map(|b| b.id) == Some(id))
    }

    pub fn search_by_full_name(&self, full_name: &str) -> Option<Handle<Buffer>> {
        let (ci, pattern) = strip_case_insensitive(full_name);
        self.order.iter().copied().find(|&h| {
            self.arena.get(h).map(|b| names_equal(&b.full_name, pattern, ci)).unwrap_or(false)
        })
    }

    /// `search(plugin, name)` (spec §4.E "Identity & indexing"):
    /// `plugin == "=="` does a full-name lookup, `plugin == "==id"` an id
    /// lookup, otherwise a ranked partial-name search scoped to `plugin`
    /// (empty `plugin` searches every buffer). `current` breaks ties
    /// round-robin from the currently focused buffer, as in the original.
    pub fn search(&self, plugin: &str, name: &str, current: Option<Handle<Buffer>>) -> Option<Handle<Buffer>> {
        if plugin == "==" {
            return self.search_by_full_name(name);
        }
        if plugin == "==id" {
            let (_, pattern) = strip_case_insensitive(name);
            return pattern.parse::<u64>().ok().and_then(|id| self.search_by_id(id));
        }
        self.search_by_partial_name(plugin, name, current)
    }

    /// Ranks candidates exact > prefix > suffix > substring (spec §4.E).
    pub fn search_by_partial_name(&self, plugin: &str, name: &str, current: Option<Handle<Buffer>>) -> Option<Handle<Buffer>> {
        let (ci, pattern) = strip_case_insensitive(name);
        let candidates: Vec<Handle<Buffer>> = self
            .order
            .iter()
            .copied()
            .filter(|&h| {
                let Some(b) = self.arena.get(h) else { return false };
                plugin.is_empty() || b.plugin_owner == plugin
            })
            .collect();

        let mut best_rank = 4usize;
        let mut best: Vec<Handle<Buffer>> = Vec::new();
        for h in candidates {
            let Some(b) = self.arena.get(h) else { continue };
            let rank = match () {
                _ if names_equal(&b.name, pattern, ci) => 0,
                _ if starts_with(&b.name, pattern, ci) => 1,
                _ if ends_with(&b.name, pattern, ci) => 2,
                _ if contains(&b.name, pattern, ci) => 3,
                _ => continue,
            };
            match rank.cmp(&best_rank) {
                std::cmp::Ordering::Less => {
                    best_rank = rank;
                    best = vec![h];
                }
                std::cmp::Ordering::Equal => best.push(h),
                std::cmp::Ordering::Greater => {}
            }
        }
        if best.is_empty() {
            return None;
        }
        if let Some(cur) = current {
            if let Some(pos) = best.iter().position(|&h| h == cur) {
                return Some(best[(pos + 1) % best.len()]);
            }
        }
        Some(best[0])
    }

    // ---- numbering -----------------------------------------------------

    /// `to_number(n)` (spec §4.E "Numbering policy"): detaches `h`'s whole
    /// merged run and re-inserts it at number `target`, shifting whatever
    /// was there to make room.
    pub fn to_number(&mut self, h: Handle<Buffer>, target: i64) -> EngineResult<()> {
        if target < 1 {
            return Err(EngineError::Validation("move target out of bounds".into()));
        }
        let run = self.merged_run(h);
        if run.is_empty() {
            return Err(EngineError::NotFound("buffer".into()));
        }
        let old_number = self.arena.get(h).map(|b| b.number).unwrap();
        self.order.retain(|x| !run.contains(x));
        if self.config.auto_renumber {
            self.close_gap_if_vacated(old_number);
        }

        if self.order.iter().any(|&x| self.arena.get(x).map(|b| b.number) == Some(target)) {
            self.shift_up_from(target, run.len() as i64);
        }
        for &member in &run {
            if let Some(b) = self.arena.get_mut(member) {
                b.number = target;
            }
        }
        let insert_at = self.order.iter().position(|&x| self.arena.get(x).map(|b| b.number) > Some(target)).unwrap_or(self.order.len());
        for (offset, member) in run.iter().enumerate() {
            self.order.insert(insert_at + offset, *member);
        }
        self.signals.emit(Signal::BufferMoved(run[0]));
        Ok(())
    }

    /// If removing a run left `old_number` with no occupant at all, pulls
    /// every higher number down by one to close that hole. A no-op if
    /// another peer still holds `old_number` (nothing was actually
    /// vacated), which is the common case when detaching one buffer out
    /// of a merged group of three or more.
    fn close_gap_if_vacated(&mut self, old_number: i64) {
        let still_occupied = self.order.iter().any(|&h| self.arena.get(h).map(|b| b.number) == Some(old_number));
        if still_occupied {
            return;
        }
        for &h in &self.order {
            if let Some(b) = self.arena.get_mut(h) {
                if b.number > old_number {
                    b.number -= 1;
                }
            }
        }
    }

    fn shift_up_from(&mut self, start: i64, by: i64) {
        let mut numbers: Vec<i64> = self.order.iter().filter_map(|&h| self.arena.get(h)).map(|b| b.number).collect();
        numbers.sort_unstable();
        numbers.dedup();
        for &n in numbers.iter().rev() {
            if n >= start {
                for &h in &self.order {
                    if let Some(b) = self.arena.get_mut(h) {
                        if b.number == n {
                            b.number += by;
                        }
                    }
                }
            }
        }
        self.order.sort_by_key(|&h| self.arena.get(h).map(|b| b.number).unwrap_or(i64::MAX));
    }

    /// Exchanges two complete merged runs and their numbers, preserving
    /// adjacency (spec §4.E "Swap"). Emits one `buffer_moved` per run.
    pub fn swap(&mut self, n1: i64, n2: i64) -> EngineResult<()> {
        let run1 = self.run_at_number(n1);
        let run2 = self.run_at_number(n2);
        if run1.is_empty() || run2.is_empty() {
            return Err(EngineError::NotFound("buffer number".into()));
        }
        for &h in &run1 {
            if let Some(b) = self.arena.get_mut(h) {
                b.number = n2;
            }
        }
        for &h in &run2 {
            if let Some(b) = self.arena.get_mut(h) {
                b.number = n1;
            }
        }
        self.order.sort_by_key(|&h| self.arena.get(h).map(|b| b.number).unwrap_or(i64::MAX));
        self.signals.emit(Signal::BufferMoved(run1[0]));
        self.signals.emit(Signal::BufferMoved(run2[0]));
        Ok(())
    }

    fn run_at_number(&self, n: i64) -> Vec<Handle<Buffer>> {
        self.order.iter().copied().filter(|&h| self.arena.get(h).map(|b| b.number) == Some(n)).collect()
    }

    /// Relabels the contiguous number range `[from, to]` starting at
    /// `start`, preserving merged groupings (spec §4.E "Renumber").
    pub fn renumber(&mut self, from: i64, to: i64, start: i64) -> EngineResult<()> {
        if from > to {
            return Err(EngineError::Validation("renumber range is empty".into()));
        }
        let mut numbers: Vec<i64> = self
            .order
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .map(|b| b.number)
            .filter(|&n| n >= from && n <= to)
            .collect();
        numbers.sort_unstable();
        numbers.dedup();
        for (rank, &old_number) in numbers.iter().enumerate() {
            let new_number = start + rank as i64;
            if new_number == old_number {
                continue;
            }
            let run = self.run_at_number(old_number);
            for &h in &run {
                if let Some(b) = self.arena.get_mut(h) {
                    b.number = new_number;
                }
            }
            if let Some(&first) = run.first() {
                self.signals.emit(Signal::BufferMoved(first));
            }
        }
        self.order.sort_by_key(|&h| self.arena.get(h).map(|b| b.number).unwrap_or(i64::MAX));
        Ok(())
    }

    // ---- merge / unmerge / zoom ------------------------------------

    pub fn merge(&mut self, a: Handle<Buffer>, b: Handle<Buffer>) -> EngineResult<()> {
        if a == b {
            return Err(EngineError::Validation("cannot merge a buffer with itself".into()));
        }
        if self.order.len() < 2 {
            return Err(EngineError::Validation("need at least two buffers to merge".into()));
        }
        let (kind_a, num_a) = self.arena.get(a).map(|x| (x.kind, x.number)).ok_or(EngineError::NotFound("buffer".into()))?;
        let (kind_b, num_b) = self.arena.get(b).map(|x| (x.kind, x.number)).ok_or(EngineError::NotFound("buffer".into()))?;
        if kind_a != BufferKind::Formatted || kind_b != BufferKind::Formatted {
            return Err(EngineError::Validation("only formatted buffers can merge".into()));
        }
        if num_a == num_b {
            return Err(EngineError::Validation("buffers are already merged".into()));
        }

        let run_a = self.merged_run(a);
        self.order.retain(|x| !run_a.contains(x));
        let insert_at = self.order.iter().rposition(|&x| self.arena.get(x).map(|buf| buf.number) == Some(num_b)).map(|i| i + 1).unwrap_or(self.order.len());
        for (offset, member) in run_a.iter().enumerate() {
            self.order.insert(insert_at + offset, *member);
        }
        for &member in &run_a {
            if let Some(buf) = self.arena.get_mut(member) {
                buf.number = num_b;
                buf.active = ActiveState::Hidden;
            }
        }
        for &member in self.run_at_number(num_b).iter() {
            if let Some(buf) = self.arena.get_mut(member) {
                buf.active = ActiveState::Hidden;
            }
        }
        if let Some(buf) = self.arena.get_mut(a) {
            buf.active = ActiveState::Shown;
        }
        self.signals.emit(Signal::BufferMerged(a));
        Ok(())
    }

    /// Unmerges `b` from its group, moving it to number `n` (default
    /// `b.number + 1`). If two peers remain, both simply revert to their
    /// own lines (the mixed view is produced on demand, so there is
    /// nothing else to free).
    pub fn unmerge(&mut self, b: Handle<Buffer>, n: Option<i64>) -> EngineResult<()> {
        let run = self.merged_run(b);
        if run.len() < 2 {
            return Err(EngineError::Validation("unmerge on a non-merged buffer".into()));
        }
        self.detach_from_group(b, &run)?;
        let old_number = self.arena.get(b).map(|buf| buf.number).unwrap();
        let target = n.unwrap_or(old_number + 1);

        if let Some(idx) = self.find_order_index(b) {
            self.order.remove(idx);
        }
        // Unlike `to_number`, a single-member detach out of a group never
        // vacates `old_number` outright (its remaining peers still hold
        // it), so there is no gap to close here — only the target-slot
        // collision, if any, needs shifting.
        if self.order.iter().any(|&x| self.arena.get(x).map(|buf| buf.number) == Some(target)) {
            self.shift_up_from(target, 1);
        }
        if let Some(buf) = self.arena.get_mut(b) {
            buf.number = target;
            buf.active = ActiveState::Shown;
        }
        let insert_at = self.order.iter().position(|&x| self.arena.get(x).map(|buf| buf.number) > Some(target)).unwrap_or(self.order.len());
        self.order.insert(insert_at, b);

        self.signals.emit(Signal::BufferUnmerged(b));
        Ok(())
    }

    /// Removes `member` from a merged `run`, promoting a new active peer
    /// if `member` was the shown one (spec §4.E "Unmerge").
    fn detach_from_group(&mut self, member: Handle<Buffer>, run: &[Handle<Buffer>]) -> EngineResult<()> {
        let was_active = self.arena.get(member).map(|b| b.active) == Some(ActiveState::Shown)
            || self.arena.get(member).map(|b| b.active) == Some(ActiveState::ZoomedSolo);
        if was_active {
            if let Some(&next) = run.iter().find(|&&h| h != member) {
                if let Some(buf) = self.arena.get_mut(next) {
                    buf.active = ActiveState::Shown;
                }
            }
        }
        Ok(())
    }

    /// Toggles `active` between "shown" (mixed view) and "zoomed solo" for
    /// a merged buffer; a no-op outside a merged group (spec §8 boundary
    /// case).
    pub fn zoom(&mut self, b: Handle<Buffer>) -> EngineResult<()> {
        let run = self.merged_run(b);
        if run.len() < 2 {
            return Ok(());
        }
        let currently_zoomed = self.arena.get(b).map(|buf| buf.active) == Some(ActiveState::ZoomedSolo);
        if currently_zoomed {
            for &h in &run {
                if let Some(buf) = self.arena.get_mut(h) {
                    buf.flags.remove(BufferFlags::ZOOMED);
                    buf.active = if h == b { ActiveState::Shown } else { ActiveState::Hidden };
                }
            }
            self.signals.emit(Signal::BufferUnzoomed(b));
        } else {
            for &h in &run {
                if let Some(buf) = self.arena.get_mut(h) {
                    buf.flags.insert(BufferFlags::ZOOMED);
                    buf.active = if h == b { ActiveState::ZoomedSolo } else { ActiveState::Hidden };
                }
            }
            self.signals.emit(Signal::BufferZoomed(b));
        }
        Ok(())
    }

    // ---- property set/apply -------------------------------------------

    /// Applies a parsed `SetProperty` to `h`, mutating the buffer and
    /// emitting the signal the change corresponds to (spec §6.1 `set`,
    /// §4.E "Properties"). `parse_set` turns the wire-format string pair
    /// into the enum; this is the other half a plugin-facing `set` command
    /// actually needs.
    pub fn apply_set(&mut self, h: Handle<Buffer>, prop: SetProperty) -> EngineResult<SetEffect> {
        match &prop {
            SetProperty::Number(n) => {
                self.to_number(h, *n)?;
                return Ok(SetEffect::None);
            }
            SetProperty::Hidden(true) => {
                self.hide(h)?;
                return Ok(SetEffect::None);
            }
            SetProperty::Hidden(false) => {
                self.unhide(h)?;
                return Ok(SetEffect::None);
            }
            SetProperty::Display(_) => return Ok(SetEffect::SwitchToBuffer),
            _ => {}
        }

        let buf = self.arena.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        let mut signal: Option<Signal> = None;
        match prop {
            SetProperty::Hotlist(op) => apply_hotlist_op(buf, op),
            SetProperty::Unread(op) => apply_unread_op(buf, op),
            SetProperty::PrintHooksEnabled(v) => buf.flags.set(BufferFlags::PRINT_HOOKS_ENABLED, v),
            SetProperty::DayChange(v) => buf.flags.set(BufferFlags::DAY_CHANGE_ENABLED, v),
            SetProperty::Clear(true) => {
                buf.lines.clear();
                signal = Some(Signal::BufferCleared(h));
            }
            SetProperty::Clear(false) => {}
            SetProperty::Filter(v) => buf.flags.set(BufferFlags::FILTER_ENABLED, v),
            SetProperty::Name(name) => {
                buf.name = name;
                buf.rebuild_full_name();
                signal = Some(Signal::BufferRenamed(h));
            }
            SetProperty::ShortName(short_name) => {
                buf.short_name = short_name;
                signal = Some(Signal::BufferRenamed(h));
            }
            SetProperty::Kind(kind) => {
                buf.kind = kind;
                signal = Some(Signal::BufferTypeChanged(h));
            }
            SetProperty::Notify(n) => buf.notify_level = n,
            SetProperty::Title(title) => {
                buf.title = title;
                signal = Some(Signal::BufferTitleChanged(h));
            }
            SetProperty::Modes(modes) => {
                buf.modes = modes;
                signal = Some(Signal::BufferModesChanged(h));
            }
            SetProperty::TimeForEachLine(v) => buf.flags.set(BufferFlags::TIME_FOR_EACH_LINE, v),
            SetProperty::HighlightWords(s) => buf.highlight.words = comma_list(&s),
            SetProperty::HighlightWordsAdd(s) => buf.highlight.words.extend(comma_list(&s)),
            SetProperty::HighlightWordsDel(s) => {
                let remove = comma_list(&s);
                buf.highlight.words.retain(|w| !remove.contains(w));
            }
            SetProperty::HighlightRegex(pattern) => {
                buf.highlight.regex = Some(regex::Regex::new(&pattern)?);
                buf.highlight.regex_source = Some(pattern);
            }
            SetProperty::HighlightDisableRegex(pattern) => {
                buf.highlight.exclude_regex = Some(regex::Regex::new(&pattern)?);
                buf.highlight.exclude_regex_source = Some(pattern);
            }
            SetProperty::HighlightTagsRestrict(s) => buf.highlight.tags_restrict = comma_list(&s),
            SetProperty::HighlightTags(s) => buf.highlight.tags_include = comma_list(&s),
            SetProperty::HotlistMaxLevelNicks(s) => buf.hotlist_max_level_nicks = comma_list(&s),
            SetProperty::InputPrompt(prompt) => {
                if buf.input.prompt != prompt {
                    buf.input.prompt = prompt;
                    signal = Some(Signal::InputPromptChanged(h));
                }
            }
            SetProperty::Input(text) => {
                buf.input.replace_all(&text);
                signal = Some(Signal::InputTextChanged(h));
            }
            SetProperty::InputPos(pos) => {
                buf.input.set_cursor(pos);
                signal = Some(Signal::InputTextCursorMoved(h));
            }
            SetProperty::InputGetAnyUserData(v) => buf.input_get_any_user_data = v,
            SetProperty::InputGetUnknownCommands(v) => buf.input_get_unknown_commands = v,
            SetProperty::InputGetEmpty(v) => buf.input.get_empty = v,
            SetProperty::InputMultiline(v) => buf.input.multiline = v,
            // No keymap table lives in this crate; accepted so `set` never
            // rejects a key-bind property, left for the embedder to honor.
            SetProperty::KeyBind(_, _) | SetProperty::KeyUnbind(_) => {}
            SetProperty::LocalvarSet(key, value) => {
                let existed = buf.local_vars.insert(key.clone(), value).is_some();
                signal = Some(if existed {
                    Signal::BufferLocalvarChanged(h, key)
                } else {
                    Signal::BufferLocalvarAdded(h, key)
                });
            }
            SetProperty::LocalvarDel(key) => {
                if buf.local_vars.remove(&key).is_some() {
                    signal = Some(Signal::BufferLocalvarRemoved(h, key));
                }
            }
            SetProperty::Unknown(_) => {}
            SetProperty::Number(_) | SetProperty::Hidden(_) | SetProperty::Display(_) => {
                unreachable!("handled above before the buffer borrow")
            }
        }
        if let Some(sig) = signal {
            self.signals.emit(sig);
        }
        Ok(SetEffect::None)
    }

    // ---- hide / visit / hotlist --------------------------------------

    pub fn hide(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        self.arena.get_mut(h).ok_or(EngineError::NotFound("buffer".into()))?.flags.insert(BufferFlags::HIDDEN);
        self.signals.emit(Signal::BufferHidden(h));
        Ok(())
    }

    pub fn unhide(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        self.arena.get_mut(h).ok_or(EngineError::NotFound("buffer".into()))?.flags.remove(BufferFlags::HIDDEN);
        self.signals.emit(Signal::BufferUnhidden(h));
        Ok(())
    }

    /// Appends `h` to the capped "jump previous/next visited" ring,
    /// deduplicating an existing entry by moving it to the front (spec
    /// §4.E "Hide, visit, hotlist").
    pub fn visited_add(&mut self, h: Handle<Buffer>) {
        self.visited.retain(|&x| x != h);
        self.visited.push_front(h);
        while self.visited.len() > self.config.visited_capacity {
            self.visited.pop_back();
        }
    }

    pub fn visited(&self) -> impl Iterator<Item = Handle<Buffer>> + '_ {
        self.visited.iter().copied()
    }

    /// Raises `h`'s hotlist priority, idempotent within one "session" for
    /// activity no newer than the last time it was cleared (spec §4.E).
    pub fn hotlist_add(&mut self, h: Handle<Buffer>, priority: HotlistPriority, now_us: i64) {
        if let Some(b) = self.arena.get_mut(h) {
            if b.hotlist_removed_at.map(|t| now_us <= t).unwrap_or(false) {
                return;
            }
            b.hotlist_priority = Some(b.hotlist_priority.map(|p| p.max(priority)).unwrap_or(priority));
        }
    }

    /// Clears `h`'s hotlist entry on switching to it, remembering the time
    /// so the same burst of activity doesn't immediately re-hotlist it.
    pub fn hotlist_clear_on_switch(&mut self, h: Handle<Buffer>, now_us: i64) {
        if let Some(b) = self.arena.get_mut(h) {
            b.hotlist_priority = None;
            b.hotlist_removed_at = Some(now_us);
        }
    }

    /// The mixed, chronologically ordered view of a merged group's lines
    /// (spec §3 "lines"): computed on demand from each peer's own list
    /// rather than cached (Design Notes: "no cross-ownership").
    pub fn mixed_lines(&self, any_member: Handle<Buffer>) -> Vec<&crate::buffer::line::Line> {
        let run = self.merged_run(any_member);
        let mut all: Vec<&crate::buffer::line::Line> = run
            .iter()
            .filter_map(|&h| self.arena.get(h))
            .flat_map(|b| b.lines.iter())
            .collect();
        all.sort_by_key(|l| (l.timestamp, l.timestamp_us, l.id_within_buffer));
        all
    }
}

fn comma_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_string).collect()
}

fn apply_hotlist_op(buf: &mut Buffer, op: HotlistOp) {
    buf.hotlist_priority = match op {
        HotlistOp::Plus => Some(match buf.hotlist_priority {
            None => HotlistPriority::Low,
            Some(HotlistPriority::Low) => HotlistPriority::Message,
            Some(HotlistPriority::Message) => HotlistPriority::Private,
            Some(HotlistPriority::Private) | Some(HotlistPriority::Highlight) => HotlistPriority::Highlight,
        }),
        HotlistOp::Minus => None,
        HotlistOp::Set(n) => match n {
            0 => Some(HotlistPriority::Low),
            1 => Some(HotlistPriority::Message),
            2 => Some(HotlistPriority::Private),
            3 => Some(HotlistPriority::Highlight),
            _ => None,
        },
    };
}

/// Moves the read marker by `op`, addressing lines by position in the
/// buffer's current line list rather than by id (ids aren't necessarily
/// contiguous once a buffer has been cleared).
fn apply_unread_op(buf: &mut Buffer, op: UnreadOp) {
    let ids: Vec<u64> = buf.lines.iter().map(|l| l.id_within_buffer).collect();
    if ids.is_empty() {
        return;
    }
    let last = ids.len() as i64 - 1;
    let cur_pos = buf.lines.last_read.and_then(|id| ids.iter().position(|&x| x == id));
    let new_pos = match op {
        UnreadOp::MarkAll => Some(last),
        UnreadOp::Clear => None,
        UnreadOp::Plus(n) => cur_pos.map(|p| (p as i64 + n).clamp(0, last)),
        UnreadOp::Minus(n) => cur_pos.map(|p| (p as i64 - n).clamp(0, last)),
        UnreadOp::Set(n) => Some(n.clamp(0, last)),
    };
    buf.lines.last_read = new_pos.map(|p| ids[p as usize]);
}

fn strip_case_insensitive(pattern: &str) -> (bool, &str) {
    match pattern.strip_prefix("(?i)") {
        Some(rest) => (true, rest),
        None => (false, pattern),
    }
}

fn names_equal(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

fn starts_with(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.to_lowercase().starts_with(&b.to_lowercase())
    } else {
        a.starts_with(b)
    }
}

fn ends_with(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.to_lowercase().ends_with(&b.to_lowercase())
    } else {
        a.ends_with(b)
    }
}

fn contains(a: &str, b: &str, ci: bool) -> bool {
    if ci {
        a.to_lowercase().contains(&b.to_lowercase())
    } else {
        a.contains(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signal::RecordingSink;

    fn store() -> BufferStore<RecordingSink> {
        BufferStore::new(EngineConfig::default(), RecordingSink::default())
    }

    #[test]
    fn generate_id_is_strictly_monotonic() {
        let mut s = store();
        let a = s.generate_id(1000);
        let b = s.generate_id(500);
        assert!(b > a, "a lower wall-clock reading must not produce a smaller id");
    }

    #[test]
    fn create_assigns_sequential_numbers() {
        let mut s = store();
        let a = s.create("p", "a", BufferKind::Formatted, 1).unwrap();
        let b = s.create("p", "b", BufferKind::Formatted, 2).unwrap();
        assert_eq!(s.get(a).unwrap().number, 1);
        assert_eq!(s.get(b).unwrap().number, 2);
    }

    #[test]
    fn duplicate_full_name_rejected() {
        let mut s = store();
        s.create("p", "a", BufferKind::Formatted, 1).unwrap();
        let err = s.create("p", "a", BufferKind::Formatted, 2);
        assert!(err.is_err());
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn resource_limit_blocks_creation_without_mutation() {
        let mut config = EngineConfig::default();
        config.max_buffers = 1;
        let mut s = BufferStore::new(config, RecordingSink::default());
        s.create("p", "a", BufferKind::Formatted, 1).unwrap();
        let err = s.create("p", "b", BufferKind::Formatted, 2);
        assert!(matches!(err, Err(EngineError::ResourceLimit(_))));
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn merge_zoom_unmerge_cycle_from_spec_scenario() {
        let mut s = store();
        let a = s.create("p", "a", BufferKind::Formatted, 1).unwrap();
        let b = s.create("p", "b", BufferKind::Formatted, 2).unwrap();
        let c = s.create("p", "c", BufferKind::Formatted, 3).unwrap();
        assert_eq!((s.get(a).unwrap().number, s.get(b).unwrap().number, s.get(c).unwrap().number), (1, 2, 3));

        s.merge(a, b).unwrap();
        assert_eq!(s.get(a).unwrap().number, s.get(b).unwrap().number);
        assert_eq!(s.get(c).unwrap().number, 3, "merge leaves c's number untouched, per spec scenario 1");

        s.zoom(a).unwrap();
        assert_eq!(s.get(a).unwrap().active, ActiveState::ZoomedSolo);
        assert_eq!(s.get(b).unwrap().active, ActiveState::Hidden);

        s.zoom(a).unwrap();
        assert_eq!(s.get(a).unwrap().active, ActiveState::Shown);

        s.unmerge(a, None).unwrap();
        assert_eq!(s.get(b).unwrap().number, 2);
        assert_eq!(s.get(a).unwrap().number, 3, "unmerge's default target is the old shared number + 1");
        assert_eq!(s.get(c).unwrap().number, 4, "c is bumped out of the way of a's default unmerge target");
    }

    #[test]
    fn zoom_on_non_merged_buffer_is_noop() {
        let mut s = store();
        let a = s.create("p", "a", BufferKind::Formatted, 1).unwrap();
        s.zoom(a).unwrap();
        assert_eq!(s.get(a).unwrap().active, ActiveState::Shown);
    }

    #[test]
    fn partial_name_ranking_prefers_exact_then_prefix() {
        let mut s = store();
        let exact = s.create("p", "abc", BufferKind::Formatted, 1).unwrap();
        s.create("p", "abcdef", BufferKind::Formatted, 2).unwrap();
        let found = s.search("p", "abc", None);
        assert_eq!(found, Some(exact));
    }

    #[test]
    fn reserved_name_single_instance() {
        let mut s = store();
        s.create("core", "weechat", BufferKind::Formatted, 1).unwrap();
        let err = s.create("core", "weechat", BufferKind::Formatted, 2);
        assert!(err.is_err());
    }
}
