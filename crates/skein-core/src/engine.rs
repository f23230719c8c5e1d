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

//! `Engine`: the single value a host process owns (spec §5 "Ownership
//! model"). Every other module in this crate is a component Engine wires
//! together; plugins never reach `BufferStore`/`WindowTree`/`HookRegistry`
//! directly, only through the methods here.

use crate::arena::Handle;
use crate::buffer::buffer::HotlistPriority;
use crate::buffer::property::{BufferKind, SetProperty};
use crate::buffer::{Buffer, BufferStore, SetEffect};
use crate::config::EngineConfig;
use crate::dirty::RefreshLevel;
use crate::error::{EngineError, EngineResult, HookResult};
use crate::hdata::HdataRegistry;
use crate::history::HistoryRing;
use crate::hooks::HookRegistry;
use crate::input::{apply_input_op, Clipboard, InputOp, PasteOutcome};
use crate::mainloop::{poll_timeout_ms, AsyncFlag, TickReport};
use crate::search::{find_match, Candidate, Direction};
use crate::signal::{RecordingSink, Signal};
use crate::window::{fill_coords, get_context_at, parse_relative_scroll, Context, Rect, Window, WindowTree};

/// The default signal sink: records into `Bus`, which `HookRegistry`'s
/// `signal` hooks drain every tick (spec §4.E "Signals", §4.H step 8).
/// Swappable in tests for a sink that asserts on exact signal sequences.
pub type EngineSink = RecordingSink;

pub struct Engine {
    pub buffers: BufferStore<EngineSink>,
    pub windows: WindowTree<EngineSink>,
    pub hooks: HookRegistry,
    pub hdata: HdataRegistry,
    pub clipboard: Clipboard,
    pub global_history: HistoryRing,
    pub config: EngineConfig,
    /// Raised by a real POSIX handler outside the cooperative loop;
    /// consumed once per `tick` (spec §4.H step 3 "SIGWINCH handling",
    /// step 6 "post-refresh SIGWINCH signal").
    pub sigwinch: AsyncFlag,
    pub sigint: AsyncFlag,
    quit: bool,
}

impl Engine {
    /// Builds an engine with one buffer (`core.weechat`, per spec §3 "one
    /// reserved buffer always exists") and one window showing it, filling
    /// `initial_rect`.
    pub fn new(config: EngineConfig, initial_rect: Rect, now_us: u64) -> EngineResult<Self> {
        let mut buffers = BufferStore::new(config.clone(), EngineSink::default());
        let core_buffer = buffers.create("core", "weechat", BufferKind::Formatted, now_us)?;
        let windows = WindowTree::new(initial_rect, core_buffer, EngineSink::default());
        Ok(Engine {
            buffers,
            windows,
            hooks: HookRegistry::new(),
            hdata: HdataRegistry::new(),
            clipboard: Clipboard::default(),
            global_history: HistoryRing::new(config.global_history_capacity),
            config,
            sigwinch: AsyncFlag::new(),
            sigint: AsyncFlag::new(),
            quit: false,
        })
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    // ---- buffer API (spec §6.1) --------------------------------------

    pub fn buffer_new(&mut self, plugin_owner: &str, name: &str, kind: BufferKind, now_us: u64) -> EngineResult<Handle<Buffer>> {
        self.buffers.create(plugin_owner, name, kind, now_us)
    }

    /// Closes a buffer, then repoints any window still showing it at the
    /// next surviving buffer in list order, falling back to `weechat`
    /// (spec §3 "Lifecycle": choosing a replacement is the window tree's
    /// job, not the store's).
    pub fn buffer_close(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        let replacement = self.pick_replacement_buffer(h)?;
        self.buffers.close(h)?;
        let affected: Vec<Handle<Window>> =
            self.windows.order().iter().copied().filter(|&w| self.windows.get(w).map(|win| win.buffer) == Some(h)).collect();
        for w in affected {
            if let Some(win) = self.windows.get_mut(w) {
                win.switch_buffer(replacement);
            }
        }
        Ok(())
    }

    fn pick_replacement_buffer(&self, closing: Handle<Buffer>) -> EngineResult<Handle<Buffer>> {
        if let Some(pos) = self.buffers.order().iter().position(|&h| h == closing) {
            for &candidate in self.buffers.order()[pos + 1..].iter().chain(self.buffers.order()[..pos].iter()) {
                if candidate != closing {
                    return Ok(candidate);
                }
            }
        }
        self.buffers.search_by_full_name("core.weechat").ok_or_else(|| EngineError::NotFound("no buffer left to fall back to".into()))
    }

    pub fn buffer_switch(&mut self, window: Handle<Window>, target: Handle<Buffer>, now_us: i64) -> EngineResult<()> {
        let previous = self.windows.get(window).map(|w| w.buffer).ok_or_else(|| EngineError::NotFound("window".into()))?;
        self.buffers.hotlist_clear_on_switch(target, now_us);
        self.buffers.visited_add(previous);
        if let Some(win) = self.windows.get_mut(window) {
            win.switch_buffer(target);
        }
        Ok(())
    }

    /// Records a hotlist hit and raises the buffer's dirty flag, the
    /// combination that drives the hotlist bar and the chat-line repaint
    /// together (spec §4.E + §4.I "a content change asks at least
    /// ChatRows").
    pub fn buffer_mark_activity(&mut self, h: Handle<Buffer>, priority: HotlistPriority, now_us: i64) {
        self.buffers.hotlist_add(h, priority, now_us);
        for w in self.windows.order().iter().copied() {
            if self.windows.get(w).map(|win| win.buffer) == Some(h) {
                if let Some(win) = self.windows.get_mut(w) {
                    win.refresh.ask(RefreshLevel::ChatRows);
                }
            }
        }
    }

    /// Applies a parsed `set` property to `h` (spec §6.1 `set`), acting on
    /// whatever the buffer store can't decide alone — today only `display`,
    /// which needs to move the current window over to `h`.
    pub fn buffer_set(&mut self, h: Handle<Buffer>, prop: SetProperty, now_us: i64) -> EngineResult<()> {
        let effect = self.buffers.apply_set(h, prop)?;
        if effect == SetEffect::SwitchToBuffer {
            let window = self.windows.current();
            self.buffer_switch(window, h, now_us)?;
        }
        Ok(())
    }

    // ---- input editor (spec §4.C) --------------------------------------

    /// Runs one edit command against `h`'s input line, emitting
    /// `input_text_changed`/`input_text_cursor_moved` for whatever actually
    /// moved (spec §6.2). `InputEditor` itself can't emit these — see
    /// `input::apply_input_op` — so this is the only place they fire from.
    pub fn input_dispatch(&mut self, h: Handle<Buffer>, op: InputOp) -> EngineResult<()> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        let before_text = buf.input.text().to_string();
        let before_cursor = buf.input.cursor();
        apply_input_op(&mut buf.input, &mut self.clipboard, op);
        let after_text = buf.input.text().to_string();
        let after_cursor = buf.input.cursor();
        if after_text != before_text {
            self.buffers.signals.emit(Signal::InputTextChanged(h));
        }
        if after_cursor != before_cursor {
            self.buffers.signals.emit(Signal::InputTextCursorMoved(h));
        }
        Ok(())
    }

    pub fn input_set_prompt(&mut self, h: Handle<Buffer>, prompt: &str) -> EngineResult<()> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        if buf.input.prompt != prompt {
            buf.input.prompt = prompt.to_string();
            self.buffers.signals.emit(Signal::InputPromptChanged(h));
        }
        Ok(())
    }

    /// Feeds one fd read's worth of raw bytes into `h`'s input, raising
    /// `input_paste_pending` if the burst crossed the paste threshold
    /// (spec §4.C "Paste detection").
    pub fn input_feed_paste_bytes(&mut self, h: Handle<Buffer>, bytes: &[u8]) -> EngineResult<PasteOutcome> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        let before_text = buf.input.text().to_string();
        let outcome = buf.input.feed_paste_bytes(bytes);
        let after_text = buf.input.text().to_string();
        match outcome {
            PasteOutcome::Pending => self.buffers.signals.emit(Signal::InputPastePending(h)),
            PasteOutcome::Inserted if after_text != before_text => self.buffers.signals.emit(Signal::InputTextChanged(h)),
            PasteOutcome::Inserted => {}
        }
        Ok(outcome)
    }

    pub fn input_confirm_paste(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        buf.input.confirm_paste();
        self.buffers.signals.emit(Signal::InputTextChanged(h));
        Ok(())
    }

    pub fn input_cancel_paste(&mut self, h: Handle<Buffer>) -> EngineResult<()> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        buf.input.cancel_paste();
        Ok(())
    }

    /// Runs the submit pipeline for whatever is currently in `h`'s input
    /// line (spec §4.C "Submission"): take the text, run it through the
    /// `input_text_for_buffer` modifier chain, stage it in both history
    /// rings, dispatch the buffer's input callback, and print it as a line
    /// unless the callback ate it. Returns `None` if there was nothing to
    /// submit (empty input, `input_get_empty` off).
    pub fn buffer_input_submit(&mut self, h: Handle<Buffer>, now_us: i64) -> EngineResult<Option<HookResult>> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        let Some(lines) = buf.input.take_for_submit() else {
            return Ok(None);
        };
        let buffer_id = buf.id;
        self.buffers.signals.emit(Signal::InputTextChanged(h));

        let mut last_result = HookResult::Ok;
        for raw_line in lines {
            let text = self.hooks.dispatch_modifier("input_text_for_buffer", &buffer_id.to_string(), raw_line);

            let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
            buf.history.add(&text);
            self.global_history.add(&text);

            let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
            let result = match buf.input_callback.as_mut() {
                Some(cb) => cb.on_input(buffer_id, &text),
                None => HookResult::Ok,
            };
            result.log_if_err("input_callback");

            if !result.is_eat() {
                let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
                let owner = buf.id;
                buf.lines.push(owner, None, Some(text), Vec::new(), now_us, 0);
            }
            last_result = result;
        }
        Ok(Some(last_result))
    }

    // ---- search (spec §4.D) --------------------------------------------

    /// Advances `h`'s search by one candidate in its current direction
    /// (spec §4.D `search_previous`/`search_next`), walking the merged
    /// group's chronological line list from the search's last position.
    pub fn buffer_search_step(&mut self, h: Handle<Buffer>) -> EngineResult<bool> {
        let candidates: Vec<(Option<String>, Option<String>)> =
            self.buffers.mixed_lines(h).iter().map(|l| (l.prefix.clone(), l.message.clone())).collect();

        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        let found = if candidates.is_empty() {
            None
        } else {
            let start = buf.search.position.min(candidates.len() - 1);
            match buf.search.direction {
                Direction::Backward => find_match(
                    &mut buf.search,
                    (0..=start).rev().map(|i| {
                        (i, Candidate { prefix: candidates[i].0.as_deref(), message: candidates[i].1.as_deref() })
                    }),
                ),
                Direction::Forward => find_match(
                    &mut buf.search,
                    (start..candidates.len()).map(|i| {
                        (i, Candidate { prefix: candidates[i].0.as_deref(), message: candidates[i].1.as_deref() })
                    }),
                ),
            }
        };
        self.buffers.signals.emit(Signal::InputSearch(h, found.is_some()));
        Ok(found.is_some())
    }

    pub fn buffer_search_next(&mut self, h: Handle<Buffer>) -> EngineResult<bool> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        buf.search.direction = Direction::Forward;
        self.buffer_search_step(h)
    }

    pub fn buffer_search_previous(&mut self, h: Handle<Buffer>) -> EngineResult<bool> {
        let buf = self.buffers.get_mut(h).ok_or_else(|| EngineError::NotFound("buffer".into()))?;
        buf.search.direction = Direction::Backward;
        self.buffer_search_step(h)
    }

    // ---- window queries (spec §4.F) ------------------------------------

    /// Repopulates `w`'s coordinate map from its buffer's current mixed
    /// line view, the prerequisite for `window_context_at` to resolve a
    /// screen position back to a line (spec §4.F, spec.md:246).
    pub fn refresh_window_coords(&mut self, w: Handle<Window>) -> EngineResult<()> {
        let buffer = self.windows.get(w).ok_or_else(|| EngineError::NotFound("window".into()))?.buffer;
        let lines = self.buffers.mixed_lines(buffer);
        let win = self.windows.get_mut(w).ok_or_else(|| EngineError::NotFound("window".into()))?;
        fill_coords(win, &lines);
        Ok(())
    }

    /// Resolves a screen position within `w` to the line/word under it
    /// (spec.md:246 `get_context_at`). Callers should `refresh_window_coords`
    /// first if the buffer has printed since the last resize/scroll.
    pub fn window_context_at(&self, w: Handle<Window>, x: u16, y: u16) -> EngineResult<Context> {
        let win = self.windows.get(w).ok_or_else(|| EngineError::NotFound("window".into()))?;
        let lines = self.buffers.mixed_lines(win.buffer);
        Ok(get_context_at(win, &lines, x, y))
    }

    pub fn window_zoom_toggle(&mut self) -> EngineResult<()> {
        self.windows.zoom_toggle()
    }

    /// Parses and applies a relative scroll command to `w` (spec §4.F
    /// "Scroll commands"), e.g. `"-10"` or `"+1d"`.
    pub fn window_scroll(&mut self, w: Handle<Window>, spec: &str) -> EngineResult<()> {
        let scroll = parse_relative_scroll(spec).ok_or_else(|| EngineError::Validation("invalid scroll command".into()))?;
        let buffer = self.windows.get(w).ok_or_else(|| EngineError::NotFound("window".into()))?.buffer;
        let total_lines = self.buffers.mixed_lines(buffer).len();
        self.windows.scroll_relative(w, scroll, total_lines)
    }

    // ---- main loop (spec §4.H) ----------------------------------------

    /// Runs one cooperative tick. `now_ms` and `fd_poll` are supplied by
    /// the embedder (spec §5: the core never calls the system clock or
    /// `poll(2)` itself); `fd_poll` blocks for at most the returned
    /// timeout and reports which watched fds became ready.
    pub fn tick(&mut self, now_ms: i64, fd_poll: impl FnOnce(u64) -> Vec<(i32, bool, bool)>) -> TickReport {
        let mut report = TickReport::default();

        // Step 1: timer hooks.
        self.hooks.run_due_timers(now_ms);
        report.timers_fired = true;

        // Step 2: color-pair bookkeeping is owned by the (out-of-scope)
        // curses front end; the core only needs to not block it, so
        // there is nothing to do here besides documenting the slot.

        // Step 3: SIGWINCH handling - resize the root to whatever the
        // embedder already measured and stashed via `resize_root`
        // directly; here we only clear the flag and note it happened.
        if self.sigwinch.take() {
            report.resized = true;
            for w in self.windows.order().to_vec() {
                self.windows.signals_mut().emit(Signal::WindowResized(w));
            }
        }

        // Steps 4-5: two-pass dirty refresh. Pass one computes what needs
        // redrawing (already tracked incrementally via `RefreshFlag::ask`
        // at the point of mutation); pass two clears it, simulating the
        // repaint the embedder performs in between.
        for w in self.windows.order().iter().copied() {
            if let Some(win) = self.windows.get_mut(w) {
                if win.refresh.is_dirty() {
                    report.refreshed_windows += 1;
                    win.refresh.clear();
                }
            }
        }

        // Step 6: a resize or a refresh pass both end with a SIGWINCH
        // signal dispatch, so hooks watching layout changes see a single
        // consistent trigger regardless of which one happened.
        if report.resized || report.refreshed_windows > 0 {
            self.hooks.dispatch_signal("window_resized", "");
        }

        // Step 7: fd poll, timeout computed from the next due timer.
        let timeout_ms = poll_timeout_ms(self.hooks.next_timer_due_in(now_ms), self.config.default_idle_ms);
        let ready = fd_poll(timeout_ms);
        report.fds_ready = ready.len();

        // Step 8: child process poll / async signal servicing. Process
        // reaping needs a real `waitpid`, which lives outside this crate;
        // servicing SIGINT here keeps it on the same cooperative cadence
        // as SIGWINCH rather than being handled ad hoc.
        if self.sigint.take() {
            self.request_quit();
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> Engine {
        Engine::new(EngineConfig::default(), Rect { x: 0, y: 0, width: 80, height: 24 }, 1).unwrap()
    }

    #[test]
    fn new_engine_has_one_weechat_buffer_and_one_window() {
        let e = engine();
        assert_eq!(e.buffers.len(), 1);
        assert_eq!(e.buffers.get(e.buffers.order()[0]).unwrap().full_name, "core.weechat");
        assert_eq!(e.windows.order().len(), 1);
    }

    #[test]
    fn closing_a_buffer_repoints_its_window() {
        let mut e = engine();
        let other = e.buffer_new("irc", "libera", BufferKind::Formatted, 2).unwrap();
        let win = e.windows.current();
        e.buffer_switch(win, other, 2).unwrap();
        assert_eq!(e.windows.get(win).unwrap().buffer, other);

        e.buffer_close(other).unwrap();
        let weechat = e.buffers.search_by_full_name("core.weechat").unwrap();
        assert_eq!(e.windows.get(win).unwrap().buffer, weechat);
    }

    #[test]
    fn tick_clears_window_dirty_flags() {
        let mut e = engine();
        let win = e.windows.current();
        e.windows.get_mut(win).unwrap().refresh.ask(RefreshLevel::ChatRows);
        let report = e.tick(0, |_timeout| Vec::new());
        assert_eq!(report.refreshed_windows, 1);
        assert!(!e.windows.get(win).unwrap().refresh.is_dirty());
    }

    #[test]
    fn sigint_during_tick_requests_quit() {
        let mut e = engine();
        e.sigint.raise();
        e.tick(0, |_| Vec::new());
        assert!(e.should_quit());
    }

    #[test]
    fn buffer_set_short_name_updates_store_without_switching() {
        let mut e = engine();
        let h = e.buffer_new("irc", "libera", BufferKind::Formatted, 2).unwrap();
        e.buffer_set(h, SetProperty::ShortName("lb".into()), 2).unwrap();
        assert_eq!(e.buffers.get(h).unwrap().short_name, "lb");
    }

    #[test]
    fn buffer_set_display_switches_the_current_window() {
        let mut e = engine();
        let h = e.buffer_new("irc", "libera", BufferKind::Formatted, 2).unwrap();
        let win = e.windows.current();
        assert_ne!(e.windows.get(win).unwrap().buffer, h);
        e.buffer_set(h, SetProperty::Display("1".into()), 2).unwrap();
        assert_eq!(e.windows.get(win).unwrap().buffer, h);
    }

    #[test]
    fn input_dispatch_inserts_text_and_moves_cursor() {
        let mut e = engine();
        let h = e.buffers.order()[0];
        e.input_dispatch(h, InputOp::Insert("hello".into())).unwrap();
        assert_eq!(e.buffers.get(h).unwrap().input.text(), "hello");
        assert_eq!(e.buffers.get(h).unwrap().input.cursor(), 5);
    }

    #[test]
    fn buffer_input_submit_prints_a_line_and_clears_input() {
        let mut e = engine();
        let h = e.buffers.order()[0];
        e.input_dispatch(h, InputOp::Insert("hi there".into())).unwrap();
        let result = e.buffer_input_submit(h, 100).unwrap();
        assert!(matches!(result, Some(HookResult::Ok)));
        assert_eq!(e.buffers.get(h).unwrap().input.text(), "");
        let lines = e.buffers.mixed_lines(h);
        assert_eq!(lines.last().unwrap().message.as_deref(), Some("hi there"));
    }

    #[test]
    fn buffer_input_submit_on_empty_input_returns_none() {
        let mut e = engine();
        let h = e.buffers.order()[0];
        assert!(e.buffer_input_submit(h, 100).unwrap().is_none());
    }

    #[test]
    fn buffer_search_previous_finds_a_printed_line() {
        let mut e = engine();
        let h = e.buffers.order()[0];
        {
            let buf = e.buffers.get_mut(h).unwrap();
            let owner = buf.id;
            buf.lines.push(owner, None, Some("alpha".into()), Vec::new(), 1, 0);
            buf.lines.push(owner, None, Some("beta".into()), Vec::new(), 2, 0);
            buf.search.input = "beta".into();
            buf.search.position = 1;
        }
        let found = e.buffer_search_previous(h).unwrap();
        assert!(found);
        assert_eq!(e.buffers.get(h).unwrap().search.position, 1);
    }

    #[test]
    fn window_zoom_toggle_requires_a_second_window() {
        let mut e = engine();
        assert!(e.window_zoom_toggle().is_err());
        e.buffer_new("irc", "libera", BufferKind::Formatted, 2).unwrap();
        let win = e.windows.current();
        e.windows.split_horizontal(win, 50, e.buffers.order()[0]).unwrap();
        assert!(e.window_zoom_toggle().is_ok());
        assert!(e.windows.is_zoomed());
        e.window_zoom_toggle().unwrap();
        assert!(!e.windows.is_zoomed());
    }

    #[test]
    fn window_context_at_resolves_a_printed_line() {
        let mut e = engine();
        let h = e.buffers.order()[0];
        {
            let buf = e.buffers.get_mut(h).unwrap();
            let owner = buf.id;
            buf.lines.push(owner, None, Some("hello world".into()), Vec::new(), 1, 0);
        }
        let win = e.windows.current();
        e.refresh_window_coords(win).unwrap();
        let ctx = e.window_context_at(win, 0, 0).unwrap();
        assert!(ctx.in_chat);
    }
}
