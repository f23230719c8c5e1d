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

//! Cooperative scheduling primitives for `Engine::tick` (spec §4.H,
//! §5 "Timeouts"). The tick sequence itself lives on `Engine` since it
//! touches buffers, windows and hooks together; this module holds the
//! pieces that don't need that context: the quit/SIGWINCH flags a signal
//! handler can flip from outside the cooperative loop, and the idle-poll
//! timeout arithmetic.

use std::sync::atomic::{AtomicBool, Ordering};

/// A flag a real POSIX signal handler sets from outside the loop; the
/// loop only ever reads and clears it between ticks, never while handling
/// one (spec §5: "no work happens except inside a `tick` call").
#[derive(Default)]
pub struct AsyncFlag(AtomicBool);

impl AsyncFlag {
    pub fn new() -> Self {
        Self(AtomicBool::new(false))
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Reads and clears the flag in one step, so a signal arriving during
    /// the read can't be lost (spec: "take-and-clear, never just read").
    pub fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// The eight steps of one `tick` (spec §4.H), in order. `Engine::tick`
/// walks this list; kept as data so tests and logging can name a step
/// without duplicating the sequence.
pub const TICK_STEPS: [&str; 8] = [
    "run_due_timers",
    "note_color_pairs_flush",
    "service_sigwinch",
    "refresh_pass_one",
    "refresh_pass_two",
    "emit_post_refresh_sigwinch",
    "poll_fds",
    "poll_processes",
];

/// Computes how long the fd poll may block: the smaller of the next due
/// timer and the configured idle ceiling, so a tick never busy-waits and
/// never overshoots a timer that's about to fire (spec §5 "Timeouts": "the
/// loop must never spin hot, and must never miss a timer by sleeping past
/// it").
pub fn poll_timeout_ms(next_timer_due_in_ms: Option<i64>, default_idle_ms: u64) -> u64 {
    match next_timer_due_in_ms {
        Some(ms) => (ms.max(0) as u64).min(default_idle_ms),
        None => default_idle_ms,
    }
}

/// Outcome of one `Engine::tick` call, for callers that want to log or
/// test what happened without re-deriving it from side effects.
#[derive(Debug, Default, Clone, Copy)]
pub struct TickReport {
    pub timers_fired: bool,
    pub resized: bool,
    pub refreshed_windows: usize,
    pub fds_ready: usize,
    pub processes_reaped: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_caps_at_idle_default() {
        assert_eq!(poll_timeout_ms(Some(5000), 20), 20);
        assert_eq!(poll_timeout_ms(Some(5), 20), 5);
        assert_eq!(poll_timeout_ms(None, 20), 20);
    }

    #[test]
    fn async_flag_take_clears() {
        let flag = AsyncFlag::new();
        assert!(!flag.take());
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }
}
