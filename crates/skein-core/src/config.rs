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

//! Engine-wide tunables. The on-disk option system and file format are
//! explicitly out of scope (spec.md §1 Non-goals) — this is just the
//! in-memory knob set the rest of the engine reads, populated however the
//! host process likes (hardcoded defaults here, or a real file loader
//! living outside this crate).

/// Hard ceiling on the number of open buffers (spec §3 invariants).
pub const DEFAULT_MAX_BUFFERS: usize = 10_000;

/// Bytes of burst input in one fd read that triggers `input_paste_pending`
/// instead of immediate insertion (SPEC_FULL open question 1).
pub const DEFAULT_PASTE_THRESHOLD_BYTES: usize = 64;

/// Where a freshly created buffer lands in the numbered list absent a
/// layout-file placement (spec §4.E "Numbering policy").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferPosition {
    End,
    FirstGap,
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub max_buffers: usize,
    /// Per-buffer and global history ring capacity; `0` means unbounded.
    pub history_capacity: usize,
    pub global_history_capacity: usize,
    /// Per-buffer undo ring capacity; `0` disables undo tracking entirely.
    pub undo_capacity: usize,
    /// Capacity of the "visited buffers" ring used by jump previous/next.
    pub visited_capacity: usize,
    /// Default search scope mask when a search starts without one set.
    pub default_search_scope: crate::search::ScopeMask,
    /// Whether a failed search (`search_next`/`search_previous` finds
    /// nothing) should raise a bell-equivalent signal.
    pub bell_on_no_match: bool,
    /// Byte threshold for paste-burst detection in the input editor.
    pub paste_threshold_bytes: usize,
    /// Idle timeout (ms) the main loop polls fd hooks with when no timer
    /// is pending sooner (spec §5 "Timeouts").
    pub default_idle_ms: u64,
    /// Where new buffers land absent an explicit layout placement.
    pub position: BufferPosition,
    /// If false, a collision on insert/move keeps the layout's requested
    /// number even if it creates a hole or overlap; if true, successors are
    /// shifted to make room (spec §4.E "Numbering policy").
    pub auto_renumber: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_buffers: DEFAULT_MAX_BUFFERS,
            history_capacity: 500,
            global_history_capacity: 500,
            undo_capacity: 100,
            visited_capacity: 50,
            default_search_scope: crate::search::ScopeMask::MESSAGE,
            bell_on_no_match: true,
            paste_threshold_bytes: DEFAULT_PASTE_THRESHOLD_BYTES,
            default_idle_ms: 20,
            position: BufferPosition::End,
            auto_renumber: true,
        }
    }
}
