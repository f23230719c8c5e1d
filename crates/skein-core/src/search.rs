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

//! The in-buffer/history search engine (spec §4.D). Adapted from the
//! teacher's `find.rs` (`Find`), but searching a discrete line/history
//! stream rather than incrementally re-scanning a rope delta: chat buffers
//! are append-only, so there is no edit-driven re-validation to do, only a
//! directional walk with restart semantics.

use bitflags::bitflags;

bitflags! {
    /// Which sub-regions of a line participate in a search (spec §3
    /// "scope mask (prefix|message)").
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ScopeMask: u8 {
        const PREFIX  = 0b01;
        const MESSAGE = 0b10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Off,
    Lines,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Backward,
    Forward,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistorySource {
    None,
    Local,
    Global,
}

/// A single candidate being searched: a line's prefix and message, or a
/// history entry (which has no prefix).
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub prefix: Option<&'a str>,
    pub message: Option<&'a str>,
}

/// Per-buffer search state (spec §3 "Search state").
pub struct SearchState {
    pub mode: SearchMode,
    pub direction: Direction,
    pub exact: bool,
    pub regex: bool,
    compiled: Option<regex::Regex>,
    pub scope: ScopeMask,
    pub history_source: HistorySource,
    pub found: bool,
    pub input: String,
    saved_input: String,
    /// The render anchor (e.g. scroll `start_line`) to restore on
    /// `stop(false)`, captured when the search started.
    anchor: usize,
    /// Current position within the searched stream (a line index or
    /// history ring index, depending on `mode`).
    pub position: usize,
}

impl SearchState {
    pub fn new() -> Self {
        Self {
            mode: SearchMode::Off,
            direction: Direction::Backward,
            exact: false,
            regex: false,
            compiled: None,
            scope: ScopeMask::MESSAGE,
            history_source: HistorySource::None,
            found: false,
            input: String::new(),
            saved_input: String::new(),
            anchor: 0,
            position: 0,
        }
    }

    /// Starts a search (spec §4.D `start`). `anchor_line` is the scroll
    /// position to restore on cancel; `free_kind` selects the forward
    /// default direction free buffers use.
    pub fn start(
        &mut self,
        mode: SearchMode,
        anchor_line: usize,
        free_kind: bool,
        default_scope: ScopeMask,
        saved_input: &str,
    ) {
        self.mode = mode;
        self.direction = if free_kind { Direction::Forward } else { Direction::Backward };
        if self.scope.is_empty() {
            self.scope = default_scope;
        }
        self.found = false;
        self.saved_input = saved_input.to_string();
        self.input.clear();
        self.compiled = None;
        self.anchor = anchor_line;
        self.position = anchor_line;
    }

    pub fn is_active(&self) -> bool {
        self.mode != SearchMode::Off
    }

    /// Recompiles the regex (if in regex mode) after an input edit.
    /// spec: flags {extended, icase unless exact}.
    pub fn recompile(&mut self) -> Result<(), regex::Error> {
        if !self.regex || self.input.is_empty() {
            self.compiled = None;
            return Ok(());
        }
        let pattern = if self.exact {
            self.input.clone()
        } else {
            format!("(?i){}", self.input)
        };
        self.compiled = Some(regex::Regex::new(&pattern)?);
        Ok(())
    }

    /// True iff `candidate` matches the current query, honoring the scope
    /// mask, exactness and regex mode (spec §4.D "Searching a line").
    pub fn matches(&self, candidate: Candidate<'_>) -> bool {
        if self.input.is_empty() {
            return false;
        }
        let fields: [Option<&str>; 2] = [
            if self.scope.contains(ScopeMask::PREFIX) { candidate.prefix } else { None },
            if self.scope.contains(ScopeMask::MESSAGE) { candidate.message } else { None },
        ];
        fields.iter().flatten().any(|text| self.field_matches(text))
    }

    fn field_matches(&self, text: &str) -> bool {
        if self.regex {
            self.compiled.as_ref().map(|re| re.is_match(text)).unwrap_or(false)
        } else if self.exact {
            text.contains(&self.input)
        } else {
            text.to_lowercase().contains(&self.input.to_lowercase())
        }
    }

    /// Re-anchors and re-runs after an input edit or a toggle of
    /// exact/regex/scope (spec §4.D `restart`).
    pub fn restart(&mut self) {
        self.found = false;
        self.position = self.anchor;
    }

    /// Ends the search. `stop_here == true` keeps the scroll where the
    /// match landed (and, in history mode, promotes the matched entry into
    /// the input line via the caller); `false` restores the anchor and the
    /// pre-search input.
    pub fn stop(&mut self, stop_here: bool) -> StopOutcome {
        let outcome = if stop_here {
            StopOutcome::KeepPosition
        } else {
            StopOutcome::RestoreAnchor { anchor: self.anchor, input: self.saved_input.clone() }
        };
        self.mode = SearchMode::Off;
        self.compiled = None;
        self.saved_input.clear();
        outcome
    }
}

impl Default for SearchState {
    fn default() -> Self {
        Self::new()
    }
}

pub enum StopOutcome {
    KeepPosition,
    RestoreAnchor { anchor: usize, input: String },
}

/// Walks `candidates` (already ordered by search direction) starting after
/// `state.position`, returning the index of the first match. Callers map
/// that index back onto a concrete line/history entry. A miss with a
/// non-empty query is the caller's cue to emit the bell-equivalent signal
/// (spec §4.D).
pub fn find_match<'a, I>(state: &mut SearchState, mut candidates: I) -> Option<usize>
where
    I: Iterator<Item = (usize, Candidate<'a>)>,
{
    for (idx, candidate) in &mut candidates {
        if state.matches(candidate) {
            state.found = true;
            state.position = idx;
            return Some(idx);
        }
    }
    state.found = false;
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cand(message: &str) -> Candidate<'_> {
        Candidate { prefix: None, message: Some(message) }
    }

    #[test]
    fn literal_search_across_merged_group() {
        // Mixed view newest-first: "alpha", "beta", "gamma".
        let lines = ["alpha", "beta", "gamma"];
        let mut state = SearchState::new();
        state.start(SearchMode::Lines, 2, false, ScopeMask::MESSAGE, "");
        state.input = "a".to_string();

        // search_previous from position 2 (gamma) walking toward index 0.
        let found = find_match(
            &mut state,
            (0..=state.position).rev().map(|i| (i, cand(lines[i]))),
        );
        assert_eq!(found, Some(0), "alpha contains 'a' and is the first hit walking backward");
    }

    #[test]
    fn regex_toggle_changes_matches() {
        let lines = ["alpha", "beta", "gamma"];
        let mut state = SearchState::new();
        state.start(SearchMode::Lines, 2, false, ScopeMask::MESSAGE, "");
        state.exact = false;
        state.regex = true;
        state.input = "^[ab]".to_string();
        state.recompile().unwrap();
        let found = find_match(&mut state, (0..=2).rev().map(|i| (i, cand(lines[i]))));
        assert_eq!(found, Some(1), "beta starts with b, matched before alpha when walking from gamma");
    }

    #[test]
    fn miss_clears_found() {
        let lines = ["beta", "gamma"];
        let mut state = SearchState::new();
        state.start(SearchMode::Lines, 1, false, ScopeMask::MESSAGE, "");
        state.input = "zzz".to_string();
        let found = find_match(&mut state, (0..=1).rev().map(|i| (i, cand(lines[i]))));
        assert_eq!(found, None);
        assert!(!state.found);
    }

    #[test]
    fn stop_restores_anchor_and_input() {
        let mut state = SearchState::new();
        state.start(SearchMode::Lines, 5, false, ScopeMask::MESSAGE, "saved text");
        match state.stop(false) {
            StopOutcome::RestoreAnchor { anchor, input } => {
                assert_eq!(anchor, 5);
                assert_eq!(input, "saved text");
            }
            _ => panic!("expected RestoreAnchor"),
        }
        assert_eq!(state.mode, SearchMode::Off);
    }
}
