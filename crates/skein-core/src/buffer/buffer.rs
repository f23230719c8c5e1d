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

//! The `Buffer` entity (spec §3 "Buffer"). Lifecycle and cross-buffer
//! operations (numbering, merge, search) live in `store.rs`; this module
//! only owns the data a single buffer carries and the mutators that don't
//! need to see its siblings.

use std::collections::HashMap;

use crate::buffer::line::LineList;
use crate::buffer::property::{ActiveState, BufferFlags, BufferKind, HighlightPolicy, NotifyLevel};
use crate::config::EngineConfig;
use crate::history::HistoryRing;
use crate::input::InputEditor;
use crate::search::SearchState;

/// Cross-buffer priority levels for hotlist activity (spec GLOSSARY
/// "Hotlist priority").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HotlistPriority {
    Low,
    Message,
    Private,
    Highlight,
}

/// Invoked once when a buffer is closed; owned by the plugin that created
/// the buffer (spec §3 "Close callback"). A trait object rather than a raw
/// function pointer, so the owner can carry its own state without the core
/// knowing its shape (Design Notes: "a trait/interface abstraction...
/// plugins own the data").
pub trait CloseCallback {
    fn on_close(&mut self, id: u64);
}

impl<F: FnMut(u64)> CloseCallback for F {
    fn on_close(&mut self, id: u64) {
        self(id)
    }
}

/// Invoked with the raw submitted text; `OkEat` stops core dispatch from
/// also treating the text as a command (spec §4.C "Submission").
pub trait InputCallback {
    fn on_input(&mut self, id: u64, text: &str) -> crate::error::HookResult;
}

impl<F: FnMut(u64, &str) -> crate::error::HookResult> InputCallback for F {
    fn on_input(&mut self, id: u64, text: &str) -> crate::error::HookResult {
        self(id, text)
    }
}

pub struct Buffer {
    pub id: u64,
    pub number: i64,
    pub plugin_owner: String,
    pub name: String,
    pub short_name: String,
    pub full_name: String,
    pub old_full_name: Option<String>,
    pub kind: BufferKind,
    pub lines: LineList,
    pub notify_level: NotifyLevel,
    pub visible_count: usize,
    pub active: ActiveState,
    pub flags: BufferFlags,
    pub input: InputEditor,
    pub history: HistoryRing,
    /// Opaque to the core; a plugin stores and resets completion state as
    /// it sees fit (spec §3 "Completion state").
    pub completion_state: Option<String>,
    pub search: SearchState,
    pub highlight: HighlightPolicy,
    pub hotlist_priority: Option<HotlistPriority>,
    /// Creation time of the most recently *removed* hotlist entry, kept so
    /// re-hotlisting within the same session doesn't re-fire at a lower
    /// priority than already seen (spec §4.E "Hide, visit, hotlist").
    pub hotlist_removed_at: Option<i64>,
    pub local_vars: HashMap<String, String>,
    pub close_callback: Option<Box<dyn CloseCallback>>,
    pub input_callback: Option<Box<dyn InputCallback>>,
    /// Free-form buffer title, e.g. a channel topic (spec §6.1 `title`
    /// property).
    pub title: String,
    /// Plugin-defined single-letter mode flags rendered next to the buffer
    /// name (spec §6.1 `modes` property).
    pub modes: String,
    /// Nicks that always trigger a hotlist bump regardless of notify level
    /// (spec §6.1 `hotlist_max_level_nicks` property).
    pub hotlist_max_level_nicks: Vec<String>,
    pub input_get_any_user_data: bool,
    pub input_get_unknown_commands: bool,
}

impl Buffer {
    pub fn new(id: u64, plugin_owner: &str, name: &str, kind: BufferKind, config: &EngineConfig) -> Self {
        let full_name = format!("{plugin_owner}.{name}");
        Buffer {
            id,
            number: 0,
            plugin_owner: plugin_owner.to_string(),
            name: name.to_string(),
            short_name: name.to_string(),
            full_name,
            old_full_name: None,
            kind,
            lines: LineList::new(),
            notify_level: NotifyLevel::All,
            visible_count: 0,
            active: ActiveState::Shown,
            flags: BufferFlags::CLEARABLE | BufferFlags::PRINT_HOOKS_ENABLED,
            input: InputEditor::new(config.undo_capacity, config.paste_threshold_bytes),
            history: HistoryRing::new(config.history_capacity),
            completion_state: None,
            search: SearchState::new(),
            highlight: HighlightPolicy::default(),
            hotlist_priority: None,
            hotlist_removed_at: None,
            local_vars: HashMap::new(),
            close_callback: None,
            input_callback: None,
            title: String::new(),
            modes: String::new(),
            hotlist_max_level_nicks: Vec::new(),
            input_get_any_user_data: false,
            input_get_unknown_commands: false,
        }
    }

    pub fn is_opening(&self) -> bool {
        self.flags.contains(BufferFlags::OPENING)
    }

    pub fn is_closing(&self) -> bool {
        self.flags.contains(BufferFlags::CLOSING)
    }

    pub fn is_hidden(&self) -> bool {
        self.flags.contains(BufferFlags::HIDDEN)
    }

    /// Rebuilds `full_name` after a rename (spec §3 invariant: "`full_name`
    /// is always `plugin_owner "." name`").
    pub fn rebuild_full_name(&mut self) {
        self.full_name = format!("{}.{}", self.plugin_owner, self.name);
    }

    /// `string_replace_local_var` (spec §4.E): scans `s`, substituting each
    /// unescaped `$identifier` with the matching local variable, leaving
    /// unknown identifiers (and a literal `$$`) untouched.
    pub fn replace_local_vars(&self, s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let chars: Vec<char> = s.chars().collect();
        let mut i = 0;
        while i < chars.len() {
            if chars[i] == '$' {
                let start = i + 1;
                let mut end = start;
                while end < chars.len() && (chars[end].is_ascii_alphanumeric() || chars[end] == '_') {
                    end += 1;
                }
                if end > start {
                    let ident: String = chars[start..end].iter().collect();
                    if let Some(value) = self.local_vars.get(&ident) {
                        out.push_str(value);
                    } else {
                        out.push('$');
                        out.push_str(&ident);
                    }
                    i = end;
                    continue;
                }
            }
            out.push(chars[i]);
            i += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(config: &EngineConfig) -> Buffer {
        Buffer::new(1, "core", "weechat", BufferKind::Formatted, config)
    }

    #[test]
    fn full_name_rebuilds_on_rename() {
        let config = EngineConfig::default();
        let mut b = make(&config);
        assert_eq!(b.full_name, "core.weechat");
        b.name = "renamed".to_string();
        b.rebuild_full_name();
        assert_eq!(b.full_name, "core.renamed");
    }

    #[test]
    fn local_var_substitution_leaves_unknown_literal() {
        let config = EngineConfig::default();
        let mut b = make(&config);
        b.local_vars.insert("server".to_string(), "libera".to_string());
        assert_eq!(b.replace_local_vars("on $server now"), "on libera now");
        assert_eq!(b.replace_local_vars("on $unknown now"), "on $unknown now");
        assert_eq!(b.replace_local_vars("cost is $5"), "cost is $5");
    }
}
