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

//! Typed buffer properties (spec §4.E "Properties", §6.1 `set` table).
//! The original dispatches entirely by string name; here the ABI-facing
//! string table lives only in `parse_set`/`int_property_name`, and every
//! internal caller uses the exhaustive enums instead (Design Notes:
//! "Property get/set by string name... Internally never dispatch on
//! string names").

use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferKind {
    Formatted,
    Free,
}

impl BufferKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BufferKind::Formatted => "formatted",
            BufferKind::Free => "free",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    None,
    Highlight,
    Message,
    All,
}

impl NotifyLevel {
    pub fn as_i64(self) -> i64 {
        match self {
            NotifyLevel::None => 0,
            NotifyLevel::Highlight => 1,
            NotifyLevel::Message => 2,
            NotifyLevel::All => 3,
        }
    }

    pub fn from_i64(v: i64) -> Self {
        match v {
            0 => NotifyLevel::None,
            1 => NotifyLevel::Highlight,
            2 => NotifyLevel::Message,
            _ => NotifyLevel::All,
        }
    }
}

/// The merged-group `active` tri-state (spec §3 Buffer "Flags").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActiveState {
    Hidden = 0,
    Shown = 1,
    ZoomedSolo = 2,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct BufferFlags: u16 {
        const HIDDEN               = 1 << 0;
        const ZOOMED                = 1 << 1;
        const CLOSING               = 1 << 2;
        const OPENING                = 1 << 3;
        const DAY_CHANGE_ENABLED     = 1 << 4;
        const CLEARABLE              = 1 << 5;
        const FILTER_ENABLED         = 1 << 6;
        const TIME_FOR_EACH_LINE     = 1 << 7;
        const PRINT_HOOKS_ENABLED    = 1 << 8;
    }
}

/// Highlight policy (spec §3 "Highlight policy").
#[derive(Debug, Clone, Default)]
pub struct HighlightPolicy {
    pub words: Vec<String>,
    pub regex_source: Option<String>,
    pub regex: Option<regex::Regex>,
    pub exclude_regex_source: Option<String>,
    pub exclude_regex: Option<regex::Regex>,
    pub tags_include: Vec<String>,
    pub tags_restrict: Vec<String>,
}

/// A parsed `/buffer set <prop> <value>` request (spec §6.1). Parsing the
/// string name happens once, here, at the ABI boundary; everything
/// downstream matches on this enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetProperty {
    Hotlist(HotlistOp),
    Unread(UnreadOp),
    Display(String),
    Hidden(bool),
    PrintHooksEnabled(bool),
    DayChange(bool),
    Clear(bool),
    Filter(bool),
    Number(i64),
    Name(String),
    ShortName(String),
    Kind(BufferKind),
    Notify(NotifyLevel),
    Title(String),
    Modes(String),
    TimeForEachLine(bool),
    HighlightWords(String),
    HighlightWordsAdd(String),
    HighlightWordsDel(String),
    HighlightRegex(String),
    HighlightDisableRegex(String),
    HighlightTagsRestrict(String),
    HighlightTags(String),
    HotlistMaxLevelNicks(String),
    InputPrompt(String),
    Input(String),
    InputPos(usize),
    InputGetAnyUserData(bool),
    InputGetUnknownCommands(bool),
    InputGetEmpty(bool),
    InputMultiline(bool),
    KeyBind(String, String),
    KeyUnbind(String),
    LocalvarSet(String, String),
    LocalvarDel(String),
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotlistOp {
    Plus,
    Minus,
    Set(i64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnreadOp {
    MarkAll,
    Clear,
    Plus(i64),
    Minus(i64),
    Set(i64),
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "on" | "true")
}

/// Parses a `(prop, value)` pair from the `/buffer set`/plugin `set` API
/// into a typed `SetProperty` (spec §6.1 table).
pub fn parse_set(prop: &str, value: &str) -> SetProperty {
    if let Some(rest) = prop.strip_prefix("localvar_set_") {
        return SetProperty::LocalvarSet(rest.to_string(), value.to_string());
    }
    if let Some(rest) = prop.strip_prefix("localvar_del_") {
        return SetProperty::LocalvarDel(rest.to_string());
    }
    if let Some(rest) = prop.strip_prefix("key_bind_") {
        return SetProperty::KeyBind(rest.to_string(), value.to_string());
    }
    if let Some(rest) = prop.strip_prefix("key_unbind_") {
        return SetProperty::KeyUnbind(rest.to_string());
    }
    match prop {
        "hotlist" => SetProperty::Hotlist(match value {
            "+" => HotlistOp::Plus,
            "-" => HotlistOp::Minus,
            n => HotlistOp::Set(n.parse().unwrap_or(0)),
        }),
        "unread" => SetProperty::Unread(match value {
            "" => UnreadOp::MarkAll,
            "0" => UnreadOp::Clear,
            v if v.starts_with('+') => UnreadOp::Plus(v[1..].parse().unwrap_or(0)),
            v if v.starts_with('-') => UnreadOp::Minus(v[1..].parse().unwrap_or(0)),
            v => UnreadOp::Set(v.parse().unwrap_or(0)),
        }),
        "display" => SetProperty::Display(value.to_string()),
        "hidden" => SetProperty::Hidden(parse_bool(value)),
        "print_hooks_enabled" => SetProperty::PrintHooksEnabled(parse_bool(value)),
        "day_change" => SetProperty::DayChange(parse_bool(value)),
        "clear" => SetProperty::Clear(parse_bool(value)),
        "filter" => SetProperty::Filter(parse_bool(value)),
        "number" => SetProperty::Number(value.parse().unwrap_or(0)),
        "name" => SetProperty::Name(value.to_string()),
        "short_name" => SetProperty::ShortName(value.to_string()),
        "type" => SetProperty::Kind(if value == "free" { BufferKind::Free } else { BufferKind::Formatted }),
        "notify" => SetProperty::Notify(match value {
            "0" => NotifyLevel::None,
            "1" => NotifyLevel::Highlight,
            "2" => NotifyLevel::Message,
            _ => NotifyLevel::All,
        }),
        "title" => SetProperty::Title(value.to_string()),
        "modes" => SetProperty::Modes(value.to_string()),
        "time_for_each_line" => SetProperty::TimeForEachLine(parse_bool(value)),
        "highlight_words" => SetProperty::HighlightWords(value.to_string()),
        "highlight_words_add" => SetProperty::HighlightWordsAdd(value.to_string()),
        "highlight_words_del" => SetProperty::HighlightWordsDel(value.to_string()),
        "highlight_regex" => SetProperty::HighlightRegex(value.to_string()),
        "highlight_disable_regex" => SetProperty::HighlightDisableRegex(value.to_string()),
        "highlight_tags_restrict" => SetProperty::HighlightTagsRestrict(value.to_string()),
        "highlight_tags" => SetProperty::HighlightTags(value.to_string()),
        "hotlist_max_level_nicks" => SetProperty::HotlistMaxLevelNicks(value.to_string()),
        "input_prompt" => SetProperty::InputPrompt(value.to_string()),
        "input" => SetProperty::Input(value.to_string()),
        "input_pos" => SetProperty::InputPos(value.parse().unwrap_or(0)),
        "input_get_any_user_data" => SetProperty::InputGetAnyUserData(parse_bool(value)),
        "input_get_unknown_commands" => SetProperty::InputGetUnknownCommands(parse_bool(value)),
        "input_get_empty" => SetProperty::InputGetEmpty(parse_bool(value)),
        "input_multiline" => SetProperty::InputMultiline(parse_bool(value)),
        other => SetProperty::Unknown(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localvar_prefix_parses() {
        assert_eq!(
            parse_set("localvar_set_server", "libera"),
            SetProperty::LocalvarSet("server".to_string(), "libera".to_string())
        );
        assert_eq!(parse_set("localvar_del_server", ""), SetProperty::LocalvarDel("server".to_string()));
    }

    #[test]
    fn hotlist_operators() {
        assert_eq!(parse_set("hotlist", "+"), SetProperty::Hotlist(HotlistOp::Plus));
        assert_eq!(parse_set("hotlist", "3"), SetProperty::Hotlist(HotlistOp::Set(3)));
    }

    #[test]
    fn unknown_falls_through() {
        assert_eq!(parse_set("bogus", "x"), SetProperty::Unknown("bogus".to_string()));
    }
}
