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

//! Persisted layout format (spec §6.4, explicitly optional). Two line
//! kinds restore buffer numbering and window geometry on restart:
//!
//! ```text
//! buffer irc.libera 3 2
//! window 1 0 horizontal 50 core.weechat
//! ```
//!
//! This module only parses and serializes the format; binding the parsed
//! entries back onto a live `BufferStore`/`WindowTree` is the embedder's
//! job, the same division spec §6.4 draws between "the parser restores
//! numbering and binds windows" (two separate steps).

use crate::error::{EngineError, EngineResult};
use crate::window::Orientation;

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutBufferEntry {
    pub plugin: String,
    pub name: String,
    pub number: u32,
    pub merge_order: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutWindowEntry {
    pub id: u32,
    pub parent_id: u32,
    pub orientation: Orientation,
    pub split_pct: u8,
    pub plugin: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LayoutEntry {
    Buffer(LayoutBufferEntry),
    Window(LayoutWindowEntry),
}

/// Parses a full layout file. Blank lines and lines starting with `#` are
/// skipped; anything else must match one of the two record kinds or the
/// whole parse fails (a half-restored layout is worse than none).
pub fn parse_layout(text: &str) -> EngineResult<Vec<LayoutEntry>> {
    let mut entries = Vec::new();
    for (lineno, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        entries.push(parse_line(line).map_err(|e| EngineError::Validation(format!("layout line {}: {e}", lineno + 1)))?);
    }
    Ok(entries)
}

fn parse_line(line: &str) -> Result<LayoutEntry, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.first().copied() {
        Some("buffer") => parse_buffer_line(&fields),
        Some("window") => parse_window_line(&fields),
        Some(other) => Err(format!("unknown record kind: {other}")),
        None => Err("empty record".to_string()),
    }
}

fn parse_buffer_line(fields: &[&str]) -> Result<LayoutEntry, String> {
    if fields.len() < 3 || fields.len() > 4 {
        return Err("expected: buffer <plugin>.<name> <number> [merge_order]".to_string());
    }
    let (plugin, name) = split_full_name(fields[1])?;
    let number: u32 = fields[2].parse().map_err(|_| "non-numeric buffer number".to_string())?;
    let merge_order = match fields.get(3) {
        Some(s) => Some(s.parse().map_err(|_| "non-numeric merge_order".to_string())?),
        None => None,
    };
    Ok(LayoutEntry::Buffer(LayoutBufferEntry { plugin, name, number, merge_order }))
}

fn parse_window_line(fields: &[&str]) -> Result<LayoutEntry, String> {
    if fields.len() != 6 {
        return Err("expected: window <id> <parent_id> <orientation> <split_pct> <plugin>.<name>".to_string());
    }
    let id: u32 = fields[1].parse().map_err(|_| "non-numeric window id".to_string())?;
    let parent_id: u32 = fields[2].parse().map_err(|_| "non-numeric parent_id".to_string())?;
    let orientation = match fields[3] {
        "horizontal" => Orientation::Horizontal,
        "vertical" => Orientation::Vertical,
        other => return Err(format!("unknown orientation: {other}")),
    };
    let split_pct: u8 = fields[4].parse().map_err(|_| "non-numeric split_pct".to_string())?;
    if !(1..100).contains(&split_pct) {
        return Err("split_pct out of [1,99]".to_string());
    }
    let (plugin, name) = split_full_name(fields[5])?;
    Ok(LayoutEntry::Window(LayoutWindowEntry { id, parent_id, orientation, split_pct, plugin, name }))
}

fn split_full_name(s: &str) -> Result<(String, String), String> {
    s.split_once('.').map(|(p, n)| (p.to_string(), n.to_string())).ok_or_else(|| format!("not a plugin.name pair: {s}"))
}

/// Inverse of `parse_layout`, in the same line order categories would
/// naturally come out of a layout dump: buffers first, then windows.
pub fn serialize_layout(entries: &[LayoutEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        match entry {
            LayoutEntry::Buffer(b) => {
                out.push_str(&format!("buffer {}.{} {}", b.plugin, b.name, b.number));
                if let Some(order) = b.merge_order {
                    out.push_str(&format!(" {order}"));
                }
                out.push('\n');
            }
            LayoutEntry::Window(w) => {
                let orientation = match w.orientation {
                    Orientation::Horizontal => "horizontal",
                    Orientation::Vertical => "vertical",
                };
                out.push_str(&format!(
                    "window {} {} {orientation} {} {}.{}\n",
                    w.id, w.parent_id, w.split_pct, w.plugin, w.name
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_buffer_and_window_lines() {
        let text = "buffer irc.libera 3 2\nwindow 1 0 horizontal 50 core.weechat\n";
        let entries = parse_layout(text).unwrap();
        assert_eq!(
            entries[0],
            LayoutEntry::Buffer(LayoutBufferEntry { plugin: "irc".into(), name: "libera".into(), number: 3, merge_order: Some(2) })
        );
        assert_eq!(
            entries[1],
            LayoutEntry::Window(LayoutWindowEntry {
                id: 1,
                parent_id: 0,
                orientation: Orientation::Horizontal,
                split_pct: 50,
                plugin: "core".into(),
                name: "weechat".into(),
            })
        );
    }

    #[test]
    fn skips_blank_and_comment_lines() {
        let text = "# saved layout\n\nbuffer core.weechat 1\n";
        let entries = parse_layout(text).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rejects_split_pct_out_of_range() {
        let text = "window 1 0 horizontal 100 core.weechat\n";
        assert!(parse_layout(text).is_err());
    }

    #[test]
    fn round_trips_through_serialize() {
        let text = "buffer irc.libera 3 2\nwindow 1 0 vertical 33 core.weechat\n";
        let entries = parse_layout(text).unwrap();
        let back = serialize_layout(&entries);
        assert_eq!(parse_layout(&back).unwrap(), entries);
    }

    #[test]
    fn round_trips_through_a_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("layout.weechat");
        let entries = vec![LayoutEntry::Buffer(LayoutBufferEntry {
            plugin: "irc".into(),
            name: "libera".into(),
            number: 3,
            merge_order: None,
        })];
        std::fs::write(&path, serialize_layout(&entries)).unwrap();
        let read_back = std::fs::read_to_string(&path).unwrap();
        assert_eq!(parse_layout(&read_back).unwrap(), entries);
    }
}
