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

//! Per-(window, buffer) scroll state and the relative-scroll command
//! grammar (spec §3 "Scroll state", §4.F "Scroll commands").

/// One window's view into one buffer's line stream. A window keeps one of
/// these per buffer it has ever displayed, with the currently-shown
/// buffer's entry kept at the front of `Window::scroll_list`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScrollState {
    pub start_line: usize,
    /// Fine offset within `start_line`, for wrapped lines (spec: "pixel-like
    /// fine offset within that line for wrapping").
    pub start_line_pos: i64,
    pub first_line_displayed: bool,
    pub scrolling: bool,
    pub start_col: usize,
    pub lines_after: usize,
    pub text_search_anchor: usize,
}

impl ScrollState {
    /// A freshly bound (window, buffer) pair has never been scrolled away
    /// from the bottom — used to decide which non-front scroll-list entries
    /// are safe to garbage-collect (spec §4.F "Scroll state switching").
    pub fn is_unmodified(&self) -> bool {
        !self.scrolling && self.start_line == 0 && self.start_col == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollUnit {
    Lines,
    Seconds,
    Minutes,
    Hours,
    Days,
    Months,
    Years,
}

/// A parsed relative scroll command `[+|-][N][unit]` (spec §4.F).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelativeScroll {
    pub backward: bool,
    pub amount: i64,
    pub unit: ScrollUnit,
}

/// Parses `[+|-][N][unit]` where `unit` is one of `{"", s, m, h, d, M, y}`.
/// An absent sign defaults to backward (scrolling up into history, as in
/// the original); an absent `N` defaults to `1`.
pub fn parse_relative_scroll(s: &str) -> Option<RelativeScroll> {
    if s.is_empty() {
        return None;
    }
    let mut rest = s;
    let backward = match rest.chars().next() {
        Some('+') => {
            rest = &rest[1..];
            false
        }
        Some('-') => {
            rest = &rest[1..];
            true
        }
        _ => true,
    };
    let digits_end = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
    let (digits, unit_str) = rest.split_at(digits_end);
    let amount: i64 = if digits.is_empty() { 1 } else { digits.parse().ok()? };
    let unit = match unit_str {
        "" => ScrollUnit::Lines,
        "s" => ScrollUnit::Seconds,
        "m" => ScrollUnit::Minutes,
        "h" => ScrollUnit::Hours,
        "d" => ScrollUnit::Days,
        "M" => ScrollUnit::Months,
        "y" => ScrollUnit::Years,
        _ => return None,
    };
    Some(RelativeScroll { backward, amount, unit })
}

/// Horizontal scroll accepts a plain cell count or a `%` of window width
/// (spec §4.F "Horizontal scroll accepts N or N%").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalScroll {
    Cells(i64),
    Percent(i64),
}

pub fn parse_horizontal_scroll(s: &str) -> Option<HorizontalScroll> {
    if let Some(pct) = s.strip_suffix('%') {
        pct.parse().ok().map(HorizontalScroll::Percent)
    } else {
        s.parse().ok().map(HorizontalScroll::Cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_line_count() {
        assert_eq!(
            parse_relative_scroll("-10"),
            Some(RelativeScroll { backward: true, amount: 10, unit: ScrollUnit::Lines })
        );
        assert_eq!(
            parse_relative_scroll("+5"),
            Some(RelativeScroll { backward: false, amount: 5, unit: ScrollUnit::Lines })
        );
    }

    #[test]
    fn parses_time_unit() {
        assert_eq!(
            parse_relative_scroll("-1d"),
            Some(RelativeScroll { backward: true, amount: 1, unit: ScrollUnit::Days })
        );
        assert_eq!(
            parse_relative_scroll("0M"),
            Some(RelativeScroll { backward: true, amount: 0, unit: ScrollUnit::Months })
        );
    }

    #[test]
    fn default_sign_is_backward() {
        assert_eq!(parse_relative_scroll("20").unwrap().backward, true);
    }

    #[test]
    fn horizontal_scroll_percent() {
        assert_eq!(parse_horizontal_scroll("50%"), Some(HorizontalScroll::Percent(50)));
        assert_eq!(parse_horizontal_scroll("10"), Some(HorizontalScroll::Cells(10)));
    }
}
