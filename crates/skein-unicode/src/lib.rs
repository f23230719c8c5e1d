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

//! Byte-safe, codepoint-aware string helpers shared by the input editor,
//! history engine and search engine. Everything here operates on UTF-8
//! `&str`/byte offsets; nothing here knows about buffers or windows.

use unicode_segmentation::UnicodeSegmentation;

/// Characters that count as part of a "word" for input-editing purposes,
/// beyond alphanumerics. Mirrors the nickname-alphabet WeeChat uses so that
/// `delete_prev_word`/`move_prev_word` treat nicknames as single words.
const WORD_PUNCT: &[char] = &['_', '-', '[', ']', '\\', '`', '^', '{', '}', '|'];

/// Number of codepoints in `s`.
pub fn codepoint_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of the `n`th codepoint in `s` (clamped to `s.len()` if
/// `n >= codepoint_len(s)`).
pub fn byte_offset_of_codepoint(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map(|(i, _)| i).unwrap_or(s.len())
}

/// Codepoint index of the character starting at byte offset `k`. `k` must
/// lie on a char boundary.
pub fn codepoint_of_byte(s: &str, k: usize) -> usize {
    debug_assert!(s.is_char_boundary(k));
    s[..k].chars().count()
}

/// Byte offset of the char boundary preceding byte offset `p`, or `0` if
/// `p == 0`.
pub fn prev_char(s: &str, p: usize) -> usize {
    if p == 0 {
        return 0;
    }
    let mut i = p - 1;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Byte offset of the char boundary following byte offset `p` in `s`.
pub fn next_char(s: &str, p: usize) -> usize {
    if p >= s.len() {
        return s.len();
    }
    let mut i = p + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}

/// Byte length of the char starting at `p`.
pub fn char_size(s: &str, p: usize) -> usize {
    next_char(s, p) - p
}

/// True for letters, digits, and the nickname-alphabet punctuation set.
pub fn is_word_char_input(c: char) -> bool {
    c.is_alphanumeric() || WORD_PUNCT.contains(&c)
}

/// True for ASCII space or any Unicode whitespace codepoint.
pub fn is_whitespace_char(c: char) -> bool {
    c.is_whitespace()
}

/// Grapheme clusters of `s`, for cases (paste insertion, width accounting)
/// where codepoint granularity is too fine.
pub fn graphemes(s: &str) -> impl Iterator<Item = &str> {
    s.graphemes(true)
}

/// Replace invalid UTF-8 byte sequences in `bytes` with `'?'`, returning a
/// valid `String`. Used by `insert()`/paste confirmation, which must accept
/// arbitrary bytes from an fd read.
pub fn sanitize_utf8(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    let mut rest = bytes;
    loop {
        match std::str::from_utf8(rest) {
            Ok(valid) => {
                out.push_str(valid);
                break;
            }
            Err(e) => {
                let valid_len = e.valid_up_to();
                // SAFETY: [0, valid_len) was just validated by from_utf8.
                out.push_str(unsafe { std::str::from_utf8_unchecked(&rest[..valid_len]) });
                out.push('?');
                let skip = e.error_len().unwrap_or(1);
                rest = &rest[valid_len + skip..];
                if rest.is_empty() {
                    break;
                }
            }
        }
    }
    out
}

/// Matches `text` against a comma-separated pattern list, where a leading
/// `!` on a pattern negates it (exclusion wins regardless of position) and
/// `*` is a glob wildcard. Matches WeeChat's highlight/notify pattern
/// matching (`string_match_list`): the text matches iff at least one
/// inclusion pattern matches and no exclusion pattern matches.
pub fn match_list(text: &str, patterns: &str, case_sensitive: bool) -> bool {
    let mut matched = false;
    let mut excluded = false;
    for raw in patterns.split(',') {
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let (negate, pat) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        if glob_match(pat, text, case_sensitive) {
            if negate {
                excluded = true;
            } else {
                matched = true;
            }
        }
    }
    matched && !excluded
}

/// Minimal `*`-only glob matcher (no `?`/character classes, matching the
/// subset WeeChat's pattern matching actually uses).
fn glob_match(pattern: &str, text: &str, case_sensitive: bool) -> bool {
    let (pattern, text): (String, String) = if case_sensitive {
        (pattern.to_owned(), text.to_owned())
    } else {
        (pattern.to_lowercase(), text.to_lowercase())
    };
    glob_match_bytes(pattern.as_bytes(), text.as_bytes())
}

fn glob_match_bytes(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some(b'*') => {
            glob_match_bytes(&pattern[1..], text)
                || (!text.is_empty() && glob_match_bytes(pattern, &text[1..]))
        }
        Some(&c) => {
            !text.is_empty() && text[0] == c && glob_match_bytes(&pattern[1..], &text[1..])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codepoint_roundtrip() {
        let s = "a\u{00e9}\u{1F600}b";
        assert_eq!(codepoint_len(s), 4);
        for n in 0..=codepoint_len(s) {
            let off = byte_offset_of_codepoint(s, n);
            assert!(s.is_char_boundary(off));
            assert_eq!(codepoint_of_byte(s, off), n);
        }
    }

    #[test]
    fn prev_next_char_bounds() {
        let s = "h\u{00e9}llo";
        let mut p = 0;
        let mut count = 0;
        while p < s.len() {
            p = next_char(s, p);
            count += 1;
        }
        assert_eq!(count, codepoint_len(s));
        let mut p = s.len();
        let mut count = 0;
        while p > 0 {
            p = prev_char(s, p);
            count += 1;
        }
        assert_eq!(count, codepoint_len(s));
    }

    #[test]
    fn word_char_nickname_alphabet() {
        assert!(is_word_char_input('_'));
        assert!(is_word_char_input('['));
        assert!(is_word_char_input('a'));
        assert!(!is_word_char_input(' '));
        assert!(!is_word_char_input('.'));
    }

    #[test]
    fn sanitize_invalid_utf8() {
        let bytes = [b'a', 0xff, b'b'];
        assert_eq!(sanitize_utf8(&bytes), "a?b");
    }

    #[test]
    fn match_list_inclusion_exclusion() {
        assert!(match_list("alice", "al*", true));
        assert!(!match_list("alice", "al*,!alice", true));
        assert!(match_list("bob", "*", true));
        assert!(!match_list("Bob", "bob", true));
        assert!(match_list("Bob", "bob", false));
    }
}
