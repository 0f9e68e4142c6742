//! Text-level parsing primitives
//!
//! This module contains the pure scanning utilities shared by the mixin
//! engine and the each-loop evaluator: matching nested delimiter pairs and
//! splitting comma-separated argument lists. The host text is never parsed
//! into a grammar; these primitives are the only structure the compiler
//! relies on.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Editor-injected position metadata that must never leak into
    /// argument or array values. The marker swallows any immediately
    /// following run of tabs/spaces.
    static ref LINE_MARKER_RE: Regex =
        Regex::new(r"\[linemarker\].*?\[/linemarker\][ \t]*").unwrap();
}

/// Find the closing delimiter matching the first `open` at or after `from`.
///
/// Scans forward from byte index `from`, maintaining a depth counter:
/// depth increments on every `open`, decrements on every `close`. Returns
/// the byte index of the `close` that brings depth back to zero, or `None`
/// if the input ends first (unbalanced or still being typed).
///
/// Callers must treat `None` as "ran off the end of input" and fall back
/// to `text.len()` rather than failing: the editor frequently hands the
/// compiler transient, incomplete text mid-edit.
pub fn find_closing(text: &str, open: char, close: char, from: usize) -> Option<usize> {
    let mut depth: usize = 0;
    for (i, ch) in text.char_indices() {
        if i < from {
            continue;
        }
        if ch == open {
            depth += 1;
        } else if ch == close && depth > 0 {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}

/// Like [`find_closing`], but falls back to `text.len()` on unterminated
/// input so the caller can treat the rest of the text as the span.
pub fn closing_or_end(text: &str, open: char, close: char, from: usize) -> usize {
    find_closing(text, open, close, from).unwrap_or(text.len())
}

/// Split a comma-separated argument string into top-level items.
///
/// Commas nested inside balanced `(...)` or `[...]` spans do not split.
/// Line-marker annotations are stripped before splitting, and each item is
/// trimmed of surrounding whitespace. Empty input yields an empty list.
pub fn split_arguments(arg_text: &str) -> Vec<String> {
    let stripped = LINE_MARKER_RE.replace_all(arg_text, "");
    if stripped.trim().is_empty() {
        return Vec::new();
    }

    let mut items = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;
    for (i, ch) in stripped.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(stripped[start..i].trim().to_string());
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(stripped[start..].trim().to_string());

    items
}
