//! Mixin definition and include expansion
//!
//! Mixins are named, parameterized blocks of workshop script text:
//!
//! ```text
//! @mixin heal(target, amount = 50) {
//!     Heal(Mixin.target, Event Player, Mixin.amount);
//! }
//!
//! @include heal(Victim, 100);
//! ```
//!
//! Expansion is two-pass: every `@mixin` definition in the source is
//! catalogued and removed first, then each `@include` call site is rewritten
//! in place. Collect-then-substitute is required so forward references and
//! out-of-order includes work. A mixin body may carry `@contents` markers,
//! filled from the call site's trailing `{ ... }` block, optionally routed
//! through named `@slot("name") { ... }` sub-blocks.

use fxhash::FxHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::ops::Range;

use crate::core::parse::{closing_or_end, find_closing, split_arguments};
use crate::utils::error::{CompileError, CompileResult};

/// Upper bound on `@include` rewrites per compile. Direct self-inclusion is
/// rejected up front, but mutual recursion between two mixins is purely
/// textual and cannot be caught by that check; the cap turns it into an
/// error instead of a hang.
const MAX_INCLUDE_EXPANSIONS: usize = 10_000;

lazy_static! {
    static ref MIXIN_TOKEN_RE: Regex = Regex::new(r"@mixin").unwrap();
    static ref MIXIN_NAME_RE: Regex = Regex::new(r"@mixin\s+(\w+)").unwrap();
    static ref INCLUDE_NAME_RE: Regex = Regex::new(r"@include\s+(\w+)").unwrap();
    static ref CONTENTS_RE: Regex = Regex::new(r#"@contents(?:\("(.+?)"\))?;?"#).unwrap();
    static ref SLOT_RE: Regex = Regex::new(r#"@slot\("([^"]+)"\)\s*\{"#).unwrap();
}

/// A declared mixin parameter with its default value (empty when
/// unspecified). Order is significant: call-site arguments bind by position.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Param {
    key: String,
    default: String,
}

/// A catalogued `@mixin` definition.
#[derive(Debug, Clone)]
struct MixinDef {
    params: Vec<Param>,
    body: String,
    /// Exact extent of the definition in the original source, captured
    /// before any mutation so removal order does not matter.
    span: Range<usize>,
    has_contents: bool,
}

/// List the distinct mixin names defined in `source`, in first-seen order.
///
/// Used by the host editor for completion; never fails, even on text that
/// would not compile.
pub fn mixin_names(source: &str) -> Vec<String> {
    let mut names = Vec::new();
    for caps in MIXIN_NAME_RE.captures_iter(source) {
        let name = caps[1].to_string();
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Resolve every `@mixin` definition and `@include` call site in `source`.
///
/// On success the returned text contains no `@mixin` or `@include` tokens.
pub fn expand_mixins(source: &str) -> CompileResult<String> {
    let mixins = collect_mixins(source)?;

    let mut text = source.to_string();
    remove_definitions(&mut text, &mixins);

    let mut steps = 0;
    while let Some(idx) = text.find("@include") {
        steps += 1;
        if steps > MAX_INCLUDE_EXPANSIONS {
            return Err(CompileError::ExpansionLimit {
                limit: MAX_INCLUDE_EXPANSIONS,
            });
        }
        expand_include_at(&mut text, idx, &mixins)?;
    }

    Ok(text)
}

/// Discovery pass: catalogue every `@mixin` definition in the source.
fn collect_mixins(source: &str) -> CompileResult<FxHashMap<String, MixinDef>> {
    let mut mixins: FxHashMap<String, MixinDef> = FxHashMap::default();

    for token in MIXIN_TOKEN_RE.find_iter(source) {
        let start = token.start();
        let closing = closing_or_end(source, '{', '}', start);
        let content = &source[start..closing];

        let name = match MIXIN_NAME_RE.captures(content) {
            Some(caps) => caps[1].to_string(),
            None => return Err(CompileError::MissingMixinName),
        };
        if mixins.contains_key(&name) {
            return Err(CompileError::duplicate_mixin(name));
        }

        let brace = content.find('{');
        let params = parse_params(content, brace);
        let body = match brace {
            Some(open) => content[open + 1..].trim().to_string(),
            None => String::new(),
        };
        let has_contents = body.contains("@contents");

        let span = start..(closing + 1).min(source.len());
        mixins.insert(
            name,
            MixinDef {
                params,
                body,
                span,
                has_contents,
            },
        );
    }

    Ok(mixins)
}

/// Parse the parenthesized parameter list of a definition, if one appears
/// before the body brace. Absent list means zero parameters.
fn parse_params(content: &str, brace: Option<usize>) -> Vec<Param> {
    let paren = match content.find('(') {
        Some(paren) if brace.map_or(true, |open| paren < open) => paren,
        _ => return Vec::new(),
    };
    let close = closing_or_end(content, '(', ')', paren).min(content.len());

    split_arguments(&content[paren + 1..close])
        .into_iter()
        .map(|item| match item.split_once('=') {
            Some((key, default)) => Param {
                key: key.trim().to_string(),
                default: default.trim().to_string(),
            },
            None => Param {
                key: item.trim().to_string(),
                default: String::new(),
            },
        })
        .collect()
}

/// Delete every catalogued definition span from the working text,
/// highest span first so earlier indices stay valid.
fn remove_definitions(text: &mut String, mixins: &FxHashMap<String, MixinDef>) {
    let mut spans: Vec<Range<usize>> = mixins.values().map(|def| def.span.clone()).collect();
    spans.sort_by(|a, b| b.start.cmp(&a.start));

    let mut cut_to = text.len();
    for span in spans {
        // Overlapping spans only arise from unterminated mid-edit text
        let end = span.end.min(cut_to);
        if span.start < end {
            text.replace_range(span.start..end, "");
            cut_to = span.start;
        }
    }
}

/// Rewrite the `@include` call at byte index `idx` in place.
fn expand_include_at(
    text: &mut String,
    idx: usize,
    mixins: &FxHashMap<String, MixinDef>,
) -> CompileResult<()> {
    let paren_close = closing_or_end(text, '(', ')', idx);
    let call_end = (paren_close + 1).min(text.len());
    let call = &text[idx..call_end];

    let name = INCLUDE_NAME_RE
        .captures(call)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default();
    let mixin = mixins
        .get(&name)
        .ok_or_else(|| CompileError::unknown_mixin(name.as_str()))?;

    for caps in INCLUDE_NAME_RE.captures_iter(&mixin.body) {
        if &caps[1] == name.as_str() {
            return Err(CompileError::self_inclusion(name));
        }
    }

    let args = match call.find('(') {
        Some(open) => {
            let close = closing_or_end(call, '(', ')', open);
            split_arguments(&call[open + 1..close.min(call.len())])
        }
        None => Vec::new(),
    };

    let mut replacement = mixin.body.clone();

    // Call-site block content for slot-bearing mixins: the block must
    // immediately follow the call parenthesis, otherwise an unrelated brace
    // further down the script would be swallowed.
    let mut span_end = call_end;
    let mut block_content: Option<&str> = None;
    if mixin.has_contents {
        let gap = &text[call_end..];
        let offset = gap.len() - gap.trim_start().len();
        if gap.trim_start().starts_with('{') {
            let block_open = call_end + offset;
            match find_closing(text, '{', '}', block_open) {
                Some(close) => {
                    block_content = Some(&text[block_open + 1..close]);
                    span_end = close + 1;
                }
                None => {
                    block_content = Some(&text[block_open + 1..]);
                    span_end = text.len();
                }
            }
        }
        let slots = collect_slot_contents(block_content.unwrap_or(""));
        replacement = substitute_contents(&replacement, &slots, &name)?;
    }

    replacement = bind_params(replacement, &mixin.params, &args);

    // Value-style calls (no slot content actually supplied) are
    // expression-like and may be include-terminated
    let supplied = block_content.map_or(false, |content| !content.is_empty());
    if !supplied && text[span_end..].starts_with(';') {
        span_end += 1;
    }

    text.replace_range(idx..span_end, &replacement);
    Ok(())
}

/// Partition call-site block content into named slots. Everything outside
/// explicit `@slot("name") { ... }` sub-blocks collects, in original
/// relative order, into the reserved `default` slot.
fn collect_slot_contents(content: &str) -> FxHashMap<String, String> {
    let mut slots: FxHashMap<String, String> = FxHashMap::default();
    let mut default_parts: Vec<&str> = Vec::new();
    let mut last = 0;

    for caps in SLOT_RE.captures_iter(content) {
        let marker = caps.get(0).expect("capture 0 always present");
        if marker.start() < last {
            continue;
        }
        let close = closing_or_end(content, '{', '}', marker.start());

        default_parts.push(&content[last..marker.start()]);
        slots.insert(
            caps[1].to_string(),
            content[marker.end()..close.min(content.len())].to_string(),
        );
        last = (close + 1).min(content.len());
    }
    default_parts.push(&content[last..]);

    slots.insert("default".to_string(), default_parts.concat());
    slots
}

/// Replace every `@contents` / `@contents("name")` marker (and its optional
/// trailing `;`) with the named slot's content. `@contents` alone reads the
/// `default` slot.
fn substitute_contents(
    body: &str,
    slots: &FxHashMap<String, String>,
    mixin_name: &str,
) -> CompileResult<String> {
    let mut out = String::with_capacity(body.len());
    let mut last = 0;

    for caps in CONTENTS_RE.captures_iter(body) {
        let marker = caps.get(0).expect("capture 0 always present");
        let slot = caps.get(1).map_or("default", |group| group.as_str());
        let content = slots
            .get(slot)
            .ok_or_else(|| CompileError::unknown_slot(slot, mixin_name))?;

        out.push_str(&body[last..marker.start()]);
        out.push_str(content);
        last = marker.end();
    }
    out.push_str(&body[last..]);

    Ok(out)
}

/// Bind declared parameters to positional arguments. Substitution runs
/// longest key first so one parameter name being a prefix of another cannot
/// cause a partial replacement. An argument that trims to nothing falls
/// back to the parameter default.
fn bind_params(body: String, params: &[Param], args: &[String]) -> String {
    let mut order: Vec<usize> = (0..params.len()).collect();
    order.sort_by(|&a, &b| params[b].key.len().cmp(&params[a].key.len()));

    let mut result = body;
    for position in order {
        let param = &params[position];
        let value = match args.get(position).map(|arg| arg.trim()) {
            Some(arg) if !arg.is_empty() => arg,
            _ => param.default.as_str(),
        };
        result = result.replace(&format!("Mixin.{}", param.key), value);
    }
    result
}
