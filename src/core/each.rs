//! Compile-time each-loop expansion
//!
//! ```text
//! @each (hero in [Ana, Baptiste, Brigitte]) {
//!     Small Message(All Players, Each.hero);
//! }
//! ```
//!
//! The body is re-emitted once per element, with `Each.<itemVar>` replaced
//! by the element's literal text and `Each.<indexVar>` (default `i`) by the
//! 0-based position. Sources are inline array literals or dotted
//! `Constant.*` references into the host's constant table. Bodies may
//! contain further `@each` constructs; an inner loop is fully resolved,
//! including its own nested loops, before it is spliced into the outer
//! iteration's copy, so the inner source may reference the outer bound
//! variable.

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::ConstantTable;
use crate::core::parse::{find_closing, split_arguments};
use crate::utils::error::{CompileError, CompileResult};

const CONSTANT_PREFIX: &str = "Constant.";

lazy_static! {
    /// `<itemVar>[, <indexVar>] in <source>` inside the header parens.
    static ref EACH_HEADER_RE: Regex =
        Regex::new(r"(?s)^\s*(\w+)\s*(?:,\s*(\w+)\s*)?\s+in\s+(.+)$").unwrap();
}

/// Resolve every `@each` construct in `source` against `constants`.
///
/// On success the returned text contains no `@each` tokens and no
/// unresolved `Each.*` references within expanded regions. Structurally
/// incomplete constructs (mid-edit text) are left untouched rather than
/// rejected.
pub fn evaluate_each_loops(source: &str, constants: &ConstantTable) -> CompileResult<String> {
    let mut text = source.to_string();
    let mut search_from = 0;

    while let Some(found) = text[search_from..].find("@each") {
        let idx = search_from + found;
        match expand_loop_at(&text, idx, constants)? {
            Some((end, expansion)) => {
                text.replace_range(idx..end, &expansion);
                // The expansion is fully resolved; skip past it
                search_from = idx + expansion.len();
            }
            // Incomplete construct: leave it and keep scanning
            None => search_from = idx + "@each".len(),
        }
    }

    Ok(text)
}

/// Expand the `@each` construct whose token starts at byte index `idx`.
///
/// Returns the end of the construct's span in `text` together with its
/// full expansion, or `None` when the construct is structurally incomplete
/// and should be left as-is.
fn expand_loop_at(
    text: &str,
    idx: usize,
    constants: &ConstantTable,
) -> CompileResult<Option<(usize, String)>> {
    // Header: @each (<itemVar>[, <indexVar>] in <source>)
    let after_token = idx + "@each".len();
    let gap = &text[after_token..];
    if !gap.trim_start().starts_with('(') {
        return Ok(None);
    }
    let paren_open = after_token + (gap.len() - gap.trim_start().len());
    let paren_close = match find_closing(text, '(', ')', paren_open) {
        Some(close) => close,
        None => return Ok(None),
    };

    let header = &text[paren_open + 1..paren_close];
    let caps = match EACH_HEADER_RE.captures(header) {
        Some(caps) => caps,
        None => return Ok(None),
    };
    let item_var = caps.get(1).map_or("", |group| group.as_str());
    let index_var = caps.get(2).map_or("i", |group| group.as_str());
    let source_expr = caps.get(3).map_or("", |group| group.as_str()).trim();

    // Body: the following { ... }, falling back to end-of-input
    let tail = &text[paren_close + 1..];
    if !tail.trim_start().starts_with('{') {
        return Ok(None);
    }
    let body_open = paren_close + 1 + (tail.len() - tail.trim_start().len());
    let (body, end) = match find_closing(text, '{', '}', body_open) {
        Some(close) => (&text[body_open + 1..close], close + 1),
        None => (&text[body_open + 1..], text.len()),
    };

    let elements = resolve_source(source_expr, constants)?;

    let mut expansion = String::new();
    for (position, element) in elements.iter().enumerate() {
        let mut copy = body.to_string();
        let index_text = position.to_string();

        // Longer binding first, in case one variable name is a prefix of
        // the other
        let mut bindings = [
            (item_var, element.as_str()),
            (index_var, index_text.as_str()),
        ];
        bindings.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        for (var, value) in bindings {
            copy = copy.replace(&format!("Each.{}", var), value);
        }

        expansion.push_str(&evaluate_each_loops(&copy, constants)?);
    }

    Ok(Some((end, expansion)))
}

/// Resolve a loop source expression to its ordered element tokens.
fn resolve_source(source_expr: &str, constants: &ConstantTable) -> CompileResult<Vec<String>> {
    if let Some(rest) = source_expr.strip_prefix('[') {
        let inner = match find_closing(source_expr, '[', ']', 0) {
            Some(close) => &source_expr[1..close],
            None => rest,
        };
        return Ok(split_arguments(inner));
    }

    if let Some(path) = source_expr.strip_prefix(CONSTANT_PREFIX) {
        return constants
            .values_at(path.trim())
            .ok_or_else(|| CompileError::unresolved_constant(source_expr));
    }

    Err(CompileError::unresolved_constant(source_expr))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Whitespace-insensitive comparison helper, because loop bodies carry
    /// the author's indentation through expansion.
    fn collapsed(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    fn evaluate(source: &str) -> String {
        evaluate_each_loops(source, &ConstantTable::new()).unwrap()
    }

    #[test]
    fn test_simple_loop() {
        let input = "@each (thing in [one, two, three]) {\n    Each.thing;\n}";
        assert_eq!(collapsed(&evaluate(input)), "one; two; three;");
    }

    #[test]
    fn test_default_index_variable() {
        let input = "@each (thing in [one, two, three]) {\n    Each.thing = Each.i;\n}";
        assert_eq!(collapsed(&evaluate(input)), "one = 0; two = 1; three = 2;");
    }

    #[test]
    fn test_renamed_index_variable() {
        let input = "@each (thing, j in [one, two, three]) {\n    Each.thing = Each.j;\n}";
        assert_eq!(collapsed(&evaluate(input)), "one = 0; two = 1; three = 2;");
    }

    #[test]
    fn test_constant_source() {
        let constants = ConstantTable::from_json_str(
            r#"{ "Test": {
                "One": { "en-US": "one" },
                "Two": { "en-US": "two" },
                "Three": { "en-US": "three" }
            }}"#,
        )
        .unwrap();
        let input = "@each (thing in Constant.Test) {\n    Each.thing;\n}";
        let result = evaluate_each_loops(input, &constants).unwrap();
        assert_eq!(collapsed(&result), "one; two; three;");
    }

    #[test]
    fn test_constant_source_matches_inline_literal() {
        let constants = ConstantTable::from_json_str(
            r#"{ "Group": { "Path": {
                "One": { "en-US": "one" },
                "Two": { "en-US": "two" },
                "Three": { "en-US": "three" }
            }}}"#,
        )
        .unwrap();
        let by_constant =
            evaluate_each_loops("@each (v in Constant.Group.Path) { Each.v; }", &constants)
                .unwrap();
        let by_literal =
            evaluate_each_loops("@each (v in [one, two, three]) { Each.v; }", &constants).unwrap();
        assert_eq!(by_constant, by_literal);
    }

    #[test]
    fn test_unresolved_constant_is_error() {
        let input = "@each (thing in Constant.Missing) { Each.thing; }";
        assert_eq!(
            evaluate_each_loops(input, &ConstantTable::new()),
            Err(CompileError::unresolved_constant("Constant.Missing"))
        );
    }

    #[test]
    fn test_multiline_array_literal() {
        let input = "@each (thing in [\n    one,\n    two,\n    three\n]) {\n    Each.thing;\n}";
        assert_eq!(collapsed(&evaluate(input)), "one; two; three;");
    }

    #[test]
    fn test_sibling_loops_are_independent() {
        let input = "\
@each (thing in [loop1]) {
    Each.thing;
}

@each (thing in [loop2]) {
    Each.thing;
}";
        assert_eq!(collapsed(&evaluate(input)), "loop1; loop2;");
    }

    #[test]
    fn test_nested_loop_over_outer_variable() {
        let input = "\
@each (innerArray in [[a, b], [c, d]]) {
    @each (value in Each.innerArray) {
        Each.value;
    }
    ---
}";
        assert_eq!(collapsed(&evaluate(input)), "a; b; --- c; d; ---");
    }

    #[test]
    fn test_empty_array_yields_nothing() {
        let input = "before\n@each (thing in []) { Each.thing; }\nafter";
        assert_eq!(collapsed(&evaluate(input)), "before after");
    }

    #[test]
    fn test_unterminated_body_runs_to_end_of_input() {
        let input = "@each (thing in [a, b]) {\n    Each.thing;";
        assert_eq!(collapsed(&evaluate(input)), "a; b;");
    }

    #[test]
    fn test_incomplete_construct_is_left_untouched() {
        // Mid-edit text: no header parens yet
        let input = "@each ";
        assert_eq!(evaluate(input), "@each ");

        let input = "@each (thing in [a, b])";
        assert_eq!(evaluate(input), "@each (thing in [a, b])");
    }

    #[test]
    fn test_index_variable_prefix_of_item_variable() {
        // "v" (index) is a prefix of "vx" (item); longest binding must win
        let input = "@each (vx, v in [a, b]) { Each.vx = Each.v; }";
        assert_eq!(collapsed(&evaluate(input)), "a = 0; b = 1;");
    }
}
