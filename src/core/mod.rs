//! Macro-expansion core
//!
//! This module implements the text-level expansion pipeline. The host text
//! (workshop script) is never parsed into a grammar; the two macro passes
//! rewrite it in place using the shared delimiter/argument primitives in
//! [`parse`].
//!
//! Control flow: raw source → mixin pass ([`mixins`]) → each-loop pass
//! ([`each`]) → expanded target text. The passes are independent of each
//! other's internals: by the time loops are evaluated, the text is
//! mixin-free.

pub mod each;
pub mod mixins;
pub mod parse;

use crate::constants::ConstantTable;
use crate::utils::error::CompileResult;

/// Compile a source text into macro-free workshop script.
///
/// Each call is a pure function of `(source, constants)`: there is no
/// state shared between invocations, and a failed call produces no partial
/// output.
pub fn compile(source: &str, constants: &ConstantTable) -> CompileResult<String> {
    let expanded = mixins::expand_mixins(source)?;
    each::evaluate_each_loops(&expanded, constants)
}
