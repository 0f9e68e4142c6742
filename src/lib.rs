//! Wsmix - macro-expansion compiler for workshop script templates
//!
//! Wsmix powers an in-editor templating language layered on top of workshop
//! script code. Authors write otherwise-plain script text containing two
//! macro facilities, and the compiler expands both into plain target text:
//!
//! - **Mixins**: named, parameterized, reusable blocks with default
//!   arguments and slot-based content injection
//!   (`@mixin` / `@include` / `@contents` / `@slot`).
//! - **Each-loops**: compile-time iteration over inline array literals or
//!   `Constant.*` references into the host's constant store (`@each`).
//!
//! ```
//! use wsmix::{compile, ConstantTable};
//!
//! let source = "\
//! @mixin announce(text) { Big Message(All Players, Mixin.text); }
//! @each (n in [one, two]) {
//!     @include announce(Each.n);
//! }";
//!
//! let expanded = compile(source, &ConstantTable::new()).unwrap();
//! assert!(expanded.contains("Big Message(All Players, one);"));
//! assert!(expanded.contains("Big Message(All Players, two);"));
//! ```
//!
//! Compilation is synchronous, stateless and fail-fast: the first
//! structural error aborts the run with a [`CompileError`], and callers
//! must not rely on any prefix of output when that happens. Unterminated
//! delimiters are not errors; the editor routinely submits incomplete text
//! mid-keystroke, so those constructs fall back to end-of-input or are
//! left untouched.

pub mod constants;
pub mod core;
pub mod utils;

// Re-export the public surface
pub use crate::constants::{ConstantNode, ConstantTable, DEFAULT_LOCALE};
pub use crate::core::compile;
pub use crate::core::each::evaluate_each_loops;
pub use crate::core::mixins::{expand_mixins, mixin_names};
pub use crate::core::parse::{find_closing, split_arguments};
pub use crate::utils::error::{CompileError, CompileResult};
