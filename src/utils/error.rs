//! Error handling for Wsmix compilation
//!
//! This module provides a unified error type and result type for all
//! expansion operations. Compilation is fail-fast: the first structural
//! error aborts the whole run with no partial output.

use std::fmt;

/// Compilation error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileError {
    /// A `@mixin` definition has no discoverable identifier
    MissingMixinName,
    /// Two mixins share a name
    DuplicateMixin { name: String },
    /// An `@include` references a name with no matching definition
    UnknownMixin { name: String },
    /// A mixin's body includes the mixin itself (direct case only)
    SelfInclusion { name: String },
    /// A `@contents("name")` marker references a slot the caller never supplied
    UnknownSlot { slot: String, mixin: String },
    /// An each-loop's `Constant.*` reference does not resolve
    UnresolvedConstant { path: String },
    /// Include expansion exceeded the step limit (mutually recursive mixins)
    ExpansionLimit { limit: usize },
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::MissingMixinName => {
                write!(f, "Mixin is missing a name")
            }
            CompileError::DuplicateMixin { name } => {
                write!(f, "Mixin \"{}\" is already defined", name)
            }
            CompileError::UnknownMixin { name } => {
                write!(f, "Included a mixin that was not specified: \"{}\"", name)
            }
            CompileError::SelfInclusion { name } => {
                write!(f, "Can not include mixin \"{}\" in itself", name)
            }
            CompileError::UnknownSlot { slot, mixin } => {
                write!(f, "Slot \"{}\" not found in mixin \"{}\"", slot, mixin)
            }
            CompileError::UnresolvedConstant { path } => {
                write!(f, "Constant \"{}\" could not be resolved", path)
            }
            CompileError::ExpansionLimit { limit } => {
                write!(
                    f,
                    "Mixin expansion exceeded {} includes (mutually recursive mixins?)",
                    limit
                )
            }
        }
    }
}

impl std::error::Error for CompileError {}

/// Result type for compilation operations
pub type CompileResult<T> = Result<T, CompileError>;

// Convenience constructors for errors
impl CompileError {
    pub fn duplicate_mixin(name: impl Into<String>) -> Self {
        CompileError::DuplicateMixin { name: name.into() }
    }

    pub fn unknown_mixin(name: impl Into<String>) -> Self {
        CompileError::UnknownMixin { name: name.into() }
    }

    pub fn self_inclusion(name: impl Into<String>) -> Self {
        CompileError::SelfInclusion { name: name.into() }
    }

    pub fn unknown_slot(slot: impl Into<String>, mixin: impl Into<String>) -> Self {
        CompileError::UnknownSlot {
            slot: slot.into(),
            mixin: mixin.into(),
        }
    }

    pub fn unresolved_constant(path: impl Into<String>) -> Self {
        CompileError::UnresolvedConstant { path: path.into() }
    }
}
