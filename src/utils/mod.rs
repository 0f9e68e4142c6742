//! Utility modules
//!
//! This module contains utilities and helpers:
//! - Error types and result types

pub mod error;

// Re-export commonly used items
pub use error::{CompileError, CompileResult};
