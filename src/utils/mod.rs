//! Utility modules for the XuLang compiler.
//!
//! This module contains common utilities used throughout the codebase:
//! - Error types and diagnostics
//! - Source location tracking
//! - Indented code output

pub mod errors;
pub mod location;
pub mod pretty;

// Re-exports
pub use errors::*;
pub use location::{SourceLocation, SourceMap, Span};
pub use pretty::CodeFormatter;
