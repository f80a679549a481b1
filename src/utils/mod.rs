//! Utility modules
//!
//! This module contains error types, result types and parse warnings.

pub mod error;

// Re-export commonly used items
pub use error::{MarkdownError, MarkdownResult, ParseWarning, RenderOutput};
