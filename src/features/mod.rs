//! Feature modules - block rule extensions
//!
//! Each extension registers itself on a [`BlockParser`](crate::core::BlockParser)
//! through a `register` function:
//! - Multi-Markdown tables (captions, spans, multi-line rows, several bodies)

pub mod table;

// Re-export commonly used types
pub use table::{Align, TableOptions, TableRule};
