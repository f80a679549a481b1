//! Core block-parsing engine
//!
//! This module contains the host the table extension plugs into:
//! - `block`: the block tokenizer loop and the paragraph rule
//! - `ruler`: the named, ordered rule registry
//! - `state`: line marks and the token stream
//! - `token`: the token type
//! - `renderer`: HTML output

pub mod block;
pub mod renderer;
pub mod ruler;
pub mod state;
pub mod token;

pub use block::{paragraph, BlockParser, ParserOptions};
pub use renderer::{escape_html, render};
pub use ruler::{BlockRule, Ruler};
pub use state::BlockState;
pub use token::Token;
