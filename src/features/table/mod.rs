//! Multi-Markdown Table Extension
//!
//! A block rule recognizing the extended table syntax:
//!
//! - captions before or after the table (`[Caption][label]`)
//! - column alignment and wrap markers on the separator (`:-:`, `--+`)
//! - column spans through empty cells (`| a || b |`)
//! - row spans through `^^` cells
//! - multi-line rows continued with a trailing backslash
//! - several bodies separated by blank lines, and headerless tables
//!
//! # Architecture
//!
//! ```text
//! Source lines -> Line classifiers -> DFA (collect rows) -> Fold multi-line rows -> Emit tokens
//! ```
//!
//! The automaton in [`dfa`] is generic; everything table specific lives in
//! [`scan`] (classifiers), [`rule`] (automaton setup and row collection) and
//! [`emit`] (token output).
//!
//! # Example
//!
//! ```
//! use multimd::core::BlockParser;
//! use multimd::features::table::{register, TableOptions};
//!
//! let mut parser = BlockParser::new();
//! register(&mut parser, TableOptions::default()).unwrap();
//!
//! let (tokens, _) = parser.parse("| a | b |\n|---|--:|\n| 1 | 2 |");
//! assert_eq!(tokens[0].kind, "table_open");
//! ```

pub mod dfa;
pub mod emit;
pub mod rule;
pub mod scan;


use std::str::FromStr;

use crate::core::block::BlockParser;
use crate::utils::error::{MarkdownError, MarkdownResult};

// Re-export public API
pub use dfa::{Alphabet, Dfa, State, DEAD};
pub use rule::{try_parse_table, RowKind, TableRule};
pub use scan::{slugify, Align, Bounds};

/// Table syntax options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TableOptions {
    /// Rows ending in `\` continue on the next line
    pub multiline: bool,
    /// `^^` cells extend the cell above
    pub rowspan: bool,
    /// The separator may be the first line of a table
    pub headerless: bool,
    /// Blank lines start a new `tbody`; otherwise they are absorbed
    pub multibody: bool,
    /// Derive a caption id from its text when no label is given
    pub autolabel: bool,
    /// Nesting limit for re-parsing multi-line cells
    pub max_depth: usize,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            multiline: false,
            rowspan: false,
            headerless: false,
            multibody: true,
            autolabel: true,
            max_depth: 8,
        }
    }
}

impl TableOptions {
    /// Every syntax extension enabled
    pub fn extended() -> Self {
        TableOptions {
            multiline: true,
            rowspan: true,
            headerless: true,
            ..Default::default()
        }
    }

    /// Plain tables: one body, captions only labelled explicitly
    pub fn strict() -> Self {
        TableOptions {
            multibody: false,
            autolabel: false,
            ..Default::default()
        }
    }

    fn flag_mut(&mut self, name: &str) -> Option<&mut bool> {
        match name {
            "multiline" => Some(&mut self.multiline),
            "rowspan" => Some(&mut self.rowspan),
            "headerless" => Some(&mut self.headerless),
            "multibody" => Some(&mut self.multibody),
            "autolabel" => Some(&mut self.autolabel),
            _ => None,
        }
    }
}

impl FromStr for TableOptions {
    type Err = MarkdownError;

    /// Parse a comma-separated option list such as `multiline,no-multibody,max-depth=4`.
    /// Unlisted flags keep their defaults.
    fn from_str(s: &str) -> MarkdownResult<Self> {
        let mut options = TableOptions::default();

        for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
            if let Some(value) = item.strip_prefix("max-depth=") {
                options.max_depth = value.trim().parse().map_err(|_| {
                    MarkdownError::invalid_option_with_suggestion(
                        item,
                        "max-depth expects a non-negative integer",
                    )
                })?;
                continue;
            }

            let (name, value) = match item.strip_prefix("no-") {
                Some(name) => (name, false),
                None => (item, true),
            };
            match options.flag_mut(name) {
                Some(flag) => *flag = value,
                None => {
                    return Err(MarkdownError::invalid_option_with_suggestion(
                        item,
                        "Known options: multiline, rowspan, headerless, multibody, autolabel, max-depth=N",
                    ))
                }
            }
        }

        Ok(options)
    }
}

/// Register the table rule on `parser`, ahead of paragraphs.
///
/// The rule also joins the `paragraph` and `reference` chains, so a table
/// may interrupt a paragraph.
pub fn register(parser: &mut BlockParser, options: TableOptions) -> MarkdownResult<()> {
    parser.ruler.before(
        "paragraph",
        "table",
        Box::new(TableRule::new(options)),
        &["paragraph", "reference"],
    )
}
