//! # multimd
//!
//! Multi-Markdown table extension for a markdown-it style block parser.
//!
//! ## Features
//!
//! - **Captions**: `[Caption][label]` above or below the table, with anchor ids
//! - **Alignment**: `:--`, `--:`, `:-:` per column, `+` to mark wrapping columns
//! - **Spans**: empty cells extend to the left (`colspan`), `^^` extends upward (`rowspan`)
//! - **Multi-line rows**: a trailing `\` continues a row; cells are parsed as blocks
//! - **Bodies**: blank lines split the body into several `tbody` groups
//! - **Headerless tables**: the separator may open the table
//!
//! ## Usage Examples
//!
//! ### Rendering
//!
//! ```rust
//! use multimd::render;
//!
//! let html = render("| a | b |\n|---|--:|\n| 1 | 2 |");
//! assert!(html.starts_with("<table>\n<thead>"));
//! assert!(html.contains("<td style=\"text-align:right\">2</td>"));
//! ```
//!
//! ### Tokens and Options
//!
//! ```rust
//! use multimd::{parse_with_options, TableOptions};
//!
//! let options: TableOptions = "rowspan,no-multibody".parse().unwrap();
//! let tokens = parse_with_options("| a |\n|---|\n| 1 |\n| ^^ |", &options);
//!
//! let cell = tokens.iter().find(|t| t.kind == "td_open").unwrap();
//! assert_eq!(cell.attr_get("rowspan"), Some("2"));
//! ```

use lazy_static::lazy_static;
use regex::Regex;

/// Host block parser: state, rule registry, tokens and HTML rendering
pub mod core;

/// Feature modules - block rule extensions
pub mod features;

/// Utility modules
pub mod utils;

// Re-export core types
pub use crate::core::{paragraph, BlockParser, BlockRule, BlockState, ParserOptions, Ruler, Token};

// Re-export feature modules
pub use features::table;
pub use features::table::{register, TableOptions, TableRule};

// Re-export utilities
pub use utils::error::{MarkdownError, MarkdownResult, ParseWarning, RenderOutput};

lazy_static! {
    static ref LINE_ENDING_PATTERN: Regex = Regex::new(r"\r\n?").unwrap();
}

/// Normalize line endings to `\n` and replace NUL with U+FFFD
pub fn normalize(src: &str) -> String {
    LINE_ENDING_PATTERN
        .replace_all(src, "\n")
        .replace('\0', "\u{FFFD}")
}

/// Build a block parser with the table rule registered ahead of paragraphs
pub fn table_parser(options: &TableOptions) -> BlockParser {
    let mut parser = BlockParser::new();
    parser.ruler = Ruler::new();
    parser.ruler.push(
        "table",
        Box::new(TableRule::new(options.clone())),
        &["paragraph", "reference"],
    );
    parser.ruler.push("paragraph", Box::new(paragraph), &[]);
    parser
}

/// Tokenize Markdown with the default table options
pub fn parse(src: &str) -> Vec<Token> {
    parse_with_options(src, &TableOptions::default())
}

/// Tokenize Markdown with custom table options
pub fn parse_with_options(src: &str, options: &TableOptions) -> Vec<Token> {
    parse_with_diagnostics(src, options).0
}

/// Tokenize Markdown and return the parse warnings alongside the tokens
pub fn parse_with_diagnostics(src: &str, options: &TableOptions) -> (Vec<Token>, Vec<ParseWarning>) {
    let src = normalize(src);
    table_parser(options).parse(&src)
}

/// Render Markdown to HTML with the default table options
///
/// Inline content is escaped but not further interpreted.
pub fn render(src: &str) -> String {
    render_with_options(src, &TableOptions::default())
}

/// Render Markdown to HTML with custom table options
pub fn render_with_options(src: &str, options: &TableOptions) -> String {
    render_with_diagnostics(src, options).content
}

/// Render Markdown to HTML, keeping the warnings raised while parsing
pub fn render_with_diagnostics(src: &str, options: &TableOptions) -> RenderOutput {
    let (tokens, warnings) = parse_with_diagnostics(src, options);
    let html = crate::core::render(&tokens);

    if warnings.is_empty() {
        RenderOutput::new(html)
    } else {
        RenderOutput::with_warnings(html, warnings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("a\r\nb\rc\n"), "a\nb\nc\n");
        assert_eq!(normalize("a\0b"), "a\u{FFFD}b");
    }

    #[test]
    fn test_table_parser_rule_order() {
        let parser = table_parser(&TableOptions::default());
        assert_eq!(parser.ruler.names(), vec!["table", "paragraph"]);
    }

    #[test]
    fn test_crlf_table() {
        let tokens = parse("| a |\r\n|---|\r\n| 1 |\r\n");
        assert_eq!(tokens[0].kind, "table_open");
        assert_eq!(tokens[0].map, Some([0, 3]));
    }

    #[test]
    fn test_render_table() {
        let html = render("| a |\n|:-:|\n| 1 |");
        assert_eq!(
            html,
            "<table>\n<thead>\n<tr>\n<th style=\"text-align:center\">a</th>\n</tr>\n</thead>\n\
             <tbody>\n<tr>\n<td style=\"text-align:center\">1</td>\n</tr>\n</tbody>\n</table>\n"
        );
    }

    #[test]
    fn test_render_with_diagnostics() {
        let options = TableOptions {
            multiline: true,
            max_depth: 0,
            ..Default::default()
        };
        let output = render_with_diagnostics("| a |\n|---|\n| x | \\\n| y |", &options);
        assert!(output.has_warnings());
        assert!(output.content.contains("<td>x\ny</td>"));

        let output = render_with_diagnostics("plain", &TableOptions::default());
        assert!(!output.has_warnings());
        assert_eq!(output.content, "<p>plain</p>\n");
    }
}
