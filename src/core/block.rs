//! Block tokenizer
//!
//! A deliberately small host: it knows blank lines and paragraphs, and
//! dispatches every other construct to the rules registered on its
//! [`Ruler`]. Extensions such as the table rule plug in there.

use super::ruler::Ruler;
use super::state::BlockState;
use super::token::Token;

/// Host parser options
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParserOptions {
    /// Token nesting level at which block tokenization stops
    pub max_nesting: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions { max_nesting: 100 }
    }
}

/// Line-oriented block parser
pub struct BlockParser {
    pub ruler: Ruler,
    pub options: ParserOptions,
}

impl Default for BlockParser {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockParser {
    /// Create a parser with only the paragraph rule registered
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        let mut ruler = Ruler::new();
        ruler.push("paragraph", Box::new(paragraph), &[]);
        BlockParser { ruler, options }
    }

    /// Tokenize a whole source string
    pub fn parse(&self, src: &str) -> (Vec<Token>, Vec<crate::utils::error::ParseWarning>) {
        let mut state = BlockState::new(src, self);
        let end = state.line_max;
        self.tokenize(&mut state, 0, end);
        (state.tokens, state.warnings)
    }

    /// Run the rule chain over lines `[start_line, end_line)`
    pub fn tokenize(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize) {
        let rules = self.ruler.get_rules("");
        let mut line = start_line;

        while line < end_line {
            line = state.skip_empty_lines(line);
            state.line = line;
            if line >= end_line {
                break;
            }

            // Dedented content belongs to an enclosing block
            if state.s_count[line] < state.blk_indent {
                break;
            }

            if state.level >= self.options.max_nesting {
                state.line = end_line;
                break;
            }

            let prev_line = state.line;
            let matched = rules
                .iter()
                .any(|rule| rule.run(state, line, end_line, false) && state.line > prev_line);

            // The paragraph rule accepts any non-empty line, so this only
            // triggers when it has been disabled.
            if !matched {
                state.line = line + 1;
            }

            line = state.line;
            if line < end_line && state.is_empty(line) {
                line += 1;
                state.line = line;
            }
        }
    }
}

/// Paragraph rule: everything up to a blank line or an interrupting block
pub fn paragraph(state: &mut BlockState<'_>, start_line: usize, end_line: usize, _silent: bool) -> bool {
    let parser = state.parser;
    let terminators = parser.ruler.get_rules("paragraph");
    let mut next_line = start_line + 1;

    while next_line < end_line && !state.is_empty(next_line) {
        // Deeply indented lines are lazy continuations
        if state.s_count[next_line].saturating_sub(state.blk_indent) > 3 {
            next_line += 1;
            continue;
        }

        if terminators
            .iter()
            .any(|rule| rule.run(state, next_line, end_line, true))
        {
            break;
        }
        next_line += 1;
    }

    let content = state
        .get_lines(start_line, next_line, state.blk_indent, false)
        .trim()
        .to_string();

    state.line = next_line;

    let token = state.push("paragraph_open", "p", 1);
    token.map = Some([start_line, next_line]);

    let token = state.push("inline", "", 0);
    token.content = content;
    token.map = Some([start_line, next_line]);

    state.push("paragraph_close", "p", -1);

    true
}
