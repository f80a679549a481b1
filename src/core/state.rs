//! Block parser state
//!
//! Holds the source split into line marks and the token stream being built.
//! Offsets are byte offsets into `src`; indentation counts (`s_count`) are in
//! columns with tabs expanded to the next multiple of four.

use super::block::BlockParser;
use super::token::Token;
use crate::utils::error::ParseWarning;

/// Mutable state shared by all block rules during one tokenize run
pub struct BlockState<'a> {
    pub src: &'a str,
    /// The parser running this state, used for nested tokenization
    pub parser: &'a BlockParser,
    /// Line start offsets
    pub b_marks: Vec<usize>,
    /// Line end offsets (excluding the newline)
    pub e_marks: Vec<usize>,
    /// Bytes of leading whitespace per line
    pub t_shift: Vec<usize>,
    /// Leading whitespace per line, in columns
    pub s_count: Vec<usize>,
    /// Indent of the current block, in columns
    pub blk_indent: usize,
    /// Next line to be consumed
    pub line: usize,
    pub line_max: usize,
    /// Current token nesting level
    pub level: usize,
    /// Number of nested tokenize runs above this one
    pub depth: usize,
    pub tokens: Vec<Token>,
    pub warnings: Vec<ParseWarning>,
}

impl<'a> BlockState<'a> {
    /// Split `src` into lines and create an empty state
    pub fn new(src: &'a str, parser: &'a BlockParser) -> Self {
        let bytes = src.as_bytes();
        let len = bytes.len();

        let mut b_marks = Vec::new();
        let mut e_marks = Vec::new();
        let mut t_shift = Vec::new();
        let mut s_count = Vec::new();

        let mut start = 0;
        let mut indent = 0;
        let mut offset = 0;
        let mut indent_found = false;

        for pos in 0..len {
            let ch = bytes[pos];

            if !indent_found {
                match ch {
                    b' ' => {
                        indent += 1;
                        offset += 1;
                        continue;
                    }
                    b'\t' => {
                        indent += 1;
                        offset += 4 - offset % 4;
                        continue;
                    }
                    _ => indent_found = true,
                }
            }

            if ch == b'\n' || pos == len - 1 {
                let end = if ch == b'\n' { pos } else { pos + 1 };
                b_marks.push(start);
                e_marks.push(end);
                t_shift.push(indent);
                s_count.push(offset);

                indent_found = false;
                indent = 0;
                offset = 0;
                start = pos + 1;
            }
        }

        // Sentinel line so that lookahead at `line_max` stays in bounds
        b_marks.push(len);
        e_marks.push(len);
        t_shift.push(0);
        s_count.push(0);

        let line_max = b_marks.len() - 1;

        BlockState {
            src,
            parser,
            b_marks,
            e_marks,
            t_shift,
            s_count,
            blk_indent: 0,
            line: 0,
            line_max,
            level: 0,
            depth: 0,
            tokens: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a state for a nested tokenize run one level deeper
    pub fn nested(src: &'a str, parser: &'a BlockParser, level: usize, depth: usize) -> Self {
        let mut state = BlockState::new(src, parser);
        state.level = level;
        state.depth = depth;
        state
    }

    /// Push a new token and return it for further modification.
    ///
    /// Closing tokens lower the level before being stamped, opening tokens
    /// raise it afterwards.
    pub fn push(&mut self, kind: &str, tag: &str, nesting: i8) -> &mut Token {
        let mut token = Token::new(kind, tag, nesting);
        token.block = true;

        if nesting < 0 {
            self.level = self.level.saturating_sub(1);
        }
        token.level = self.level;
        if nesting > 0 {
            self.level += 1;
        }

        self.tokens.push(token);
        let last = self.tokens.len() - 1;
        &mut self.tokens[last]
    }

    /// Whether `line` holds only whitespace
    pub fn is_empty(&self, line: usize) -> bool {
        self.b_marks[line] + self.t_shift[line] >= self.e_marks[line]
    }

    /// First non-empty line at or after `from`
    pub fn skip_empty_lines(&self, from: usize) -> usize {
        let mut line = from;
        while line < self.line_max && self.is_empty(line) {
            line += 1;
        }
        line
    }

    /// Move `pos` back over spaces and tabs, never past `min`
    pub fn skip_spaces_back(&self, pos: usize, min: usize) -> usize {
        let bytes = self.src.as_bytes();
        let mut pos = pos;
        while pos > min {
            if !matches!(bytes[pos - 1], b' ' | b'\t') {
                return pos;
            }
            pos -= 1;
        }
        pos
    }

    /// Move `pos` forward over repetitions of `byte`
    pub fn skip_chars(&self, pos: usize, byte: u8) -> usize {
        let bytes = self.src.as_bytes();
        let mut pos = pos;
        while pos < bytes.len() && bytes[pos] == byte {
            pos += 1;
        }
        pos
    }

    /// Source text of lines `[begin, end)` with up to `indent` columns of
    /// leading whitespace stripped from each line
    pub fn get_lines(&self, begin: usize, end: usize, indent: usize, keep_last_lf: bool) -> String {
        let bytes = self.src.as_bytes();
        let mut out = String::new();

        for line in begin..end.min(self.line_max) {
            let mut first = self.b_marks[line];
            let mut column = 0;
            let line_end = self.e_marks[line];

            while first < line_end && column < indent {
                match bytes[first] {
                    b' ' => column += 1,
                    b'\t' => column += 4 - column % 4,
                    _ => break,
                }
                first += 1;
            }

            out.push_str(&self.src[first..line_end]);
            if line + 1 < end || keep_last_lf {
                out.push('\n');
            }
        }

        out
    }

    /// Record a non-fatal parse warning
    pub fn warn(&mut self, warning: ParseWarning) {
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_marks() {
        let parser = BlockParser::new();
        let state = BlockState::new("ab\n  cd\n\n\tx", &parser);

        assert_eq!(state.line_max, 4);
        assert_eq!(state.b_marks[..4], [0, 3, 8, 9]);
        assert_eq!(state.e_marks[..4], [2, 7, 8, 11]);
        assert_eq!(state.t_shift[..4], [0, 2, 0, 1]);
        assert_eq!(state.s_count[..4], [0, 2, 0, 4]);
    }

    #[test]
    fn test_trailing_newline_adds_no_line() {
        let parser = BlockParser::new();
        assert_eq!(BlockState::new("a\n", &parser).line_max, 1);
        assert_eq!(BlockState::new("", &parser).line_max, 0);
    }

    #[test]
    fn test_is_empty_and_skip() {
        let parser = BlockParser::new();
        let state = BlockState::new("a\n   \n\nb", &parser);
        assert!(!state.is_empty(0));
        assert!(state.is_empty(1));
        assert!(state.is_empty(2));
        assert_eq!(state.skip_empty_lines(1), 3);
    }

    #[test]
    fn test_skip_spaces_back() {
        let parser = BlockParser::new();
        let state = BlockState::new("ab  \t", &parser);
        assert_eq!(state.skip_spaces_back(5, 0), 2);
        assert_eq!(state.skip_spaces_back(5, 3), 3);
    }

    #[test]
    fn test_push_levels() {
        let parser = BlockParser::new();
        let mut state = BlockState::new("", &parser);
        state.push("paragraph_open", "p", 1);
        state.push("inline", "", 0);
        state.push("paragraph_close", "p", -1);

        let levels: Vec<usize> = state.tokens.iter().map(|t| t.level).collect();
        assert_eq!(levels, vec![0, 1, 0]);
        assert_eq!(state.level, 0);
    }

    #[test]
    fn test_get_lines_strips_indent() {
        let parser = BlockParser::new();
        let state = BlockState::new("  one\n    two\nthree", &parser);
        assert_eq!(state.get_lines(0, 2, 2, false), "one\n  two");
        assert_eq!(state.get_lines(1, 3, 0, true), "    two\nthree\n");
    }
}
