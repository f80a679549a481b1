//! Line classifiers for the table rule
//!
//! Each classifier comes in two flavours: an `is_*` predicate used while the
//! automaton decides transitions, and a `parse_*` function that extracts the
//! metadata once a line is known to match.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

use crate::core::state::BlockState;

lazy_static! {
    // Caption: [text] or [text][label]; the lazy text lets the label match
    static ref CAPTION_PATTERN: Regex = Regex::new(
        r"^\[(.+?)\](\[([^\[\]]+)\])?\s*$"
    ).unwrap();

    // Separator cell: optional colons around dashes or equals, optional wrap mark
    static ref SEPARATOR_CELL_PATTERN: Regex = Regex::new(
        r"^:?(-+|=+):?\+?$"
    ).unwrap();

    static ref NON_WORD_PATTERN: Regex = Regex::new(r"[^A-Za-z0-9_]+").unwrap();
}

/// Cell delimiters of one source line.
///
/// Each entry is the byte offset just past a delimiter, so cell `c` spans
/// `bounds[c]..bounds[c + 1] - 1`. Delimiters implied by the start and end of
/// the line are included.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Bounds(Vec<usize>);

impl Bounds {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of cells delimited by these bounds
    pub fn cell_count(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    /// Byte range of cell `c`
    pub fn cell_range(&self, c: usize) -> Option<Range<usize>> {
        let start = *self.0.get(c)?;
        let end = *self.0.get(c + 1)? - 1;
        Some(start..end)
    }

    /// Raw text of cell `c`, or `""` past the last cell
    pub fn cell_text<'s>(&self, src: &'s str, c: usize) -> &'s str {
        self.cell_range(c).map_or("", |range| &src[range])
    }
}

impl From<Vec<usize>> for Bounds {
    fn from(offsets: Vec<usize>) -> Self {
        Bounds(offsets)
    }
}

/// Column alignment from the separator line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    #[default]
    None,
    Left,
    Right,
    Center,
}

impl Align {
    /// Value for the CSS `text-align` property
    pub fn as_css(&self) -> Option<&'static str> {
        match self {
            Align::None => None,
            Align::Left => Some("left"),
            Align::Right => Some("right"),
            Align::Center => Some("center"),
        }
    }
}

/// Parsed caption line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caption {
    pub text: String,
    /// Anchor id, if labelled or auto-labelled
    pub label: Option<String>,
    pub map: [usize; 2],
    /// Whether the caption is the first line of the table
    pub first: bool,
}

/// Parsed separator line
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Separator {
    pub aligns: Vec<Align>,
    /// Columns marked with a trailing `+`
    pub wraps: Vec<bool>,
    pub map: [usize; 2],
}

/// Parsed table row line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMeta {
    pub bounds: Bounds,
    /// Line ends with a continuation backslash
    pub multiline: bool,
}

/// Offsets of every unescaped `|` outside code spans in `line`, scanning up
/// to `max` (exclusive).
///
/// A backtick toggles code state; an escaped backtick may close a code span
/// but never opens one. Runs of two or more backticks are skipped whole.
pub fn scan_bound_indices(state: &BlockState<'_>, line: usize, max: usize) -> Bounds {
    let bytes = state.src.as_bytes();
    let head = state.b_marks[line] + state.t_shift[line];
    let end = state.skip_spaces_back(max, head);

    let mut bounds = Vec::new();
    let mut escape = false;
    let mut code = false;
    let mut pos = head;

    while pos < end {
        match bytes[pos] {
            b'\\' => escape = true,
            b'`' => {
                let jump = state.skip_chars(pos, b'`') - 1;
                if jump > pos {
                    pos = jump;
                } else if code || !escape {
                    code = !code;
                }
                escape = false;
            }
            b'|' => {
                if !code && !escape {
                    bounds.push(pos + 1);
                }
                escape = false;
            }
            _ => escape = false,
        }
        pos += 1;
    }

    if bounds.is_empty() {
        return Bounds(bounds);
    }

    // Pad the implied delimiters before the first and after the last cell
    if bounds[0] > head + 1 {
        bounds.insert(0, head);
    }
    if bounds[bounds.len() - 1] < end {
        bounds.push(end + 1);
    }

    Bounds(bounds)
}

/// Lower-case `text` and drop everything outside `[A-Za-z0-9_]`
pub fn slugify(text: &str) -> String {
    NON_WORD_PATTERN
        .replace_all(&text.to_lowercase(), "")
        .into_owned()
}

fn line_content<'s>(state: &BlockState<'s>, line: usize) -> &'s str {
    let start = state.b_marks[line] + state.t_shift[line];
    &state.src[start..state.e_marks[line]]
}

pub fn is_caption(state: &BlockState<'_>, line: usize) -> bool {
    CAPTION_PATTERN.is_match(line_content(state, line))
}

/// Parse a caption line. Without `autolabel`, only an explicit label yields
/// an anchor id.
pub fn parse_caption(state: &BlockState<'_>, line: usize, autolabel: bool) -> Option<Caption> {
    let caps = CAPTION_PATTERN.captures(line_content(state, line))?;
    let text = caps.get(1)?.as_str().to_string();

    let label = match caps.get(3) {
        Some(explicit) => Some(slugify(explicit.as_str())),
        None if autolabel => Some(slugify(&text)),
        None => None,
    };

    Some(Caption {
        text,
        label,
        map: [line, line + 1],
        first: false,
    })
}

pub fn is_row(state: &BlockState<'_>, line: usize) -> bool {
    scan_bound_indices(state, line, state.e_marks[line]).len() >= 2
}

/// Parse a row line. With `multiline`, a trailing backslash marks a
/// continuation and is excluded from the cell bounds.
pub fn parse_row(state: &BlockState<'_>, line: usize, multiline: bool) -> Option<RowMeta> {
    let bounds = scan_bound_indices(state, line, state.e_marks[line]);
    if bounds.len() < 2 {
        return None;
    }

    if multiline {
        let start = state.b_marks[line] + state.t_shift[line];
        let end = state.skip_spaces_back(state.e_marks[line], start);
        if end > start && state.src.as_bytes()[end - 1] == b'\\' {
            let max = state.skip_spaces_back(end - 1, start);
            return Some(RowMeta {
                bounds: scan_bound_indices(state, line, max),
                multiline: true,
            });
        }
    }

    Some(RowMeta {
        bounds,
        multiline: false,
    })
}

pub fn is_separator(state: &BlockState<'_>, line: usize) -> bool {
    parse_separator(state, line).is_some()
}

/// Parse a separator line into per-column alignments and wrap flags.
///
/// Indented code wins over separators: a line indented four or more columns
/// past the block indent never matches.
pub fn parse_separator(state: &BlockState<'_>, line: usize) -> Option<Separator> {
    if state.s_count[line].saturating_sub(state.blk_indent) >= 4 {
        return None;
    }

    let bounds = scan_bound_indices(state, line, state.e_marks[line]);
    if bounds.len() < 2 {
        return None;
    }

    let mut separator = Separator {
        map: [line, line + 1],
        ..Default::default()
    };

    for c in 0..bounds.cell_count() {
        let text = bounds.cell_text(state.src, c).trim();
        if !SEPARATOR_CELL_PATTERN.is_match(text) {
            return None;
        }

        let wrap = text.ends_with('+');
        let body = if wrap { &text[..text.len() - 1] } else { text };

        let align = match (body.starts_with(':'), body.ends_with(':')) {
            (false, false) => Align::None,
            (false, true) => Align::Right,
            (true, false) => Align::Left,
            (true, true) => Align::Center,
        };

        separator.wraps.push(wrap);
        separator.aligns.push(align);
    }

    Some(separator)
}

pub fn is_empty_line(state: &BlockState<'_>, line: usize) -> bool {
    state.is_empty(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::BlockParser;

    fn cells(src: &str) -> Vec<String> {
        let parser = BlockParser::new();
        let state = BlockState::new(src, &parser);
        let bounds = scan_bound_indices(&state, 0, state.e_marks[0]);
        (0..bounds.cell_count())
            .map(|c| bounds.cell_text(src, c).to_string())
            .collect()
    }

    #[test]
    fn test_bounds_with_outer_pipes() {
        assert_eq!(cells("| a | b |"), vec![" a ", " b "]);
    }

    #[test]
    fn test_bounds_padded_without_outer_pipes() {
        assert_eq!(cells("a | b"), vec!["a ", " b"]);
        assert_eq!(cells("| a"), vec![" a"]);
        assert_eq!(cells("a |"), vec!["a "]);
    }

    #[test]
    fn test_bounds_ignore_trailing_spaces() {
        assert_eq!(cells("| a |   "), vec![" a "]);
    }

    #[test]
    fn test_escaped_pipe_is_not_a_bound() {
        assert_eq!(cells(r"| a \| b | c |"), vec![r" a \| b ", " c "]);
    }

    #[test]
    fn test_code_span_pipe_is_not_a_bound() {
        assert_eq!(cells("| `a|b` | c |"), vec![" `a|b` ", " c "]);
    }

    #[test]
    fn test_escaped_backtick_does_not_open_code() {
        assert_eq!(cells(r"| \`a | b |"), vec![r" \`a ", " b "]);
    }

    #[test]
    fn test_backtick_run_is_skipped() {
        // The double backtick neither opens nor closes a code span
        assert_eq!(cells("| ``a | b |"), vec![" ``a ", " b "]);
    }

    #[test]
    fn test_no_pipe_no_bounds() {
        let parser = BlockParser::new();
        let state = BlockState::new("plain text", &parser);
        assert!(scan_bound_indices(&state, 0, state.e_marks[0]).is_empty());
        assert!(!is_row(&state, 0));
    }

    #[test]
    fn test_single_pipe_is_not_a_row() {
        let parser = BlockParser::new();
        let state = BlockState::new("|", &parser);
        assert!(!is_row(&state, 0));
        assert!(!is_separator(&state, 0));
    }

    #[test]
    fn test_separator_alignments() {
        let parser = BlockParser::new();
        let state = BlockState::new("| :-- | --: | :-: | --- | ==+ |", &parser);
        let sep = parse_separator(&state, 0).unwrap();
        assert_eq!(
            sep.aligns,
            vec![Align::Left, Align::Right, Align::Center, Align::None, Align::None]
        );
        assert_eq!(sep.wraps, vec![false, false, false, false, true]);
        assert_eq!(sep.map, [0, 1]);
    }

    #[test]
    fn test_separator_wrap_with_alignment() {
        let parser = BlockParser::new();
        let state = BlockState::new("|:-:+|--:+|", &parser);
        let sep = parse_separator(&state, 0).unwrap();
        assert_eq!(sep.aligns, vec![Align::Center, Align::Right]);
        assert_eq!(sep.wraps, vec![true, true]);
    }

    #[test]
    fn test_separator_rejects_text() {
        let parser = BlockParser::new();
        let state = BlockState::new("| --- | abc |", &parser);
        assert!(!is_separator(&state, 0));
    }

    #[test]
    fn test_separator_rejects_mixed_marks() {
        let parser = BlockParser::new();
        let state = BlockState::new("| -=- |", &parser);
        assert!(!is_separator(&state, 0));
    }

    #[test]
    fn test_separator_indent_sensitive() {
        let parser = BlockParser::new();
        let state = BlockState::new("   |---|\n    |---|", &parser);
        assert!(is_separator(&state, 0));
        assert!(!is_separator(&state, 1));
    }

    #[test]
    fn test_caption_autolabel() {
        let parser = BlockParser::new();
        let state = BlockState::new("[Prices in 2024]", &parser);
        assert!(is_caption(&state, 0));

        let cap = parse_caption(&state, 0, true).unwrap();
        assert_eq!(cap.text, "Prices in 2024");
        assert_eq!(cap.label.as_deref(), Some("pricesin2024"));

        let cap = parse_caption(&state, 0, false).unwrap();
        assert_eq!(cap.label, None);
    }

    #[test]
    fn test_caption_explicit_label() {
        let parser = BlockParser::new();
        let state = BlockState::new("[Prices][Tab-Prices]  ", &parser);
        let cap = parse_caption(&state, 0, false).unwrap();
        assert_eq!(cap.text, "Prices");
        assert_eq!(cap.label.as_deref(), Some("tabprices"));
    }

    #[test]
    fn test_caption_rejects_trailing_text() {
        let parser = BlockParser::new();
        let state = BlockState::new("[link] and more", &parser);
        assert!(!is_caption(&state, 0));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "helloworld");
        assert_eq!(slugify("snake_case 42"), "snake_case42");
        assert_eq!(slugify("Ünïcode"), "ncode");
        assert_eq!(slugify("---"), "");
    }

    #[test]
    fn test_row_multiline_backslash() {
        let parser = BlockParser::new();
        let state = BlockState::new("| a | b | \\  \n| c | d |", &parser);

        let row = parse_row(&state, 0, true).unwrap();
        assert!(row.multiline);
        assert_eq!(row.bounds.cell_count(), 2);
        assert_eq!(row.bounds.cell_text(state.src, 1), " b ");

        let row = parse_row(&state, 0, false).unwrap();
        assert!(!row.multiline);
        assert_eq!(row.bounds.cell_count(), 3);

        let row = parse_row(&state, 1, true).unwrap();
        assert!(!row.multiline);
    }
}
