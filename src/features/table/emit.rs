//! Token emission for a recognized table
//!
//! Turns the rows collected by the rule into the token stream:
//!
//! ```text
//! table_open
//!   caption_open inline caption_close
//!   thead_open | tbody_open
//!     tr_open (th_open | td_open) content (th_close | td_close) ... tr_close
//!   thead_close | tbody_close
//! table_close
//! ```
//!
//! Cell content is a single `inline` token, or for folded multi-line rows
//! the block tokens of a nested parse of the joined cell lines.

use super::rule::{ParsedTable, RowNode, GROUP_END, GROUP_START};
use super::TableOptions;
use crate::core::state::BlockState;
use crate::utils::error::ParseWarning;

/// Push the tokens of `table` and move `state.line` past it
pub fn emit_table(
    state: &mut BlockState<'_>,
    start_line: usize,
    table: ParsedTable,
    options: &TableOptions,
) {
    let ParsedTable {
        caption,
        separator,
        rows,
    } = table;
    let src = state.src;

    let table_open = state.tokens.len();
    state.push("table_open", "table", 1);

    if let Some(cap) = &caption {
        let token = state.push("caption_open", "caption", 1);
        token.map = Some(cap.map);
        if let Some(label) = &cap.label {
            token.attr_push("id", label.as_str());
        }
        if !cap.first {
            token.attr_push("style", "caption-side: bottom");
        }

        let token = state.push("inline", "", 0);
        token.content = cap.text.clone();
        token.map = Some(cap.map);

        state.push("caption_close", "caption", -1);
    }

    let mut group_open: Option<usize> = None;
    let mut group_end = 0;
    // Last opened cell per column in the current group, for `^^`
    let mut up_tokens: Vec<Option<usize>> = Vec::new();

    for row in &rows {
        let group_tag = row.kind.group_tag();
        let cell_tag = row.kind.cell_tag();

        if row.group & GROUP_START != 0 || group_open.is_none() {
            group_open = Some(state.tokens.len());
            let token = state.push(&format!("{}_open", group_tag), group_tag, 1);
            token.map = Some(row.map);
            up_tokens.clear();
        }

        let token = state.push("tr_open", "tr", 1);
        token.map = Some(row.map);

        // Cell an empty neighbour merges into
        let mut left: Option<usize> = None;

        for c in 0..row.bounds.cell_count() {
            let text = row.bounds.cell_text(src, c);

            if text.trim().is_empty() {
                if let Some(idx) = left {
                    state.tokens[idx].bump_span("colspan");
                }
                continue;
            }

            if options.rowspan && text.trim() == "^^" {
                if let Some(Some(idx)) = up_tokens.get(c) {
                    state.tokens[*idx].bump_span("rowspan");
                    left = None;
                    continue;
                }
            }

            let cell_open = state.tokens.len();
            let token = state.push(&format!("{}_open", cell_tag), cell_tag, 1);
            token.map = Some(row.map);
            if let Some(align) = separator.aligns.get(c).and_then(|a| a.as_css()) {
                token.attr_push("style", format!("text-align:{}", align));
            }
            if separator.wraps.get(c).copied().unwrap_or(false) {
                token.attr_push("class", "extend");
            }

            left = Some(cell_open);
            if up_tokens.len() <= c {
                up_tokens.resize(c + 1, None);
            }
            up_tokens[c] = Some(cell_open);

            if options.multiline && row.multiline && !row.mbounds.is_empty() {
                emit_multiline_cell(state, row, c, text, options);
            } else {
                let token = state.push("inline", "", 0);
                token.content = text.trim().to_string();
                token.map = Some(row.map);
            }

            state.push(&format!("{}_close", cell_tag), cell_tag, -1);
        }

        state.push("tr_close", "tr", -1);

        if row.group & GROUP_END != 0 {
            state.push(&format!("{}_close", group_tag), group_tag, -1);
            group_end = row.map[1];
            if let Some(idx) = group_open.take() {
                if let Some(map) = state.tokens[idx].map.as_mut() {
                    map[1] = group_end;
                }
            }
        }
    }

    let end_line = group_end
        .max(separator.map[1])
        .max(caption.as_ref().map_or(0, |cap| cap.map[1]));

    let token = state.push("table_close", "table", -1);
    token.map = Some([start_line, end_line]);
    state.tokens[table_open].map = Some([start_line, end_line]);

    state.line = end_line;
}

/// Emit column `c` of a folded multi-line row by tokenizing its joined lines.
///
/// The joined text is padded with empty lines so nested token maps point at
/// the source lines they came from.
fn emit_multiline_cell(
    state: &mut BlockState<'_>,
    row: &RowNode,
    c: usize,
    first: &str,
    options: &TableOptions,
) {
    let src = state.src;
    let mut lines: Vec<&str> = vec![""; row.map[0]];
    lines.push(first.trim_end());
    for bounds in row.mbounds.iter().skip(1) {
        // Shorter continuation lines simply contribute nothing to this column
        if c >= bounds.cell_count() {
            continue;
        }
        lines.push(bounds.cell_text(src, c).trim_end());
    }

    if state.depth >= options.max_depth {
        tracing::debug!(
            line = row.map[0],
            depth = state.depth,
            "multi-line cell at depth limit, emitting plain text"
        );
        state.warn(
            ParseWarning::new("multi-line table cell exceeds the nesting limit; kept as plain text")
                .at_line(row.map[0])
                .with_suggestion("raise TableOptions::max_depth"),
        );

        let content = lines[row.map[0]..]
            .iter()
            .map(|line| line.trim())
            .collect::<Vec<_>>()
            .join("\n");
        let token = state.push("inline", "", 0);
        token.content = content;
        token.map = Some(row.map);
        return;
    }

    let text = lines.join("\n");
    let parser = state.parser;
    let mut nested = BlockState::nested(&text, parser, state.level, state.depth + 1);
    let end = nested.line_max;
    parser.tokenize(&mut nested, row.map[0], end);

    state.tokens.append(&mut nested.tokens);
    state.warnings.append(&mut nested.warnings);
}
