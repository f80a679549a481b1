//! Table block rule
//!
//! Table structure is recognized by a [`Dfa`] over classified lines:
//!
//! ```text
//! caption? header+ separator (data+ empty)* data+ caption?
//! ```
//!
//! Symbols with a higher value take precedence when a line could be several
//! of them, so a separator is never mistaken for a header row. A state is the
//! union of the symbols it accepts:
//!
//! | state                      | caption | separator | header | data | empty |
//! |----------------------------|---------|-----------|--------|------|-------|
//! | `CAPTION \| HEADER` (start)|    x    |           |   x    |      |       |
//! | `HEADER`                   |         |           |   x    |      |       |
//! | `SEPARATOR \| HEADER`      |         |     x     |   x    |      |       |
//! | `CAPTION \| DATA`          |    x    |           |        |  x   |       |
//! | `CAPTION \| DATA \| EMPTY` |    x    |           |        |  x   |   x   |
//!
//! The action callback only collects metadata into a [`TableScratch`]; tokens
//! are emitted after the automaton accepted, so a failed attempt leaves the
//! block state untouched.

use std::cell::RefCell;

use super::dfa::{Alphabet, Dfa, Matcher, State, DEAD};
use super::emit::emit_table;
use super::scan::{self, Bounds, Caption, Separator};
use super::TableOptions;
use crate::core::ruler::BlockRule;
use crate::core::state::BlockState;

pub const CAPTION: Alphabet = 0x10000;
pub const SEPARATOR: Alphabet = 0x01000;
pub const HEADER: Alphabet = 0x00100;
pub const DATA: Alphabet = 0x00010;
pub const EMPTY: Alphabet = 0x00001;

/// Row opens a new `thead`/`tbody`
pub const GROUP_START: u8 = 0x10;
/// Row closes the current `thead`/`tbody`
pub const GROUP_END: u8 = 0x01;

/// Which kind of group a row belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
}

impl RowKind {
    /// Group tag (`thead` / `tbody`)
    pub fn group_tag(&self) -> &'static str {
        match self {
            RowKind::Header => "thead",
            RowKind::Data => "tbody",
        }
    }

    /// Cell tag (`th` / `td`)
    pub fn cell_tag(&self) -> &'static str {
        match self {
            RowKind::Header => "th",
            RowKind::Data => "td",
        }
    }
}

/// One table row as collected during recognition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowNode {
    pub bounds: Bounds,
    pub kind: RowKind,
    /// `GROUP_START` / `GROUP_END` bits
    pub group: u8,
    pub multiline: bool,
    /// Bounds of every physical line of a folded multi-line row, the row's
    /// own line first. Empty unless the row was folded.
    pub mbounds: Vec<Bounds>,
    pub map: [usize; 2],
}

/// Metadata collected by the action callback
#[derive(Debug, Default)]
pub struct TableScratch {
    pub caption: Option<Caption>,
    pub separator: Option<Separator>,
    pub rows: Vec<RowNode>,
    /// Group bit inherited by the next row
    pending_group: u8,
}

impl TableScratch {
    fn new() -> Self {
        TableScratch {
            pending_group: GROUP_START,
            ..Default::default()
        }
    }

    /// Close the group of the most recent row; the next row opens a new one
    fn close_group(&mut self) {
        if let Some(row) = self.rows.last_mut() {
            row.group |= GROUP_END;
        }
        self.pending_group = GROUP_START;
    }
}

/// A recognized table, ready for emission
#[derive(Debug)]
pub struct ParsedTable {
    pub caption: Option<Caption>,
    pub separator: Separator,
    pub rows: Vec<RowNode>,
}

/// The table block rule, registered under the name `table`
#[derive(Debug, Clone, Default)]
pub struct TableRule {
    pub options: TableOptions,
}

impl TableRule {
    pub fn new(options: TableOptions) -> Self {
        TableRule { options }
    }
}

impl BlockRule for TableRule {
    fn run(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
        try_parse_table(state, start_line, end_line, silent, &self.options)
    }
}

/// Try to recognize a table starting at `start_line`.
///
/// In silent mode only reports whether a table starts here. Otherwise emits
/// the table tokens and moves `state.line` past the table. A `false` return
/// never modifies `state`.
pub fn try_parse_table(
    state: &mut BlockState<'_>,
    start_line: usize,
    end_line: usize,
    silent: bool,
    options: &TableOptions,
) -> bool {
    if start_line + 2 > end_line {
        return false;
    }

    let Some(table) = recognize(state, start_line, end_line, options) else {
        return false;
    };

    if silent {
        return true;
    }

    tracing::debug!(
        start_line,
        rows = table.rows.len(),
        caption = table.caption.is_some(),
        "table recognized"
    );

    emit_table(state, start_line, table, options);
    true
}

/// Run the automaton and collect the table structure
fn recognize(
    state: &BlockState<'_>,
    start_line: usize,
    end_line: usize,
    options: &TableOptions,
) -> Option<ParsedTable> {
    let scratch = RefCell::new(TableScratch::new());

    let accepted = {
        let mut dfa = configure_dfa(state, options);
        dfa.set_actions(Box::new(|line: usize, _state: State, alphabet: Alphabet| {
            collect_line(&mut scratch.borrow_mut(), state, line, alphabet, start_line, options);
        }));
        dfa.execute(start_line, end_line)
    };

    let scratch = scratch.into_inner();
    if !accepted || scratch.rows.is_empty() {
        return None;
    }
    // A halt before the separator also ends in the dead state
    let separator = scratch.separator?;

    let mut rows = if options.multiline {
        fold_multiline_rows(scratch.rows)
    } else {
        scratch.rows
    };

    // Nothing after the last row tells it to close its group
    if let Some(last) = rows.last_mut() {
        last.group |= GROUP_END;
    }

    Some(ParsedTable {
        caption: scratch.caption,
        separator,
        rows,
    })
}

/// Build the automaton for the configured table flavour
fn configure_dfa<'a>(state: &'a BlockState<'_>, options: &TableOptions) -> Dfa<'a> {
    let mut dfa = Dfa::new();

    dfa.set_highest_alphabet(CAPTION);
    dfa.set_initial_state(CAPTION | HEADER);
    dfa.set_accept_states([CAPTION | DATA, CAPTION | DATA | EMPTY, DEAD]);
    dfa.set_match_alphabets([
        (CAPTION, Box::new(move |line: usize| scan::is_caption(state, line)) as Matcher<'a>),
        (SEPARATOR, Box::new(move |line: usize| scan::is_separator(state, line)) as Matcher<'a>),
        (HEADER, Box::new(move |line: usize| scan::is_row(state, line)) as Matcher<'a>),
        (DATA, Box::new(move |line: usize| scan::is_row(state, line)) as Matcher<'a>),
        (EMPTY, Box::new(move |line: usize| scan::is_empty_line(state, line)) as Matcher<'a>),
    ]);
    dfa.set_transitions([
        (CAPTION | HEADER, vec![(CAPTION, HEADER), (HEADER, SEPARATOR | HEADER)]),
        (HEADER, vec![(HEADER, SEPARATOR | HEADER)]),
        (SEPARATOR | HEADER, vec![(SEPARATOR, CAPTION | DATA), (HEADER, SEPARATOR | HEADER)]),
        (CAPTION | DATA, vec![(CAPTION, DEAD), (DATA, CAPTION | DATA | EMPTY)]),
        (
            CAPTION | DATA | EMPTY,
            vec![(CAPTION, DEAD), (DATA, CAPTION | DATA | EMPTY), (EMPTY, CAPTION | DATA)],
        ),
    ]);

    if options.headerless {
        // The separator may come first, before or after a caption
        dfa.set_initial_state(CAPTION | SEPARATOR | HEADER);
        dfa.update_transition(
            CAPTION | SEPARATOR | HEADER,
            [
                (CAPTION, SEPARATOR | HEADER),
                (SEPARATOR, CAPTION | DATA),
                (HEADER, SEPARATOR | HEADER),
            ],
        );
    }

    if !options.multibody {
        // Blank lines between data rows stay inside the one body
        dfa.update_transition(CAPTION | DATA | EMPTY, [(EMPTY, CAPTION | DATA | EMPTY)]);
    }

    dfa
}

/// Action callback: record what the automaton matched at `line`
fn collect_line(
    scratch: &mut TableScratch,
    state: &BlockState<'_>,
    line: usize,
    alphabet: Alphabet,
    start_line: usize,
    options: &TableOptions,
) {
    match alphabet {
        CAPTION => {
            if scratch.caption.is_some() {
                return;
            }
            scratch.caption = scan::parse_caption(state, line, options.autolabel).map(|mut cap| {
                cap.first = line == start_line;
                cap
            });
        }
        SEPARATOR => {
            scratch.separator = scan::parse_separator(state, line);
            scratch.close_group();
        }
        HEADER | DATA => {
            let Some(meta) = scan::parse_row(state, line, options.multiline) else {
                return;
            };
            let kind = if alphabet == HEADER {
                RowKind::Header
            } else {
                RowKind::Data
            };
            scratch.rows.push(RowNode {
                bounds: meta.bounds,
                kind,
                group: scratch.pending_group,
                multiline: meta.multiline,
                mbounds: Vec::new(),
                map: [line, line + 1],
            });
            scratch.pending_group = 0;
        }
        EMPTY if options.multibody => scratch.close_group(),
        _ => {}
    }
}

/// Fold multi-line rows.
///
/// A run starts at a row ending in a continuation backslash and ends at the
/// next row without one; the whole run becomes the opening row, with the
/// bounds of every physical line in `mbounds`. A run that never ends is left
/// as separate rows.
///
/// A run may swallow a group boundary (a separator or blank line); the row
/// after such a run opens the next group.
pub fn fold_multiline_rows(rows: Vec<RowNode>) -> Vec<RowNode> {
    let mut folded: Vec<RowNode> = Vec::with_capacity(rows.len());
    let mut open: Option<(RowNode, Vec<RowNode>)> = None;

    for row in rows {
        match open.take() {
            None if row.multiline => open = Some((row, Vec::new())),
            None => push_folded(&mut folded, row),
            Some((head, mut rest)) => {
                let closes = !row.multiline;
                rest.push(row);
                if closes {
                    push_folded(&mut folded, merge_run(head, rest));
                } else {
                    open = Some((head, rest));
                }
            }
        }
    }

    if let Some((head, rest)) = open {
        push_folded(&mut folded, head);
        for row in rest {
            push_folded(&mut folded, row);
        }
    }

    folded
}

fn push_folded(folded: &mut Vec<RowNode>, mut row: RowNode) {
    if folded.last().map_or(false, |prev| prev.group & GROUP_END != 0) {
        row.group |= GROUP_START;
    }
    folded.push(row);
}

fn merge_run(mut head: RowNode, rest: Vec<RowNode>) -> RowNode {
    head.mbounds.push(head.bounds.clone());

    for row in rest {
        head.group |= row.group & GROUP_END;
        head.map[1] = row.map[1];
        head.mbounds.push(row.bounds);
    }

    head
}
