//! Line-driven deterministic automaton
//!
//! The automaton knows nothing about tables. Its alphabet is a set of
//! disjoint bit flags; a state is the union of the symbols it still accepts.
//! On every line the candidate symbols of the current state are tried from the
//! highest value down, the first matching one is reported to the action
//! callback and selects the next state. A line matching no symbol, or a
//! missing transition, leads to the dead state `0`, which halts the run.

use std::collections::BTreeMap;

use fxhash::{FxHashMap, FxHashSet};

/// A state: the union of the alphabet symbols it accepts
pub type State = u32;

/// A single alphabet symbol (one bit flag)
pub type Alphabet = u32;

/// The reserved dead state
pub const DEAD: State = 0;

/// Line predicate deciding whether a symbol matches at a line
pub type Matcher<'a> = Box<dyn Fn(usize) -> bool + 'a>;

/// Callback invoked once per visited line with `(line, state, symbol)`.
/// `symbol` is `0` when nothing matched.
pub type Action<'a> = Box<dyn FnMut(usize, State, Alphabet) + 'a>;

/// Generic line automaton.
///
/// Configuration is the caller's responsibility: a state that claims a
/// symbol without a registered matcher simply never matches it, and a missing
/// transition is a dead end. Neither is reported as an error.
#[derive(Default)]
pub struct Dfa<'a> {
    highest_alphabet: Alphabet,
    initial_state: State,
    accept_states: FxHashSet<State>,
    match_alphabets: BTreeMap<Alphabet, Matcher<'a>>,
    transitions: FxHashMap<State, FxHashMap<Alphabet, State>>,
    actions: Option<Action<'a>>,
}

impl<'a> Dfa<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Largest symbol value considered while matching
    pub fn set_highest_alphabet(&mut self, alphabet: Alphabet) {
        self.highest_alphabet = alphabet;
    }

    pub fn set_initial_state(&mut self, state: State) {
        self.initial_state = state;
    }

    pub fn set_accept_states(&mut self, states: impl IntoIterator<Item = State>) {
        self.accept_states = states.into_iter().collect();
    }

    pub fn set_match_alphabets(
        &mut self,
        matchers: impl IntoIterator<Item = (Alphabet, Matcher<'a>)>,
    ) {
        self.match_alphabets = matchers.into_iter().collect();
    }

    /// Replace the whole transition table
    pub fn set_transitions<I, T>(&mut self, transitions: I)
    where
        I: IntoIterator<Item = (State, T)>,
        T: IntoIterator<Item = (Alphabet, State)>,
    {
        self.transitions = transitions
            .into_iter()
            .map(|(state, edges)| (state, edges.into_iter().collect()))
            .collect();
    }

    /// Merge `edges` into the transitions leaving `state`.
    ///
    /// Symbols present in `edges` overwrite existing ones; other symbols of
    /// `state` are kept.
    pub fn update_transition(
        &mut self,
        state: State,
        edges: impl IntoIterator<Item = (Alphabet, State)>,
    ) {
        self.transitions.entry(state).or_default().extend(edges);
    }

    pub fn set_actions(&mut self, actions: Action<'a>) {
        self.actions = Some(actions);
    }

    /// Symbol matched at `line` under `state`, or `0`
    fn match_line(&self, state: State, line: usize) -> Alphabet {
        self.match_alphabets
            .range(..=self.highest_alphabet)
            .rev()
            .find(|(alphabet, matcher)| state & **alphabet != 0 && matcher(line))
            .map_or(0, |(alphabet, _)| *alphabet)
    }

    /// Walk lines `[start_line, end_line)` and report whether the run ended
    /// in an accept state.
    pub fn execute(&mut self, start_line: usize, end_line: usize) -> bool {
        let mut state = self.initial_state;
        let mut step = start_line;

        while state != DEAD && step < end_line {
            let alphabet = self.match_line(state, step);

            if let Some(actions) = self.actions.as_mut() {
                actions(step, state, alphabet);
            }

            if alphabet == 0 {
                tracing::trace!(line = step, state, "dfa halted: no symbol matched");
                state = DEAD;
                break;
            }

            state = self
                .transitions
                .get(&state)
                .and_then(|edges| edges.get(&alphabet))
                .copied()
                .unwrap_or(DEAD);
            step += 1;
        }

        self.accept_states.contains(&state)
    }
}
