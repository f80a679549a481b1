//! Named block-rule registry
//!
//! Rules are kept in insertion order and looked up by name. Besides the main
//! chain, a rule may list alternation chains (e.g. `paragraph`): the rules in
//! such a chain are the ones a paragraph asks, in silent mode, whether they
//! want to interrupt it.

use indexmap::IndexMap;

use super::state::BlockState;
use crate::utils::error::{MarkdownError, MarkdownResult};

/// A block-level parsing rule.
///
/// Returns `true` when the rule consumed lines starting at `start_line`; in
/// that case it must have advanced `state.line`. In silent mode the rule only
/// reports whether it would match and leaves `state` untouched.
pub trait BlockRule: Send + Sync {
    fn run(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool)
        -> bool;
}

impl<F> BlockRule for F
where
    F: Fn(&mut BlockState<'_>, usize, usize, bool) -> bool + Send + Sync,
{
    fn run(&self, state: &mut BlockState<'_>, start_line: usize, end_line: usize, silent: bool) -> bool {
        self(state, start_line, end_line, silent)
    }
}

struct RuleEntry {
    rule: Box<dyn BlockRule>,
    alt: Vec<String>,
    enabled: bool,
}

/// Ordered registry of block rules
#[derive(Default)]
pub struct Ruler {
    rules: IndexMap<String, RuleEntry>,
}

impl Ruler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule to the end of the chain
    pub fn push(&mut self, name: &str, rule: Box<dyn BlockRule>, alt: &[&str]) {
        self.rules.insert(name.to_string(), RuleEntry::new(rule, alt));
    }

    /// Replace the rule registered under `name`, keeping its position
    pub fn at(&mut self, name: &str, rule: Box<dyn BlockRule>, alt: &[&str]) -> MarkdownResult<()> {
        let entry = self
            .rules
            .get_mut(name)
            .ok_or_else(|| MarkdownError::rule_not_found(name))?;
        *entry = RuleEntry::new(rule, alt);
        Ok(())
    }

    /// Insert `name` right before the rule `before_name`
    pub fn before(
        &mut self,
        before_name: &str,
        name: &str,
        rule: Box<dyn BlockRule>,
        alt: &[&str],
    ) -> MarkdownResult<()> {
        let index = self.index_of(before_name)?;
        self.insert_at(index, name, rule, alt);
        Ok(())
    }

    /// Insert `name` right after the rule `after_name`
    pub fn after(
        &mut self,
        after_name: &str,
        name: &str,
        rule: Box<dyn BlockRule>,
        alt: &[&str],
    ) -> MarkdownResult<()> {
        let index = self.index_of(after_name)?;
        self.insert_at(index + 1, name, rule, alt);
        Ok(())
    }

    pub fn enable(&mut self, name: &str) -> MarkdownResult<()> {
        self.set_enabled(name, true)
    }

    pub fn disable(&mut self, name: &str) -> MarkdownResult<()> {
        self.set_enabled(name, false)
    }

    /// Enabled rules of a chain, in order. The empty name is the main chain.
    pub fn get_rules(&self, chain: &str) -> Vec<&dyn BlockRule> {
        self.rules
            .values()
            .filter(|entry| entry.enabled)
            .filter(|entry| chain.is_empty() || entry.alt.iter().any(|a| a == chain))
            .map(|entry| entry.rule.as_ref())
            .collect()
    }

    /// Registered rule names, in order
    pub fn names(&self) -> Vec<&str> {
        self.rules.keys().map(|k| k.as_str()).collect()
    }

    fn index_of(&self, name: &str) -> MarkdownResult<usize> {
        self.rules
            .get_index_of(name)
            .ok_or_else(|| MarkdownError::rule_not_found(name))
    }

    fn insert_at(&mut self, index: usize, name: &str, rule: Box<dyn BlockRule>, alt: &[&str]) {
        // Re-registering a name moves it, so drop the old slot first
        let index = match self.rules.get_index_of(name) {
            Some(old) => {
                self.rules.shift_remove(name);
                if old < index {
                    index - 1
                } else {
                    index
                }
            }
            None => index,
        };
        self.rules
            .shift_insert(index, name.to_string(), RuleEntry::new(rule, alt));
    }

    fn set_enabled(&mut self, name: &str, enabled: bool) -> MarkdownResult<()> {
        let entry = self
            .rules
            .get_mut(name)
            .ok_or_else(|| MarkdownError::rule_not_found(name))?;
        entry.enabled = enabled;
        Ok(())
    }
}

impl RuleEntry {
    fn new(rule: Box<dyn BlockRule>, alt: &[&str]) -> Self {
        RuleEntry {
            rule,
            alt: alt.iter().map(|s| s.to_string()).collect(),
            enabled: true,
        }
    }
}
