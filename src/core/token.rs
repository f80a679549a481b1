//! Block-level token

/// A single token of the block token stream.
///
/// Opening and closing tokens are paired through `nesting` (`1` opens, `-1`
/// closes, `0` is self-contained). `map` holds the half-open source line
/// range the token was produced from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    /// Token type, e.g. `table_open`, `inline`
    pub kind: String,
    /// HTML tag name, empty for `inline`
    pub tag: String,
    pub nesting: i8,
    pub level: usize,
    pub map: Option<[usize; 2]>,
    pub attrs: Vec<(String, String)>,
    /// Raw text for `inline` tokens
    pub content: String,
    pub block: bool,
}

impl Token {
    /// Create a new token
    pub fn new(kind: impl Into<String>, tag: impl Into<String>, nesting: i8) -> Self {
        Token {
            kind: kind.into(),
            tag: tag.into(),
            nesting,
            ..Default::default()
        }
    }

    /// Get an attribute value by name
    pub fn attr_get(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing any previous value
    pub fn attr_set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// Append an attribute without checking for duplicates
    pub fn attr_push(&mut self, name: &str, value: impl Into<String>) {
        self.attrs.push((name.to_string(), value.into()));
    }

    /// Bump a numeric span attribute (`colspan` / `rowspan`).
    ///
    /// An absent attribute means a span of one, so the first bump yields 2.
    pub fn bump_span(&mut self, name: &str) {
        let next = self
            .attr_get(name)
            .and_then(|v| v.parse::<usize>().ok())
            .map_or(2, |n| n + 1);
        self.attr_set(name, next.to_string());
    }
}
