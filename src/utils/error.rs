//! Error handling for multimd
//!
//! Parsing itself never fails: a line range that is not a table is simply
//! left to the next block rule. The error type here covers the ambient
//! surface instead: rule registration, option strings and file IO.

use std::fmt;

/// Error type for parser configuration and IO
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkdownError {
    /// A ruler operation referenced a rule name that is not registered
    RuleNotFound { name: String },
    /// An option string contained an unknown flag or a malformed value
    InvalidOption {
        option: String,
        suggestion: Option<String>,
    },
    /// IO error (for file operations)
    Io { message: String },
}

impl fmt::Display for MarkdownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarkdownError::RuleNotFound { name } => {
                write!(f, "Block rule not found: {}", name)
            }
            MarkdownError::InvalidOption { option, suggestion } => {
                if let Some(sug) = suggestion {
                    write!(f, "Invalid option '{}'. {}", option, sug)
                } else {
                    write!(f, "Invalid option: {}", option)
                }
            }
            MarkdownError::Io { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for MarkdownError {}

impl From<std::io::Error> for MarkdownError {
    fn from(err: std::io::Error) -> Self {
        MarkdownError::Io {
            message: err.to_string(),
        }
    }
}

/// Result type for configuration and IO operations
pub type MarkdownResult<T> = Result<T, MarkdownError>;

/// Parse warnings (non-fatal issues)
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParseWarning {
    pub message: String,
    /// Source line (0-indexed, as in token maps)
    pub line: Option<usize>,
    pub suggestion: Option<String>,
}

impl ParseWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
            suggestion: None,
        }
    }

    pub fn at_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(l) = self.line {
            write!(f, "Warning at line {}: {}", l + 1, self.message)?;
        } else {
            write!(f, "Warning: {}", self.message)?;
        }
        if let Some(ref sug) = self.suggestion {
            write!(f, " ({})", sug)?;
        }
        Ok(())
    }
}

/// Rendered output with optional warnings
#[derive(Debug, Clone)]
pub struct RenderOutput {
    /// The rendered HTML
    pub content: String,
    /// Any warnings generated while parsing
    pub warnings: Vec<ParseWarning>,
}

impl RenderOutput {
    pub fn new(content: String) -> Self {
        Self {
            content,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(content: String, warnings: Vec<ParseWarning>) -> Self {
        Self { content, warnings }
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

// Convenience constructors for errors
impl MarkdownError {
    pub fn rule_not_found(name: impl Into<String>) -> Self {
        MarkdownError::RuleNotFound { name: name.into() }
    }

    pub fn invalid_option_with_suggestion(
        option: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        MarkdownError::InvalidOption {
            option: option.into(),
            suggestion: Some(suggestion.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_not_found_display() {
        let err = MarkdownError::rule_not_found("fence");
        assert_eq!(err.to_string(), "Block rule not found: fence");
    }

    #[test]
    fn test_invalid_option_with_suggestion() {
        let err = MarkdownError::invalid_option_with_suggestion("multilne", "Did you mean 'multiline'?");
        let msg = err.to_string();
        assert!(msg.contains("multilne"));
        assert!(msg.contains("Did you mean"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.md");
        let err: MarkdownError = io.into();
        assert!(err.to_string().starts_with("IO error"));
    }

    #[test]
    fn test_warning_display_is_one_indexed() {
        let warn = ParseWarning::new("cell nested too deeply")
            .at_line(4)
            .with_suggestion("raise max_depth");
        assert_eq!(
            warn.to_string(),
            "Warning at line 5: cell nested too deeply (raise max_depth)"
        );
    }

    #[test]
    fn test_render_output() {
        let output = RenderOutput::new("<p>hi</p>\n".to_string());
        assert!(!output.has_warnings());

        let output_with_warn = RenderOutput::with_warnings(
            String::new(),
            vec![ParseWarning::new("test warning")],
        );
        assert!(output_with_warn.has_warnings());
    }
}
