//! Parse error types.

use crate::Span;
use std::fmt;

/// A parse error with location information.
///
/// A parse error ends the item stream of its file; the loader attaches the
/// file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// The kind of error.
    pub kind: ParseErrorKind,
    /// The span where the error occurred.
    pub span: Span,
    /// Optional context message.
    pub context: Option<String>,
}

impl ParseError {
    /// Create a new parse error.
    #[must_use]
    pub const fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            context: None,
        }
    }

    /// Add context to this error.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// 1-based line of the error.
    #[must_use]
    pub const fn line(&self) -> usize {
        self.span.line
    }

    /// Get the error message.
    #[must_use]
    pub fn message(&self) -> String {
        format!("{}", self.kind)
    }

    /// Get a short label for the error.
    #[must_use]
    pub const fn label(&self) -> &str {
        match &self.kind {
            ParseErrorKind::UnexpectedChar(_) => "unexpected character",
            ParseErrorKind::Expected(_) => "expected different token",
            ParseErrorKind::InvalidDate(_) => "invalid date",
            ParseErrorKind::UnexpectedIndent => "indentation error",
            ParseErrorKind::UnknownDirective(_) => "unknown directive",
            ParseErrorKind::MissingAccount => "expected account name",
            ParseErrorKind::TooFewPostings => "too few postings",
            ParseErrorKind::MultipleElided => "multiple elided amounts",
            ParseErrorKind::MissingCurrency => "expected commodity",
            ParseErrorKind::UnterminatedTest => "unterminated test",
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.span.line, self.kind)?;
        if let Some(ctx) = &self.context {
            write!(f, " ({ctx})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseError {}

/// Kinds of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input the lexer does not recognize.
    UnexpectedChar(String),
    /// Expected a specific token.
    Expected(String),
    /// Malformed or impossible date.
    InvalidDate(String),
    /// An indented line outside of any entry.
    UnexpectedIndent,
    /// A line or sub-line starting with an unknown keyword.
    UnknownDirective(String),
    /// A posting line without an account.
    MissingAccount,
    /// A transaction with fewer than two postings.
    TooFewPostings,
    /// More than one posting without a quantity.
    MultipleElided,
    /// A number that must carry a commodity symbol does not.
    MissingCurrency,
    /// A test block without its `end test` line.
    UnterminatedTest,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedChar(s) => write!(f, "syntax error: unexpected '{s}'"),
            Self::Expected(what) => write!(f, "expected {what}"),
            Self::InvalidDate(s) => write!(f, "invalid date '{s}'"),
            Self::UnexpectedIndent => write!(f, "indented line outside of an entry"),
            Self::UnknownDirective(s) => write!(f, "unknown directive '{s}'"),
            Self::MissingAccount => write!(f, "expected account name"),
            Self::TooFewPostings => write!(f, "transaction needs at least two postings"),
            Self::MultipleElided => write!(f, "only one posting may omit its amount"),
            Self::MissingCurrency => write!(f, "expected commodity after number"),
            Self::UnterminatedTest => write!(f, "test block is missing 'end test'"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(ParseErrorKind::TooFewPostings, Span::new(0, 5, 7));
        assert_eq!(err.line(), 7);
        assert_eq!(err.to_string(), "line 7: transaction needs at least two postings");
    }

    #[test]
    fn test_parse_error_with_context() {
        let err = ParseError::new(
            ParseErrorKind::InvalidDate("2018/13/01".to_string()),
            Span::new(0, 10, 1),
        )
        .with_context("transaction header");
        assert_eq!(err.context.as_deref(), Some("transaction header"));
        assert_eq!(err.label(), "invalid date");
        assert_eq!(
            err.to_string(),
            "line 1: invalid date '2018/13/01' (transaction header)"
        );
    }
}
