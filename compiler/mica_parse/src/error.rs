//! Parse error types.

use mica_ir::Span;

/// What went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("expected {expected}, found {found}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid token")]
    InvalidToken,

    #[error("integer literal does not fit in Long")]
    IntegerOverflow,

    #[error("declarations are only allowed as statements")]
    MisplacedDeclaration,

    #[error("source file exceeds {} bytes", u32::MAX)]
    SourceTooLarge,
}

/// A parse error with its location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }

    pub fn unexpected(expected: &'static str, found: &'static str, span: Span) -> Self {
        ParseError::new(ParseErrorKind::UnexpectedToken { expected, found }, span)
    }
}
