//! Mica parser.
//!
//! Recursive descent over the token list produced by [`lex`], building a
//! flat [`ExprArena`]. Errors are collected rather than fatal: the parser
//! recovers at statement boundaries and leaves `ExprKind::Error` nodes where
//! a statement could not be parsed.
//!
//! A source file is either a single `fun` declaration or a sequence of
//! top-level statements. Either way [`ParseOutput::root`] is the expression
//! the flow builder lowers: the function body, or a block of the statements.

mod cursor;
mod error;
mod grammar;
mod lexer;
mod token;

use mica_ir::{DeclId, Expr, ExprArena, ExprId, ExprKind, Name, Span, StringInterner, Ty};
use tracing::debug;

use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};
pub use lexer::lex;
pub use token::{Token, TokenKind};

/// Signature of a parsed `fun` declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionHeader {
    pub name: Name,
    pub params: Vec<DeclId>,
    pub return_ty: Option<Ty>,
    pub span: Span,
}

/// Result of parsing one source file.
#[derive(Debug)]
pub struct ParseOutput {
    pub arena: ExprArena,
    pub root: ExprId,
    pub function: Option<FunctionHeader>,
    pub errors: Vec<ParseError>,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Function parameters, empty for a statement file.
    pub fn params(&self) -> &[DeclId] {
        self.function.as_ref().map_or(&[], |f| f.params.as_slice())
    }
}

/// Parse a complete source file.
pub fn parse(source: &str, interner: &StringInterner) -> ParseOutput {
    let tokens = match lex(source, interner) {
        Ok(tokens) => tokens,
        Err(_) => {
            let mut arena = ExprArena::new();
            let root = arena.alloc_expr(Expr::new(ExprKind::Error, Span::DUMMY));
            return ParseOutput {
                arena,
                root,
                function: None,
                errors: vec![ParseError::new(ParseErrorKind::SourceTooLarge, Span::DUMMY)],
            };
        }
    };

    let mut parser = Parser::new(&tokens, interner, source.len());
    let (root, function) = parser.parse_file();
    debug!(
        tokens = tokens.len(),
        exprs = parser.arena.expr_count(),
        errors = parser.errors.len(),
        "parsed source file"
    );

    ParseOutput {
        arena: parser.arena,
        root,
        function,
        errors: parser.errors,
    }
}

/// Parser state.
pub(crate) struct Parser<'a> {
    cursor: Cursor<'a>,
    interner: &'a StringInterner,
    arena: ExprArena,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], interner: &'a StringInterner, source_len: usize) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            interner,
            arena: ExprArena::with_capacity(source_len),
            errors: Vec::new(),
        }
    }

    fn alloc(&mut self, kind: ExprKind, span: Span) -> ExprId {
        self.arena.alloc_expr(Expr::new(kind, span))
    }

    #[inline]
    fn span_of(&self, id: ExprId) -> Span {
        self.arena.span(id)
    }

    /// Error describing the current token as unexpected.
    fn unexpected(&self, expected: &'static str) -> ParseError {
        let token = self.cursor.current();
        if token.kind == TokenKind::Error {
            return ParseError::new(ParseErrorKind::InvalidToken, token.span);
        }
        ParseError::unexpected(expected, token.kind.describe(), token.span)
    }

    /// Consume a token of the given kind or fail.
    fn expect(&mut self, kind: &TokenKind, expected: &'static str) -> Result<Span, ParseError> {
        if self.cursor.check(kind) {
            Ok(self.cursor.advance().span)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_ident(&mut self) -> Result<(Name, Span), ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Ident(name) => {
                let span = self.cursor.advance().span;
                Ok((name, span))
            }
            _ => Err(self.unexpected("identifier")),
        }
    }
}
