//! Files, functions, blocks and statements.

use mica_ir::{BaseTy, Decl, DeclKind, ExprId, ExprKind, ExprRange, Span, Ty};
use tracing::trace;

use crate::{FunctionHeader, ParseError, Parser, TokenKind};

impl Parser<'_> {
    /// Parse a whole file: one `fun` declaration, or top-level statements.
    pub(crate) fn parse_file(&mut self) -> (ExprId, Option<FunctionHeader>) {
        self.skip_separators();
        if !self.cursor.check(&TokenKind::Fun) {
            let start = self.cursor.current_span();
            let stmts = self.parse_statements(&TokenKind::Eof);
            let span = start.merge(self.cursor.previous_span());
            let root = self.alloc(ExprKind::Block(stmts), span);
            return (root, None);
        }

        match self.parse_function() {
            Ok((root, header)) => {
                self.skip_separators();
                if !self.cursor.is_at_end() {
                    let err = self.unexpected("end of file");
                    self.errors.push(err);
                }
                (root, Some(header))
            }
            Err(err) => {
                let span = err.span;
                self.errors.push(err);
                (self.alloc(ExprKind::Error, span), None)
            }
        }
    }

    /// `fun name(p: T, ...): R { body }` or `fun name(...) = expr`
    fn parse_function(&mut self) -> Result<(ExprId, FunctionHeader), ParseError> {
        let start = self.cursor.advance().span;
        let (name, _) = self.expect_ident()?;

        self.open_paren()?;
        let mut params = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            let (param_name, param_span) = self.expect_ident()?;
            self.expect(&TokenKind::Colon, "`:`")?;
            let ty = self.parse_type()?;
            params.push(self.arena.alloc_decl(Decl {
                name: param_name,
                ty: Some(ty),
                kind: DeclKind::Parameter,
                span: param_span.merge(self.cursor.previous_span()),
            }));
            if self.cursor.check(&TokenKind::Comma) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        self.close_paren()?;

        let return_ty = if self.cursor.check(&TokenKind::Colon) {
            self.cursor.advance();
            Some(self.parse_type()?)
        } else {
            None
        };
        let header_span = start.merge(self.cursor.previous_span());

        self.cursor.skip_newlines();
        let body = match self.cursor.current_kind() {
            TokenKind::LBrace => self.parse_block()?,
            TokenKind::Eq => {
                self.cursor.advance();
                self.cursor.skip_newlines();
                self.parse_expr()?
            }
            _ => return Err(self.unexpected("function body")),
        };

        trace!(params = params.len(), "parsed function header");
        let header = FunctionHeader {
            name,
            params,
            return_ty,
            span: header_span,
        };
        Ok((body, header))
    }

    /// `{ statements }` as a statement body.
    pub(crate) fn parse_block(&mut self) -> Result<ExprId, ParseError> {
        let (stmts, span) = self.parse_braced_statements()?;
        Ok(self.alloc(ExprKind::Block(stmts), span))
    }

    /// `{ statements }`, returning the statement list and the full span.
    pub(crate) fn parse_braced_statements(&mut self) -> Result<(ExprRange, Span), ParseError> {
        let start = self.cursor.current_span();
        self.cursor.push_mode(true);
        self.cursor.advance();
        let stmts = self.parse_statements(&TokenKind::RBrace);
        self.cursor.pop_mode();
        let end = self.expect(&TokenKind::RBrace, "`}`")?;
        Ok((stmts, start.merge(end)))
    }

    /// Parse statements up to (not including) `terminator` or end of file.
    fn parse_statements(&mut self, terminator: &TokenKind) -> ExprRange {
        let mut stmts = Vec::new();
        loop {
            self.skip_separators();
            if self.cursor.check(terminator) || self.cursor.is_at_end() {
                break;
            }
            if self.cursor.check(&TokenKind::RBrace) {
                // Stray `}` at file level.
                let err = self.unexpected("statement");
                self.errors.push(err);
                self.cursor.advance();
                continue;
            }

            let depth = self.cursor.mode_depth();
            match self.parse_statement() {
                Ok(stmt) => {
                    stmts.push(stmt);
                    let kind = self.cursor.current_kind();
                    let separated = matches!(
                        kind,
                        TokenKind::Newline | TokenKind::Semicolon | TokenKind::Eof
                    ) || kind.same_variant(terminator);
                    if !separated {
                        let err = self.unexpected("newline or `;`");
                        self.errors.push(err);
                        self.synchronize();
                    }
                }
                Err(err) => {
                    let span = err.span;
                    self.errors.push(err);
                    self.cursor.truncate_modes(depth);
                    self.synchronize();
                    stmts.push(self.alloc(ExprKind::Error, span));
                }
            }
        }
        self.arena.alloc_expr_list(stmts)
    }

    fn parse_statement(&mut self) -> Result<ExprId, ParseError> {
        match self.cursor.current_kind() {
            TokenKind::Val | TokenKind::Var => self.parse_local_decl(),
            _ => self.parse_expr(),
        }
    }

    /// `val name: T = init` / `var name = init`
    fn parse_local_decl(&mut self) -> Result<ExprId, ParseError> {
        let keyword = self.cursor.advance();
        let mutable = keyword.kind == TokenKind::Var;
        let (name, _) = self.expect_ident()?;

        let ty = if self.cursor.check(&TokenKind::Colon) {
            self.cursor.advance();
            Some(self.parse_type()?)
        } else {
            None
        };
        let init = if self.cursor.check(&TokenKind::Eq) {
            self.cursor.advance();
            self.cursor.skip_newlines();
            Some(self.parse_expr()?)
        } else {
            None
        };

        let span = keyword.span.merge(self.cursor.previous_span());
        let decl = self.arena.alloc_decl(Decl {
            name,
            ty,
            kind: DeclKind::Local { mutable },
            span,
        });
        Ok(self.alloc(ExprKind::LocalDecl { decl, init }, span))
    }

    /// `Name` or `Name?`
    pub(crate) fn parse_type(&mut self) -> Result<Ty, ParseError> {
        let (name, _) = self.expect_ident()?;
        let base =
            BaseTy::from_builtin(self.interner.lookup(name)).unwrap_or(BaseTy::Named(name));
        let ty = Ty::of(base);
        if self.cursor.check(&TokenKind::Question) {
            self.cursor.advance();
            return Ok(ty.nullable());
        }
        Ok(ty)
    }

    fn skip_separators(&mut self) {
        while matches!(
            self.cursor.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon
        ) {
            self.cursor.advance();
        }
    }

    /// Skip to the end of the current statement after an error.
    ///
    /// Stops before a newline, `;` or the `}` closing the enclosing block.
    fn synchronize(&mut self) {
        let mut braces = 0usize;
        loop {
            match self.cursor.current_kind() {
                TokenKind::Eof => return,
                TokenKind::Newline | TokenKind::Semicolon if braces == 0 => return,
                TokenKind::RBrace if braces == 0 => return,
                TokenKind::RBrace => braces -= 1,
                TokenKind::LBrace => braces += 1,
                _ => {}
            }
            self.cursor.advance();
        }
    }
}
