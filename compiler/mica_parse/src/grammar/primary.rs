//! Prefix, postfix and primary expressions.

use mica_ir::stack::grow_if_needed;
use mica_ir::{ExprId, ExprKind, ExprRange, Literal, PostfixOp, PrefixOp, Span};

use crate::{ParseError, ParseErrorKind, Parser, TokenKind};

impl Parser<'_> {
    /// `+x`, `-x`, `++x`, `--x`, `!x`, `label@ x`, or a postfix expression.
    pub(crate) fn parse_prefix(&mut self) -> Result<ExprId, ParseError> {
        grow_if_needed(|| self.parse_prefix_inner())
    }

    fn parse_prefix_inner(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let op = match token.kind {
            TokenKind::Plus => PrefixOp::Plus,
            TokenKind::Minus => PrefixOp::Minus,
            TokenKind::PlusPlus => PrefixOp::Inc,
            TokenKind::MinusMinus => PrefixOp::Dec,
            TokenKind::Bang => PrefixOp::Not,
            TokenKind::BangBang => {
                // `!!x` in prefix position is a double negation.
                self.cursor.advance();
                let operand = self.parse_prefix()?;
                let inner_span = Span::new(token.span.start + 1, self.span_of(operand).end);
                let inner = self.prefix(PrefixOp::Not, operand, inner_span);
                let span = token.span.merge(inner_span);
                return Ok(self.prefix(PrefixOp::Not, inner, span));
            }
            TokenKind::Ident(label) if self.at_label_definition() => {
                self.cursor.advance();
                self.cursor.advance();
                let body = self.parse_prefix()?;
                let span = token.span.merge(self.span_of(body));
                return Ok(self.alloc(ExprKind::Labeled { label, body }, span));
            }
            _ => return self.parse_postfix(),
        };
        self.cursor.advance();
        let operand = self.parse_prefix()?;
        let span = token.span.merge(self.span_of(operand));
        Ok(self.prefix(op, operand, span))
    }

    fn prefix(&mut self, op: PrefixOp, operand: ExprId, span: Span) -> ExprId {
        self.alloc(
            ExprKind::Prefix {
                op,
                operand: Some(operand),
            },
            span,
        )
    }

    /// `name@` with no space before the `@`.
    fn at_label_definition(&self) -> bool {
        let at = self.cursor.peek(1);
        at.kind == TokenKind::At && at.span.start == self.cursor.current_span().end
    }

    /// Member access, calls, `x++`, `x--`, `x!!`.
    fn parse_postfix(&mut self) -> Result<ExprId, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            // A leading `.` continues the previous line.
            if self.cursor.check(&TokenKind::Newline)
                && self.cursor.peek_past_newlines() == TokenKind::Dot
            {
                self.cursor.skip_newlines();
            }
            let (kind, end) = match self.cursor.current_kind() {
                TokenKind::Dot => {
                    self.cursor.advance();
                    self.cursor.skip_newlines();
                    let (name, end) = self.expect_ident()?;
                    (
                        ExprKind::Field {
                            receiver: expr,
                            name,
                        },
                        end,
                    )
                }
                TokenKind::LParen => {
                    let (args, end) = self.parse_call_args()?;
                    (ExprKind::Call { callee: expr, args }, end)
                }
                TokenKind::PlusPlus => self.postfix(PostfixOp::Inc, expr),
                TokenKind::MinusMinus => self.postfix(PostfixOp::Dec, expr),
                TokenKind::BangBang => self.postfix(PostfixOp::NotNull, expr),
                _ => return Ok(expr),
            };
            let span = self.span_of(expr).merge(end);
            expr = self.alloc(kind, span);
        }
    }

    fn postfix(&mut self, op: PostfixOp, operand: ExprId) -> (ExprKind, Span) {
        let end = self.cursor.advance().span;
        (ExprKind::Postfix { op, operand }, end)
    }

    fn parse_call_args(&mut self) -> Result<(ExprRange, Span), ParseError> {
        self.open_paren()?;
        let mut args = Vec::new();
        while !self.cursor.check(&TokenKind::RParen) {
            args.push(self.parse_expr()?);
            if self.cursor.check(&TokenKind::Comma) {
                self.cursor.advance();
            } else {
                break;
            }
        }
        let end = self.close_paren()?;
        Ok((self.arena.alloc_expr_list(args), end))
    }

    fn parse_primary(&mut self) -> Result<ExprId, ParseError> {
        let token = self.cursor.current();
        let kind = match token.kind {
            TokenKind::Int(value) => ExprKind::Literal(int_literal(value, token.span)?),
            TokenKind::Long(value) => {
                let value = i64::try_from(value)
                    .map_err(|_| ParseError::new(ParseErrorKind::IntegerOverflow, token.span))?;
                ExprKind::Literal(Literal::Long(value))
            }
            TokenKind::Float(bits) => ExprKind::Literal(Literal::Float(bits)),
            TokenKind::Double(bits) => ExprKind::Literal(Literal::Double(bits)),
            TokenKind::Char(c) => ExprKind::Literal(Literal::Char(c)),
            TokenKind::String(s) => ExprKind::Literal(Literal::String(s)),
            TokenKind::True => ExprKind::Literal(Literal::Bool(true)),
            TokenKind::False => ExprKind::Literal(Literal::Bool(false)),
            TokenKind::Null => ExprKind::Literal(Literal::Null),
            TokenKind::Ident(name) => ExprKind::Ident(name),
            TokenKind::This => ExprKind::This,
            TokenKind::Break => ExprKind::Break,
            TokenKind::Continue => ExprKind::Continue,
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBrace => {
                let (body, span) = self.parse_braced_statements()?;
                return Ok(self.alloc(ExprKind::Lambda { body }, span));
            }
            TokenKind::If => return self.parse_if(),
            TokenKind::While => return self.parse_while(),
            TokenKind::Do => return self.parse_do_while(),
            TokenKind::Return => return self.parse_return(),
            TokenKind::Val | TokenKind::Var => {
                return Err(ParseError::new(
                    ParseErrorKind::MisplacedDeclaration,
                    token.span,
                ));
            }
            _ => return Err(self.unexpected("expression")),
        };
        self.cursor.advance();
        Ok(self.alloc(kind, token.span))
    }

    fn parse_paren(&mut self) -> Result<ExprId, ParseError> {
        let start = self.open_paren()?;
        let inner = self.parse_expr()?;
        let end = self.close_paren()?;
        Ok(self.alloc(ExprKind::Paren(inner), start.merge(end)))
    }

    /// `if (cond) then` with an optional `else`, possibly on a later line.
    fn parse_if(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_condition()?;
        self.cursor.skip_newlines();
        let then_branch = self.parse_control_body()?;

        let else_branch = if self.cursor.peek_past_newlines() == TokenKind::Else {
            self.cursor.skip_newlines();
            self.cursor.advance();
            self.cursor.skip_newlines();
            Some(self.parse_control_body()?)
        } else {
            None
        };

        let end = self.span_of(else_branch.unwrap_or(then_branch));
        Ok(self.alloc(
            ExprKind::If {
                cond: Some(cond),
                then_branch: Some(then_branch),
                else_branch,
            },
            start.merge(end),
        ))
    }

    fn parse_while(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        let cond = self.parse_condition()?;
        self.cursor.skip_newlines();
        let body = self.parse_control_body()?;
        let span = start.merge(self.span_of(body));
        Ok(self.alloc(
            ExprKind::While {
                cond: Some(cond),
                body: Some(body),
            },
            span,
        ))
    }

    fn parse_do_while(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        self.cursor.skip_newlines();
        let body = self.parse_control_body()?;
        self.cursor.skip_newlines();
        self.expect(&TokenKind::While, "`while`")?;
        let cond = self.parse_condition()?;
        let span = start.merge(self.cursor.previous_span());
        Ok(self.alloc(
            ExprKind::DoWhile {
                body: Some(body),
                cond: Some(cond),
            },
            span,
        ))
    }

    /// `return`, `return value`, `return@label value`
    fn parse_return(&mut self) -> Result<ExprId, ParseError> {
        let start = self.cursor.advance().span;
        let label = if self.cursor.check(&TokenKind::At)
            && self.cursor.current_span().start == start.end
        {
            self.cursor.advance();
            Some(self.expect_ident()?.0)
        } else {
            None
        };
        let value = if starts_expression(self.cursor.current_kind()) {
            Some(self.parse_expr()?)
        } else {
            None
        };
        let span = start.merge(self.cursor.previous_span());
        Ok(self.alloc(ExprKind::Return { label, value }, span))
    }

    /// `( expr )` after `if` or `while`.
    fn parse_condition(&mut self) -> Result<ExprId, ParseError> {
        self.open_paren()?;
        let cond = self.parse_expr()?;
        self.close_paren()?;
        Ok(cond)
    }

    /// Body of `if`, `while` or `do`: a block or a single expression.
    fn parse_control_body(&mut self) -> Result<ExprId, ParseError> {
        if self.cursor.check(&TokenKind::LBrace) {
            self.parse_block()
        } else {
            self.parse_expr()
        }
    }

    /// Consume `(` and enter a region where newlines are insignificant.
    pub(crate) fn open_paren(&mut self) -> Result<Span, ParseError> {
        if !self.cursor.check(&TokenKind::LParen) {
            return Err(self.unexpected("`(`"));
        }
        self.cursor.push_mode(false);
        Ok(self.cursor.advance().span)
    }

    /// Leave the region opened by [`open_paren`](Self::open_paren) and
    /// consume `)`.
    pub(crate) fn close_paren(&mut self) -> Result<Span, ParseError> {
        if !self.cursor.check(&TokenKind::RParen) {
            return Err(self.unexpected("`)`"));
        }
        self.cursor.pop_mode();
        Ok(self.cursor.advance().span)
    }
}

/// Unsuffixed integer literals are `Int` when they fit, else `Long`.
fn int_literal(value: u64, span: Span) -> Result<Literal, ParseError> {
    if let Ok(v) = i32::try_from(value) {
        return Ok(Literal::Int(v));
    }
    i64::try_from(value)
        .map(Literal::Long)
        .map_err(|_| ParseError::new(ParseErrorKind::IntegerOverflow, span))
}

fn starts_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Int(_)
            | TokenKind::Long(_)
            | TokenKind::Float(_)
            | TokenKind::Double(_)
            | TokenKind::Char(_)
            | TokenKind::String(_)
            | TokenKind::Ident(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::LParen
            | TokenKind::LBrace
            | TokenKind::If
            | TokenKind::While
            | TokenKind::Do
            | TokenKind::Return
            | TokenKind::Break
            | TokenKind::Continue
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus
            | TokenKind::Bang
            | TokenKind::BangBang
    )
}
