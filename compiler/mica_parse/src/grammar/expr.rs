//! Assignment and binary operators.
//!
//! Precedence, loosest first:
//! assignment, `||`, `&&`, equality, comparison, `in`/`is`, `?:`,
//! infix functions (`shl` `shr` `ushr` `and` `or` `xor`), `..`,
//! additive, multiplicative.

use mica_ir::stack::grow_if_needed;
use mica_ir::{BinaryOp, ExprId, ExprKind};

use crate::{ParseError, Parser, TokenKind};

type Operand<'a> = fn(&mut Parser<'a>) -> Result<ExprId, ParseError>;

impl<'a> Parser<'a> {
    /// Parse an expression.
    pub(crate) fn parse_expr(&mut self) -> Result<ExprId, ParseError> {
        grow_if_needed(|| self.parse_assignment())
    }

    /// Assignment is right-associative: `a = b = c` is `a = (b = c)`.
    fn parse_assignment(&mut self) -> Result<ExprId, ParseError> {
        let left = self.parse_disjunction()?;
        let Some(op) = match_assignment_op(self.cursor.current_kind()) else {
            return Ok(left);
        };
        self.cursor.advance();
        self.cursor.skip_newlines();
        let right = self.parse_expr()?;
        Ok(self.binary(op, left, right))
    }

    fn parse_disjunction(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_conjunction, |kind| {
            (kind == TokenKind::PipePipe).then_some(BinaryOp::OrOr)
        })
    }

    fn parse_conjunction(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_equality, |kind| {
            (kind == TokenKind::AmpAmp).then_some(BinaryOp::AndAnd)
        })
    }

    fn parse_equality(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_comparison, match_equality_op)
    }

    fn parse_comparison(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_named, match_comparison_op)
    }

    /// `in`, `!in`, `is T`, `!is T`
    fn parse_named(&mut self) -> Result<ExprId, ParseError> {
        let mut left = self.parse_elvis()?;
        loop {
            let negated = self.cursor.check(&TokenKind::Bang) && self.bang_is_infix();
            if negated {
                self.cursor.advance();
            }
            match self.cursor.current_kind() {
                TokenKind::In => {
                    self.cursor.advance();
                    self.cursor.skip_newlines();
                    let right = self.parse_elvis()?;
                    let op = if negated { BinaryOp::NotIn } else { BinaryOp::In };
                    left = self.binary(op, left, right);
                }
                TokenKind::Is => {
                    self.cursor.advance();
                    let ty = self.parse_type()?;
                    let span = self.span_of(left).merge(self.cursor.previous_span());
                    left = self.alloc(
                        ExprKind::TypeTest {
                            operand: left,
                            ty: Some(ty),
                            negated,
                        },
                        span,
                    );
                }
                _ => return Ok(left),
            }
        }
    }

    /// `!` immediately followed by `in` or `is` is one infix operator.
    fn bang_is_infix(&self) -> bool {
        let next = self.cursor.peek(1);
        matches!(next.kind, TokenKind::In | TokenKind::Is)
            && next.span.start == self.cursor.current_span().end
    }

    fn parse_elvis(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_infix_call, |kind| {
            (kind == TokenKind::Elvis).then_some(BinaryOp::Elvis)
        })
    }

    fn parse_infix_call(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_range, match_infix_function)
    }

    fn parse_range(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_additive, |kind| {
            (kind == TokenKind::DotDot).then_some(BinaryOp::Range)
        })
    }

    fn parse_additive(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_multiplicative, |kind| match kind {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        })
    }

    fn parse_multiplicative(&mut self) -> Result<ExprId, ParseError> {
        self.parse_left_assoc(Self::parse_prefix, |kind| match kind {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::Percent => Some(BinaryOp::Rem),
            _ => None,
        })
    }

    /// One left-associative precedence level.
    ///
    /// A newline before the operator ends the expression; newlines after it
    /// are skipped.
    fn parse_left_assoc(
        &mut self,
        operand: Operand<'a>,
        match_op: fn(TokenKind) -> Option<BinaryOp>,
    ) -> Result<ExprId, ParseError> {
        let mut left = operand(self)?;
        while let Some(op) = match_op(self.cursor.current_kind()) {
            self.cursor.advance();
            self.cursor.skip_newlines();
            let right = operand(self)?;
            left = self.binary(op, left, right);
        }
        Ok(left)
    }

    pub(crate) fn binary(&mut self, op: BinaryOp, left: ExprId, right: ExprId) -> ExprId {
        let span = self.span_of(left).merge(self.span_of(right));
        self.alloc(
            ExprKind::Binary {
                op,
                left: Some(left),
                right: Some(right),
            },
            span,
        )
    }
}

fn match_assignment_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Eq => Some(BinaryOp::Assign),
        TokenKind::PlusEq => Some(BinaryOp::AddAssign),
        TokenKind::MinusEq => Some(BinaryOp::SubAssign),
        TokenKind::StarEq => Some(BinaryOp::MulAssign),
        TokenKind::SlashEq => Some(BinaryOp::DivAssign),
        TokenKind::PercentEq => Some(BinaryOp::RemAssign),
        _ => None,
    }
}

fn match_equality_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::EqEq => Some(BinaryOp::Eq),
        TokenKind::NotEq => Some(BinaryOp::NotEq),
        TokenKind::EqEqEq => Some(BinaryOp::Identity),
        TokenKind::NotEqEq => Some(BinaryOp::NotIdentity),
        _ => None,
    }
}

fn match_comparison_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Lt => Some(BinaryOp::Lt),
        TokenKind::LtEq => Some(BinaryOp::LtEq),
        TokenKind::Gt => Some(BinaryOp::Gt),
        TokenKind::GtEq => Some(BinaryOp::GtEq),
        _ => None,
    }
}

fn match_infix_function(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Shl => Some(BinaryOp::Shl),
        TokenKind::Shr => Some(BinaryOp::Shr),
        TokenKind::Ushr => Some(BinaryOp::Ushr),
        TokenKind::And => Some(BinaryOp::And),
        TokenKind::Or => Some(BinaryOp::Or),
        TokenKind::Xor => Some(BinaryOp::Xor),
        _ => None,
    }
}
