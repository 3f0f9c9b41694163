//! Token cursor with newline tracking.
//!
//! Newlines end statements at block level but are insignificant inside
//! parentheses. The cursor keeps a stack of modes: entering `(` pushes
//! "insignificant", entering `{` pushes "significant". While the innermost
//! mode is insignificant, `advance` steps over newline tokens.

use mica_ir::Span;
use smallvec::SmallVec;

use crate::token::{Token, TokenKind};

pub(crate) struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// `true` = newlines are significant.
    modes: SmallVec<[bool; 8]>,
}

impl<'a> Cursor<'a> {
    /// `tokens` must end with `Eof`.
    pub fn new(tokens: &'a [Token]) -> Self {
        debug_assert!(
            matches!(tokens.last(), Some(t) if t.kind == TokenKind::Eof),
            "token list must end with Eof"
        );
        Cursor {
            tokens,
            pos: 0,
            modes: SmallVec::new(),
        }
    }

    #[inline]
    pub fn current(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> TokenKind {
        self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed non-newline token.
    pub fn previous_span(&self) -> Span {
        self.tokens[..self.pos]
            .iter()
            .rev()
            .find(|t| t.kind != TokenKind::Newline)
            .map_or(Span::DUMMY, |t| t.span)
    }

    /// Raw lookahead `n` tokens ahead, newlines included.
    pub fn peek(&self, n: usize) -> &'a Token {
        let last = self.tokens.len() - 1;
        &self.tokens[(self.pos + n).min(last)]
    }

    /// Kind of the next non-newline token, without consuming anything.
    pub fn peek_past_newlines(&self) -> TokenKind {
        self.tokens[self.pos..]
            .iter()
            .find(|t| t.kind != TokenKind::Newline)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        self.current_kind().same_variant(kind)
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        self.current_kind() == TokenKind::Eof
    }

    /// Consume the current token and return it.
    ///
    /// Never moves past `Eof`.
    pub fn advance(&mut self) -> &'a Token {
        let token = self.current();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        if !self.newlines_significant() {
            self.skip_newlines();
        }
        token
    }

    pub fn skip_newlines(&mut self) {
        while self.current_kind() == TokenKind::Newline {
            self.pos += 1;
        }
    }

    pub fn newlines_significant(&self) -> bool {
        self.modes.last().copied().unwrap_or(true)
    }

    /// Enter a nested region. Leaving it is [`pop_mode`](Self::pop_mode).
    pub fn push_mode(&mut self, newlines_significant: bool) {
        self.modes.push(newlines_significant);
        if !newlines_significant {
            self.skip_newlines();
        }
    }

    pub fn pop_mode(&mut self) {
        self.modes.pop();
    }

    pub fn mode_depth(&self) -> usize {
        self.modes.len()
    }

    /// Drop modes pushed after `depth`, used when recovering from an error
    /// inside a nested region.
    pub fn truncate_modes(&mut self, depth: usize) {
        self.modes.truncate(depth);
    }
}
