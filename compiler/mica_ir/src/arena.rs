//! Flat storage for expressions and declarations.
//!
//! - All expressions live in one `Vec` indexed by `ExprId`
//! - Statement and argument lists are ranges into a shared `Vec<ExprId>`
//! - Declarations live in their own table indexed by `DeclId`

use std::fmt;

use crate::{Decl, DeclId, Expr, ExprId, ExprKind, ExprRange, Span};

/// Contiguous storage for one parsed source file.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ExprArena {
    /// All expressions (indexed by `ExprId`).
    exprs: Vec<Expr>,

    /// Flattened expression lists (block statements, call arguments).
    expr_lists: Vec<ExprId>,

    /// Local declarations and parameters (indexed by `DeclId`).
    decls: Vec<Decl>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with estimated capacity based on source size.
    /// Heuristic: ~1 expression per 8 bytes of source.
    pub fn with_capacity(source_len: usize) -> Self {
        let estimated_exprs = source_len / 8;
        ExprArena {
            exprs: Vec::with_capacity(estimated_exprs),
            expr_lists: Vec::with_capacity(estimated_exprs / 4),
            decls: Vec::with_capacity(estimated_exprs / 16),
        }
    }

    // ===== Expressions =====

    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes are bounded by source length, far below u32::MAX"
    )]
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    /// Get expression by ID.
    ///
    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    #[track_caller]
    pub fn get_expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    #[inline]
    #[track_caller]
    pub fn kind(&self, id: ExprId) -> &ExprKind {
        &self.exprs[id.index()].kind
    }

    #[inline]
    #[track_caller]
    pub fn span(&self, id: ExprId) -> Span {
        self.exprs[id.index()].span
    }

    /// True if `id` addresses an expression of this arena.
    #[inline]
    pub fn contains(&self, id: ExprId) -> bool {
        id.index() < self.exprs.len()
    }

    #[inline]
    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    /// Iterate over every expression id in allocation order.
    #[expect(clippy::cast_possible_truncation, reason = "bounded by alloc_expr")]
    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> + '_ {
        (0..self.exprs.len()).map(|i| ExprId::new(i as u32))
    }

    // ===== Expression lists =====

    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes are bounded by source length, far below u32::MAX"
    )]
    pub fn alloc_expr_list(&mut self, exprs: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_lists.len() as u32;
        self.expr_lists.extend(exprs);
        let len = self.expr_lists.len() as u32 - start;
        ExprRange::new(start, len)
    }

    #[inline]
    pub fn get_expr_list(&self, range: ExprRange) -> &[ExprId] {
        let start = range.start as usize;
        let end = start + range.len();
        &self.expr_lists[start..end]
    }

    // ===== Declarations =====

    #[inline]
    #[expect(
        clippy::cast_possible_truncation,
        reason = "arena sizes are bounded by source length, far below u32::MAX"
    )]
    pub fn alloc_decl(&mut self, decl: Decl) -> DeclId {
        let id = DeclId::new(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// # Panics
    /// Panics if `id` was not allocated by this arena.
    #[inline]
    #[track_caller]
    pub fn get_decl(&self, id: DeclId) -> &Decl {
        &self.decls[id.index()]
    }

    #[inline]
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }
}

impl fmt::Debug for ExprArena {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExprArena")
            .field("exprs", &self.exprs.len())
            .field("expr_lists", &self.expr_lists.len())
            .field("decls", &self.decls.len())
            .finish()
    }
}
