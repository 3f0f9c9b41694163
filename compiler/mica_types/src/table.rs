//! Resolved types and local bindings, queried through [`TypeOracle`].

use mica_ir::{DeclId, ExprId, Ty, TypeOracle};
use rustc_hash::FxHashMap;

/// Static types for every expression and declaration of one arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeTable {
    expr_types: Vec<Option<Ty>>,
    decl_types: Vec<Option<Ty>>,
    /// Simple-name expressions that refer to a local declaration.
    locals: FxHashMap<ExprId, DeclId>,
}

impl TypeTable {
    pub(crate) fn with_capacity(exprs: usize, decls: usize) -> Self {
        TypeTable {
            expr_types: vec![None; exprs],
            decl_types: vec![None; decls],
            locals: FxHashMap::default(),
        }
    }

    pub(crate) fn set_expr_type(&mut self, expr: ExprId, ty: Option<Ty>) {
        self.expr_types[expr.index()] = ty;
    }

    pub(crate) fn set_decl_type(&mut self, decl: DeclId, ty: Option<Ty>) {
        self.decl_types[decl.index()] = ty;
    }

    pub(crate) fn bind_local(&mut self, expr: ExprId, decl: DeclId) {
        self.locals.insert(expr, decl);
    }

    /// Number of name expressions bound to a local.
    pub fn local_reference_count(&self) -> usize {
        self.locals.len()
    }
}

impl TypeOracle for TypeTable {
    fn expr_type(&self, expr: ExprId) -> Option<Ty> {
        self.expr_types.get(expr.index()).copied().flatten()
    }

    fn decl_type(&self, decl: DeclId) -> Option<Ty> {
        self.decl_types.get(decl.index()).copied().flatten()
    }

    fn resolve_local(&self, expr: ExprId) -> Option<DeclId> {
        self.locals.get(&expr).copied()
    }
}
