//! Lexically scoped name resolution and bottom-up typing.
//!
//! A single recursive walk assigns every expression its static type and
//! binds simple names to local declarations. Declarations become visible
//! after their initializer, so `val x = x` refers to an outer `x`.

use mica_ir::stack::grow_if_needed;
use mica_ir::{
    DeclId, DeclKind, ExprArena, ExprId, ExprKind, ExprRange, Name, PostfixOp, PrefixOp,
    StringInterner, Ty, TypeOracle,
};
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::typing::{binary_type, join, literal_type, promote_unary};
use crate::{ResolveError, TypeTable};

pub(crate) struct Resolver<'a> {
    arena: &'a ExprArena,
    interner: &'a StringInterner,
    scopes: Vec<FxHashMap<Name, DeclId>>,
    table: TypeTable,
    diagnostics: Vec<ResolveError>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(arena: &'a ExprArena, interner: &'a StringInterner) -> Self {
        Resolver {
            arena,
            interner,
            scopes: vec![FxHashMap::default()],
            table: TypeTable::with_capacity(arena.expr_count(), arena.decl_count()),
            diagnostics: Vec::new(),
        }
    }

    /// Bring function parameters into the outermost scope.
    pub(crate) fn declare_params(&mut self, params: &[DeclId]) {
        for &param in params {
            self.declare(param);
        }
    }

    pub(crate) fn finish(self) -> (TypeTable, Vec<ResolveError>) {
        (self.table, self.diagnostics)
    }

    fn declare(&mut self, decl: DeclId) {
        let info = self.arena.get_decl(decl);
        if info.ty.is_some() {
            self.table.set_decl_type(decl, info.ty);
        }
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(info.name, decl);
        }
    }

    fn lookup(&self, name: Name) -> Option<DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(&name).copied())
    }

    fn in_scope<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.scopes.push(FxHashMap::default());
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Resolve and type `id` and everything below it.
    pub(crate) fn visit(&mut self, id: ExprId) -> Option<Ty> {
        grow_if_needed(|| {
            let ty = self.visit_inner(id);
            self.table.set_expr_type(id, ty);
            ty
        })
    }

    fn visit_opt(&mut self, id: Option<ExprId>) -> Option<Ty> {
        id.and_then(|id| self.visit(id))
    }

    fn visit_statements(&mut self, range: ExprRange) -> Option<Ty> {
        let arena = self.arena;
        self.in_scope(|this| {
            let mut last = Some(Ty::UNIT);
            for &stmt in arena.get_expr_list(range) {
                last = this.visit(stmt);
            }
            last
        })
    }

    fn visit_inner(&mut self, id: ExprId) -> Option<Ty> {
        let span = self.arena.span(id);
        match *self.arena.kind(id) {
            ExprKind::Literal(lit) => Some(literal_type(lit)),
            ExprKind::Ident(name) => {
                let Some(decl) = self.lookup(name) else {
                    trace!(name = self.interner.lookup(name), "unresolved name");
                    self.diagnostics.push(ResolveError::UnresolvedName {
                        name: self.interner.lookup(name).to_owned(),
                        span,
                    });
                    return None;
                };
                self.table.bind_local(id, decl);
                self.table.decl_type(decl)
            }
            ExprKind::This | ExprKind::Error => None,
            ExprKind::Block(range) => self.visit_statements(range),
            ExprKind::Paren(inner) => self.visit(inner),
            ExprKind::Return { value, .. } => {
                self.visit_opt(value);
                Some(Ty::NOTHING)
            }
            ExprKind::Binary { op, left, right } => {
                let left_ty = self.visit_opt(left);
                let right_ty = self.visit_opt(right);
                if op.is_assignment() {
                    self.check_reassignment(left);
                }
                binary_type(op, left_ty, right_ty)
            }
            ExprKind::Prefix { op, operand } => {
                let ty = self.visit_opt(operand);
                match op {
                    PrefixOp::Plus | PrefixOp::Minus => ty.and_then(promote_unary),
                    PrefixOp::Inc | PrefixOp::Dec => {
                        self.check_reassignment(operand);
                        ty
                    }
                    PrefixOp::Not => Some(Ty::BOOLEAN),
                }
            }
            ExprKind::Postfix { op, operand } => {
                let ty = self.visit(operand);
                match op {
                    PostfixOp::Inc | PostfixOp::Dec => {
                        self.check_reassignment(Some(operand));
                        ty
                    }
                    PostfixOp::NotNull => ty.map(Ty::non_null),
                }
            }
            ExprKind::TypeTest { operand, .. } => {
                self.visit(operand);
                Some(Ty::BOOLEAN)
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                self.visit_opt(cond);
                let then_ty = self.visit_opt(then_branch);
                if else_branch.is_none() {
                    return Some(Ty::UNIT);
                }
                let else_ty = self.visit_opt(else_branch);
                join(then_ty, else_ty)
            }
            ExprKind::While { cond, body } => {
                self.visit_opt(cond);
                self.visit_opt(body);
                Some(Ty::UNIT)
            }
            ExprKind::DoWhile { body, cond } => {
                // Locals declared in the body are visible in the condition.
                let arena = self.arena;
                self.in_scope(|this| {
                    if let Some(body) = body {
                        if let ExprKind::Block(range) = *arena.kind(body) {
                            for &stmt in arena.get_expr_list(range) {
                                this.visit(stmt);
                            }
                            this.table.set_expr_type(body, Some(Ty::UNIT));
                        } else {
                            this.visit(body);
                        }
                    }
                    this.visit_opt(cond);
                });
                Some(Ty::UNIT)
            }
            ExprKind::LocalDecl { decl, init } => {
                let init_ty = self.visit_opt(init);
                let declared = self.arena.get_decl(decl).ty;
                self.declare(decl);
                if declared.is_none() {
                    self.table.set_decl_type(decl, init_ty);
                }
                Some(Ty::UNIT)
            }
            ExprKind::Field { receiver, .. } => {
                self.visit(receiver);
                None
            }
            ExprKind::Call { callee, args } => {
                // A bare callee name is a function, not a local.
                if !matches!(self.arena.kind(callee), ExprKind::Ident(_)) {
                    self.visit(callee);
                }
                let arena = self.arena;
                for &arg in arena.get_expr_list(args) {
                    self.visit(arg);
                }
                None
            }
            ExprKind::Labeled { body, .. } => self.visit(body),
            ExprKind::Lambda { body } => {
                self.visit_statements(body);
                None
            }
            ExprKind::Break | ExprKind::Continue => Some(Ty::NOTHING),
        }
    }

    /// Report writes to a `val` or a parameter.
    fn check_reassignment(&mut self, target: Option<ExprId>) {
        let Some(target) = target else { return };
        let Some(decl) = self.table.resolve_local(target) else {
            return;
        };
        let info = self.arena.get_decl(decl);
        if !matches!(info.kind, DeclKind::Local { mutable: true }) {
            self.diagnostics.push(ResolveError::ValReassigned {
                name: self.interner.lookup(info.name).to_owned(),
                span: self.arena.span(target),
            });
        }
    }
}
