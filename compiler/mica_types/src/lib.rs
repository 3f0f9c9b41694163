//! Name resolution and static typing for Mica.
//!
//! [`resolve`] walks a parsed expression tree once, binding simple names to
//! the local declarations and parameters in scope and computing the static
//! type of every expression. The result is a [`TypeTable`], which answers
//! the [`TypeOracle`](mica_ir::TypeOracle) queries that flow lowering needs.

mod error;
mod resolve;
mod table;
mod typing;

use mica_ir::{DeclId, ExprArena, ExprId, StringInterner};
use tracing::debug;

pub use error::ResolveError;
pub use table::TypeTable;

/// Output of [`resolve`]: the type table plus any diagnostics.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub table: TypeTable,
    pub diagnostics: Vec<ResolveError>,
}

impl Resolution {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Resolve and type the tree rooted at `root`.
///
/// `params` are the enclosing function's parameters, visible everywhere in
/// the body.
pub fn resolve(
    arena: &ExprArena,
    interner: &StringInterner,
    root: ExprId,
    params: &[DeclId],
) -> Resolution {
    let mut resolver = resolve::Resolver::new(arena, interner);
    resolver.declare_params(params);
    resolver.visit(root);
    let (table, diagnostics) = resolver.finish();
    debug!(
        exprs = arena.expr_count(),
        locals = table.local_reference_count(),
        diagnostics = diagnostics.len(),
        "resolved"
    );
    Resolution { table, diagnostics }
}
