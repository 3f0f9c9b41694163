//! Resolution diagnostics.
//!
//! None of these stop typing: an unresolved name simply has no static type.

use mica_ir::Span;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("unresolved name `{name}`")]
    UnresolvedName { name: String, span: Span },

    #[error("`{name}` is a `val` and cannot be reassigned")]
    ValReassigned { name: String, span: Span },
}

impl ResolveError {
    pub fn span(&self) -> Span {
        match self {
            ResolveError::UnresolvedName { span, .. } | ResolveError::ValReassigned { span, .. } => {
                *span
            }
        }
    }
}
