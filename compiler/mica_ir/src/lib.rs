//! Mica IR - expression trees for flow lowering.
//!
//! This crate holds the data the flow builder consumes:
//! - Spans for source locations
//! - Names for interned identifiers
//! - A flat expression arena (`ExprArena`) addressed by `ExprId`
//! - Local declarations (`DeclId`) that give variables their identity
//! - Static types (`Ty`) and the [`TypeOracle`] the builder queries
//!
//! # Design Philosophy
//!
//! - **Intern Everything**: Strings → `Name(u32)`
//! - **Flatten Everything**: No `Box<Expr>`, children are `ExprId` indices
//! - **Absent is explicit**: a child the parser could not produce is `None`,
//!   and consumers decide what an absent child means
//!
//! Literals that contain floats store them as bits so every node is `Eq + Hash`.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

mod arena;
mod ast;
mod ids;
mod interner;
mod name;
pub mod pretty;
mod span;
pub mod stack;
mod ty;

pub use arena::ExprArena;
pub use ast::{BinaryOp, Decl, DeclKind, Expr, ExprKind, Literal, PostfixOp, PrefixOp};
pub use ids::{DeclId, ExprId, ExprRange};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use span::{Span, SpanError};
pub use ty::{BaseTy, PrimitiveType, Ty, TyClass, TypeOracle};
