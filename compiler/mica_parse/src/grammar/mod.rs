//! Grammar productions, split by syntactic category.
//!
//! - `stmt.rs`: files, functions, blocks, statements, declarations, types
//! - `expr.rs`: assignment and the binary operator precedence chain
//! - `primary.rs`: prefix, postfix and primary expressions

mod expr;
mod primary;
mod stmt;
