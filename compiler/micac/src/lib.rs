//! Mica command-line front end.
//!
//! Each command reads one source file and runs the pipeline as far as it
//! needs: `lex`, `parse`, `check` (parse and resolve) or `flow` (parse,
//! resolve and build the instruction stream). The `*_source` functions do
//! the work on an in-memory string and return the text to print, so they
//! can be tested without touching the filesystem.

pub mod commands;
mod diagnostic;
mod logging;

pub use diagnostic::{render, Diagnostic};
pub use logging::init_tracing;
