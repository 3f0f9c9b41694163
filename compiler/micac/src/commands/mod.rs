//! Command handlers for the `mica` CLI.
//!
//! The `*_file` functions are what `main` calls: they read the file, print
//! the result and exit with status 1 on any reported error. The `*_source`
//! functions hold the actual work.

use mica_flow::{build_flow_with, BuildOptions};
use mica_ir::pretty::dump_tree;
use mica_ir::StringInterner;
use mica_parse::{lex, parse, ParseOutput};
use mica_types::{resolve, Resolution};
use tracing::debug;

use crate::diagnostic::{render, Diagnostic};

/// Output of a command: text for stdout, or rendered errors for stderr.
pub type CommandResult = Result<String, String>;

/// Options shared by the commands that take flags.
#[derive(Clone, Debug, Default)]
pub struct CommandOptions {
    pub build: BuildOptions,
    pub trace_tree: bool,
    /// Colored diagnostics.
    pub color: bool,
}

impl CommandOptions {
    /// Apply one command-line flag, returning `false` if it is not recognized.
    pub fn apply_flag(&mut self, flag: &str) -> bool {
        match flag {
            "--no-trailing-pop" => self.build.trailing_pop = false,
            "--trace-tree" => self.trace_tree = true,
            _ => return false,
        }
        true
    }
}

pub(super) fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            let msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("cannot find file '{path}'"),
                std::io::ErrorKind::PermissionDenied => {
                    format!("permission denied reading '{path}'")
                }
                std::io::ErrorKind::InvalidData => {
                    format!("'{path}' contains invalid UTF-8 data")
                }
                _ => format!("error reading '{path}': {e}"),
            };
            eprintln!("{msg}");
            std::process::exit(1);
        }
    }
}

fn emit(result: CommandResult) {
    match result {
        Ok(out) => print!("{out}"),
        Err(errors) => {
            eprint!("{errors}");
            std::process::exit(1);
        }
    }
}

/// Token dump, one token per line.
pub fn lex_source(source: &str) -> CommandResult {
    let interner = StringInterner::new();
    let tokens = lex(source, &interner).map_err(|err| format!("{err}\n"))?;
    let mut out = String::new();
    for token in &tokens {
        let text = &source[token.span.to_range()];
        out.push_str(&format!(
            "{:<10} {:<20} {text:?}\n",
            token.span.to_string(),
            token.kind.describe()
        ));
    }
    Ok(out)
}

fn parsed(
    path: &str,
    source: &str,
    interner: &StringInterner,
    color: bool,
) -> Result<ParseOutput, String> {
    let output = parse(source, interner);
    if output.has_errors() {
        let diagnostics: Vec<_> = output.errors.iter().map(Diagnostic::from).collect();
        return Err(render(path, source, &diagnostics, color));
    }
    Ok(output)
}

fn resolved(
    path: &str,
    source: &str,
    output: &ParseOutput,
    interner: &StringInterner,
    color: bool,
) -> Result<Resolution, String> {
    let resolution = resolve(&output.arena, interner, output.root, output.params());
    if resolution.has_errors() {
        let diagnostics: Vec<_> = resolution.diagnostics.iter().map(Diagnostic::from).collect();
        return Err(render(path, source, &diagnostics, color));
    }
    Ok(resolution)
}

/// Expression tree of the file's root.
pub fn parse_source(path: &str, source: &str, options: &CommandOptions) -> CommandResult {
    let interner = StringInterner::new();
    let output = parsed(path, source, &interner, options.color)?;
    Ok(dump_tree(&output.arena, &interner, output.root))
}

/// Parse and resolve, reporting every diagnostic.
pub fn check_source(path: &str, source: &str, options: &CommandOptions) -> CommandResult {
    let interner = StringInterner::new();
    let output = parsed(path, source, &interner, options.color)?;
    resolved(path, source, &output, &interner, options.color)?;
    Ok(format!("{path}: ok ({} expressions)\n", output.arena.expr_count()))
}

/// Build the instruction stream and list it.
pub fn flow_source(path: &str, source: &str, options: &CommandOptions) -> CommandResult {
    let interner = StringInterner::new();
    let output = parsed(path, source, &interner, options.color)?;
    let resolution = resolved(path, source, &output, &interner, options.color)?;
    match build_flow_with(&output.arena, output.root, &resolution.table, options.build) {
        Ok(flow) => {
            debug!(path, len = flow.len(), "flow listing");
            Ok(flow.display(&interner).to_string())
        }
        Err(err) => Err(render(path, source, &[Diagnostic::from(&err)], options.color)),
    }
}

pub fn lex_file(path: &str) {
    emit(lex_source(&read_file(path)));
}

pub fn parse_file(path: &str, options: &CommandOptions) {
    emit(parse_source(path, &read_file(path), options));
}

pub fn check_file(path: &str, options: &CommandOptions) {
    emit(check_source(path, &read_file(path), options));
}

pub fn flow_file(path: &str, options: &CommandOptions) {
    emit(flow_source(path, &read_file(path), options));
}
