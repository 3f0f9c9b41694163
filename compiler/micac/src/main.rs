//! Mica CLI
//!
//! Front end and flow builder for Mica function bodies.

use std::io::IsTerminal;

use micac::commands::{check_file, flow_file, lex_file, parse_file, CommandOptions};
use micac::init_tracing;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    let mut options = CommandOptions {
        color: std::io::stderr().is_terminal(),
        ..CommandOptions::default()
    };
    let mut file_path = None;
    for arg in args.iter().skip(2) {
        if options.apply_flag(arg) {
            continue;
        }
        if arg.starts_with('-') {
            eprintln!("error: unknown option '{arg}'");
            std::process::exit(1);
        }
        if file_path.is_none() {
            file_path = Some(arg.as_str());
        }
    }
    init_tracing(options.trace_tree);

    match command.as_str() {
        "lex" | "parse" | "check" | "flow" => {
            let Some(path) = file_path else {
                eprintln!("error: missing file path");
                eprintln!("Usage: mica {command} <file.kt> [options]");
                std::process::exit(1);
            };
            match command.as_str() {
                "lex" => lex_file(path),
                "parse" => parse_file(path, &options),
                "check" => check_file(path, &options),
                _ => flow_file(path, &options),
            }
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("Mica {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("Mica front end and flow builder");
    println!();
    println!("Usage: mica <command> <file> [options]");
    println!();
    println!("Commands:");
    println!("  lex <file>       Tokenize and display tokens");
    println!("  parse <file>     Parse and display the expression tree");
    println!("  check <file>     Parse and resolve names, reporting errors");
    println!("  flow <file>      Build and list the instruction stream");
    println!("  help             Show this help message");
    println!("  version          Show version information");
    println!();
    println!("Options:");
    println!("  --no-trailing-pop   Keep the root's value on the stack at the end");
    println!("  --trace-tree        Print tracing output as a tree (also MICA_TRACE_TREE=1)");
    println!();
    println!("Set RUST_LOG (e.g. RUST_LOG=mica_flow=trace) to enable logging.");
    println!();
    println!("Examples:");
    println!("  mica flow body.kt");
    println!("  mica flow body.kt --no-trailing-pop");
    println!("  RUST_LOG=mica_flow=trace mica flow body.kt --trace-tree");
}
