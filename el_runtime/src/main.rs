//! # el
//!
//! Evaluate, render and replay flow-attribute expressions

use clap::Parser;
use el_runtime::cli::{configure, run, Cli};
use std::process;

fn main() {
    let cli = Cli::parse();

    if let Err(e) = configure(&cli) {
        eprintln!("Error: {}", e);
        process::exit(2);
    }
    let log = cli.log;

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    };

    if log {
        el_compiler::logging::print_cargo_style_summary();
    }
    process::exit(code);
}
