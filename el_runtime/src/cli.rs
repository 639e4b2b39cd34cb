//! Command line interface for the `el` binary
//!
//! Evaluate an expression against attributes given on the command line,
//! render it in a dialect, or replay a sample corpus.

use crate::execution::{init_evaluation_preferences, Evaluator};
use crate::functions::datetime::parse_zone;
use crate::render::{render, Artifact, RenderTarget};
use crate::replay::replay_file;
use crate::types::{parse_assignment, AttributeEnvironment};
use clap::{Parser, Subcommand};
use el_compiler::config::runtime::RuntimeConfig;
use el_compiler::render::python_prelude;
use el_compiler::{compile, logging, Dialect};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "el", version, about = "Evaluate and render flow-attribute expressions")]
pub struct Cli {
    /// TOML file with [logging], [compiler] and [evaluation] preferences
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit diagnostic events to stderr
    #[arg(long, global = true)]
    pub log: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate an expression and print its value
    Eval {
        expression: String,

        /// Attribute as name=value; repeatable
        #[arg(long = "attr", value_parser = parse_assignment)]
        attributes: Vec<(String, String)>,

        /// Parameter as name=value; repeatable
        #[arg(long = "param", value_parser = parse_assignment)]
        parameters: Vec<(String, String)>,

        /// Time zone for date functions, e.g. UTC or +02:00
        #[arg(long)]
        zone: Option<String>,

        /// Print the value as JSON with its kind
        #[arg(long)]
        json: bool,
    },
    /// Render an expression as source text
    Render {
        expression: String,

        #[arg(long, default_value = "canonical", value_parser = parse_dialect)]
        dialect: Dialect,

        /// Also print the helper module Python output depends on
        #[arg(long)]
        prelude: bool,
    },
    /// Replay a JSON sample corpus and report differences
    Replay {
        corpus: PathBuf,

        /// Write the full JSON report here
        #[arg(long)]
        output: Option<PathBuf>,

        /// Only print the summary line
        #[arg(long)]
        quiet: bool,
    },
}

fn parse_dialect(name: &str) -> Result<Dialect, String> {
    Dialect::parse(name).ok_or_else(|| {
        let known: Vec<&str> = Dialect::ALL.iter().map(|d| d.as_str()).collect();
        format!("unknown dialect '{}' (expected one of {})", name, known.join(", "))
    })
}

/// Apply preferences and logging; must run before any compilation
pub fn configure(cli: &Cli) -> Result<(), String> {
    if let Some(path) = &cli.config {
        let config = RuntimeConfig::from_file(path)?;
        logging::config::init_runtime_preferences(config.logging)?;
        el_compiler::pipeline::init_compiler_preferences(config.compiler)?;
        init_evaluation_preferences(config.evaluation)?;
    }
    if cli.log {
        logging::init_global_logging()?;
    }
    Ok(())
}

/// Run the selected command; the returned value is the process exit code
pub fn run(cli: Cli) -> Result<i32, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Eval {
            expression,
            attributes,
            parameters,
            zone,
            json,
        } => {
            let compiled = compile(&expression)?;
            let mut env = AttributeEnvironment::new();
            env.attributes.extend(attributes);
            env.parameters.extend(parameters);

            let evaluator = match zone {
                Some(zone) => Evaluator::with_zone(&env, parse_zone(&zone)?),
                None => Evaluator::new(&env),
            };
            let value = evaluator.evaluate(compiled.expression())?;
            if json {
                let out = serde_json::json!({ "value": value.to_json(), "kind": value.type_name() });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{}", value);
            }
            Ok(0)
        }
        Commands::Render {
            expression,
            dialect,
            prelude,
        } => {
            let compiled = compile(&expression)?;
            if prelude && dialect == Dialect::Python {
                println!("{}", python_prelude());
            }
            match render(&compiled, RenderTarget::Source(dialect))? {
                Artifact::Source(text) => println!("{}", text),
                Artifact::Evaluator(_) => {}
            }
            Ok(0)
        }
        Commands::Replay {
            corpus,
            output,
            quiet,
        } => {
            let report = replay_file(&corpus)?;
            if let Some(path) = output {
                std::fs::write(&path, report.to_json()?)?;
            }
            if !quiet {
                for failure in report.failures() {
                    println!(
                        "[FAIL] {} ({:?}): {}",
                        failure.id,
                        failure.status,
                        failure.detail.as_deref().unwrap_or("")
                    );
                }
            }
            println!("{}", report.summary());
            Ok(if report.is_successful() { 0 } else { 1 })
        }
    }
}
