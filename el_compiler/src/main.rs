use el_compiler::render::Dialect;
use el_compiler::{batch, logging, pipeline};
use std::env;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init_global_logging()?;

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <file.el|directory> [options]", args[0]);
        eprintln!("       {} --help", args[0]);
        std::process::exit(1);
    }

    if args[1] == "--help" {
        print_help(&args[0]);
        return Ok(());
    }

    let input_path = Path::new(&args[1]);
    let config = parse_batch_options(&args[2..]);

    let outcome = if input_path.is_file() {
        println!("Compiling file: {}", input_path.display());
        batch::process_file(input_path, &config)
    } else if input_path.is_dir() {
        println!("Starting batch compilation: {}", input_path.display());
        println!(
            "Configuration: {} threads, recursive={}, fail_fast={}",
            config.max_threads, config.recursive, config.fail_fast
        );
        batch::process_directory_with_config(input_path, &config)
    } else {
        eprintln!("Error: Input must be a .el file or a directory");
        eprintln!("  Path: {}", input_path.display());
        std::process::exit(1);
    };

    match outcome {
        Ok(results) => {
            print_batch_results(&results, &config);
            logging::print_cargo_style_summary();
            if results.failure_count() > 0 {
                std::process::exit(1);
            }
        }
        Err(error) => {
            eprintln!("Batch compilation failed: {}", error);
            logging::print_cargo_style_summary();
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_help(program_name: &str) {
    println!("EL Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("Compiles flow-attribute expressions, one property value per line");
    println!();
    println!("USAGE:");
    println!("    {} <file.el>                 # Compile one file", program_name);
    println!("    {} <directory> [options]     # Compile every .el file", program_name);
    println!();
    println!("OPTIONS:");
    println!("    --help                 Show this help message");
    println!("    --sequential           Compile on the calling thread only");
    println!("    --threads N            Set maximum number of worker threads");
    println!("    --no-recursive         Don't search subdirectories");
    println!("    --max-files N          Limit maximum files to compile");
    println!("    --fail-fast            Stop at the first failing line");
    println!("    --quiet                Suppress progress and per-line output");
    println!("    --dialect D            Also render each line (canonical|python)");
    println!();
    println!("FILE FORMAT:");
    println!("    One expression per non-empty line; lines starting with // are comments");
    println!();

    let pipeline_info = pipeline::get_pipeline_info();
    println!("PIPELINE CAPABILITIES:");
    for line in pipeline_info.report().lines() {
        println!("    {}", line);
    }
    println!();
    println!("BATCH CAPABILITIES:");
    println!("    {}", batch::get_batch_info().summary());
}

fn parse_batch_options(args: &[String]) -> batch::BatchConfig {
    let mut config = batch::BatchConfig::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--sequential" => {
                config.max_threads = 1;
            }
            "--threads" => {
                if i + 1 < args.len() {
                    if let Ok(threads) = args[i + 1].parse::<usize>() {
                        config.max_threads = threads.max(1);
                    } else {
                        eprintln!(
                            "Warning: Invalid thread count '{}', using default",
                            args[i + 1]
                        );
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --threads requires a number");
                }
            }
            "--no-recursive" => {
                config.recursive = false;
            }
            "--max-files" => {
                if i + 1 < args.len() {
                    if let Ok(max_files) = args[i + 1].parse::<usize>() {
                        config.max_files = Some(max_files);
                    } else {
                        eprintln!("Warning: Invalid max files '{}', ignoring", args[i + 1]);
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --max-files requires a number");
                }
            }
            "--fail-fast" => {
                config.fail_fast = true;
            }
            "--quiet" => {
                config.progress_reporting = false;
            }
            "--dialect" => {
                if i + 1 < args.len() {
                    match Dialect::parse(&args[i + 1]) {
                        Some(dialect) => config.dialect = Some(dialect),
                        None => eprintln!("Warning: Unknown dialect '{}', ignoring", args[i + 1]),
                    }
                    i += 1;
                } else {
                    eprintln!("Warning: --dialect requires canonical or python");
                }
            }
            _ => {
                eprintln!("Warning: Unknown option '{}'", args[i]);
            }
        }
        i += 1;
    }

    config
}

fn print_batch_results(results: &batch::BatchResults, config: &batch::BatchConfig) {
    println!("\nCompilation Summary:");
    println!("  Files discovered: {}", results.files_discovered);
    println!("  Files processed: {}", results.files_processed);
    println!("  Expressions: {}", results.lines_processed());
    println!(
        "  Compiled: {} ({:.1}%)",
        results.success_count(),
        results.success_rate() * 100.0
    );
    println!("  Failed: {}", results.failure_count());
    println!(
        "  Cache: {} entries, {:.1}% hit rate",
        results.cache.entries,
        results.cache.hit_rate() * 100.0
    );
    println!(
        "  Total time: {:.2}s",
        results.processing_duration.as_secs_f64()
    );

    if config.progress_reporting {
        for line in &results.compiled {
            match &line.rendered {
                Some(text) => println!("  {} [{}] {}", line.line.origin(), line.compiled.result_type(), text),
                None => println!("  {} [{}]", line.line.origin(), line.compiled.result_type()),
            }
        }
    }

    if !results.unreadable_files.is_empty() {
        println!("\nUnreadable Files:");
        for (path, error) in &results.unreadable_files {
            println!("  {}: {}", path.display(), error);
        }
    }

    if !results.failed.is_empty() {
        println!("\nFailed Expressions:");
        for failed in &results.failed {
            println!("  {}", failed.line.origin());
            for report_line in failed.report().lines() {
                println!("    {}", report_line);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_batch_options() {
        let config = parse_batch_options(&strings(&[
            "--threads",
            "4",
            "--fail-fast",
            "--no-recursive",
            "--dialect",
            "python",
        ]));
        assert_eq!(config.max_threads, 4);
        assert!(config.fail_fast);
        assert!(!config.recursive);
        assert_eq!(config.dialect, Some(Dialect::Python));
    }

    #[test]
    fn test_parse_batch_options_invalid() {
        let config = parse_batch_options(&strings(&[
            "--threads",
            "invalid",
            "--dialect",
            "cobol",
            "--unknown-option",
        ]));
        assert_ne!(config.max_threads, 0);
        assert_eq!(config.dialect, None);
    }

    #[test]
    fn test_sequential_flag() {
        let config = parse_batch_options(&strings(&["--threads", "8", "--sequential", "--quiet"]));
        assert_eq!(config.max_threads, 1);
        assert!(!config.progress_reporting);
    }
}
