// build.rs - TOML-driven compile-time constant generation
use std::env;
use std::fs;
use std::path::Path;

#[derive(serde::Deserialize)]
struct CompileTimeConfig {
    file_processing: FileProcessingLimits,
    syntax: SyntaxLimits,
    batch_processing: BatchProcessingLimits,
    cache: CacheLimits,
    logging: LoggingLimits,
    evaluation: EvaluationLimits,
}

#[derive(serde::Deserialize)]
struct FileProcessingLimits {
    max_file_size: u64,
    max_lines_per_file: usize,
}

#[derive(serde::Deserialize)]
struct SyntaxLimits {
    max_error_history: usize,
    max_error_snippet_length: usize,
}

#[derive(serde::Deserialize)]
struct BatchProcessingLimits {
    max_worker_threads: usize,
    max_files_per_batch: usize,
    max_chunk_size: usize,
}

#[derive(serde::Deserialize)]
struct CacheLimits {
    max_cached_expressions: usize,
}

#[derive(serde::Deserialize)]
struct LoggingLimits {
    max_error_collection: usize,
    log_buffer_size: usize,
    max_log_message_length: usize,
    max_log_events_per_source: usize,
}

#[derive(serde::Deserialize)]
struct EvaluationLimits {
    max_string_length: usize,
    stack_red_zone: usize,
    stack_segment_size: usize,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=EL_BUILD_PROFILE");
    println!("cargo:rerun-if-env-changed=EL_CONFIG_DIR");

    let profile = env::var("EL_BUILD_PROFILE").unwrap_or_else(|_| "development".to_string());
    let config_dir = env::var("EL_CONFIG_DIR").unwrap_or_else(|_| "config".to_string());

    // Workspace root is the parent of el_compiler
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let workspace_root = Path::new(&manifest_dir)
        .parent()
        .expect("Could not find workspace root (parent directory)");

    let config_path = workspace_root
        .join(&config_dir)
        .join(format!("{}.toml", profile));

    println!("cargo:rerun-if-changed={}", config_path.display());

    if !config_path.exists() {
        panic!(
            "Configuration file not found: {}\nWorkspace root: {}\nLooking for: {}/{}/{}.toml",
            config_path.display(),
            workspace_root.display(),
            workspace_root.display(),
            config_dir,
            profile
        );
    }

    let config_content = fs::read_to_string(&config_path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", config_path.display(), e));

    let config: CompileTimeConfig = toml::from_str(&config_content)
        .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", config_path.display(), e));

    validate_limits(&config, &profile);
    generate_constants(&config, &profile);
}

fn validate_limits(config: &CompileTimeConfig, profile: &str) {
    const ABSOLUTE_MAX_FILE_SIZE: u64 = 1_000_000_000;
    const ABSOLUTE_MAX_WORKER_THREADS: usize = 256;

    if config.file_processing.max_file_size > ABSOLUTE_MAX_FILE_SIZE {
        panic!("LIMITS: max_file_size exceeds absolute maximum");
    }

    if config.batch_processing.max_worker_threads == 0
        || config.batch_processing.max_worker_threads > ABSOLUTE_MAX_WORKER_THREADS
    {
        panic!("LIMITS: max_worker_threads must be between 1 and 256");
    }

    if config.batch_processing.max_chunk_size == 0 {
        panic!("LIMITS: max_chunk_size must be at least 1");
    }

    if config.logging.max_log_events_per_source == 0 {
        panic!("LIMITS: max_log_events_per_source must be at least 1");
    }

    if config.evaluation.max_string_length == 0 {
        panic!("LIMITS: max_string_length must be at least 1");
    }

    if config.evaluation.stack_segment_size <= config.evaluation.stack_red_zone {
        panic!("LIMITS: stack_segment_size must exceed stack_red_zone");
    }

    if profile == "production" && config.file_processing.max_file_size > 50_000_000 {
        panic!("PRODUCTION: max_file_size too high for production");
    }
}

fn generate_constants(config: &CompileTimeConfig, profile: &str) {
    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("constants.rs");

    let constants_code = format!(
        r#"
// Generated compile-time constants from TOML configuration
// Profile: {}
// DO NOT EDIT - Generated by build.rs

pub mod compile_time {{
    pub mod file_processing {{
        pub const MAX_FILE_SIZE: u64 = {};
        pub const MAX_LINES_PER_FILE: usize = {};
    }}

    pub mod syntax {{
        pub const MAX_ERROR_HISTORY: usize = {};
        pub const MAX_ERROR_SNIPPET_LENGTH: usize = {};
    }}

    pub mod batch_processing {{
        pub const MAX_WORKER_THREADS: usize = {};
        pub const MAX_FILES_PER_BATCH: usize = {};
        pub const MAX_CHUNK_SIZE: usize = {};
    }}

    pub mod cache {{
        pub const MAX_CACHED_EXPRESSIONS: usize = {};
    }}

    pub mod logging {{
        pub const MAX_ERROR_COLLECTION: usize = {};
        pub const LOG_BUFFER_SIZE: usize = {};
        pub const MAX_LOG_MESSAGE_LENGTH: usize = {};
        pub const MAX_LOG_EVENTS_PER_SOURCE: usize = {};
    }}

    pub mod evaluation {{
        pub const MAX_STRING_LENGTH: usize = {};
        pub const STACK_RED_ZONE: usize = {};
        pub const STACK_SEGMENT_SIZE: usize = {};
    }}
}}
"#,
        profile,
        // File Processing
        config.file_processing.max_file_size,
        config.file_processing.max_lines_per_file,
        // Syntax
        config.syntax.max_error_history,
        config.syntax.max_error_snippet_length,
        // Batch Processing
        config.batch_processing.max_worker_threads,
        config.batch_processing.max_files_per_batch,
        config.batch_processing.max_chunk_size,
        // Cache
        config.cache.max_cached_expressions,
        // Logging
        config.logging.max_error_collection,
        config.logging.log_buffer_size,
        config.logging.max_log_message_length,
        config.logging.max_log_events_per_source,
        // Evaluation
        config.evaluation.max_string_length,
        config.evaluation.stack_red_zone,
        config.evaluation.stack_segment_size,
    );

    fs::write(output_path, constants_code).unwrap();
}
