//! Batch compilation of `.el` expression files
//!
//! Each non-empty line of a file is one property value; lines starting with
//! `//` are comments. Lines compile independently, so a failing line never
//! blocks its neighbours. Files are spread over a pool of worker threads and
//! share one [`CompilationCache`].

use crate::config::compile_time::{batch_processing, file_processing};
use crate::logging::{self, codes};
use crate::pipeline::{CacheStats, CompilationCache, CompileError, CompiledExpression};
use crate::render::{self, Dialect, RenderError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

pub const EXPRESSION_FILE_EXTENSION: &str = "el";
const COMMENT_PREFIX: &str = "//";

// ============================================================================
// BATCH PROCESSING TYPES
// ============================================================================

#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub max_threads: usize,
    pub recursive: bool,
    pub max_files: Option<usize>,
    pub progress_reporting: bool,
    pub fail_fast: bool,
    /// Also render every compiled line in this dialect
    pub dialect: Option<Dialect>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
                .min(batch_processing::MAX_WORKER_THREADS),
            recursive: true,
            max_files: None,
            progress_reporting: true,
            fail_fast: false,
            dialect: None,
        }
    }
}

/// One expression line read from a file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    pub source: String,
}

impl SourceLine {
    pub fn origin(&self) -> String {
        format!("{}:{}", self.file.display(), self.line)
    }
}

#[derive(Debug, Clone)]
pub struct CompiledLine {
    pub line: SourceLine,
    pub compiled: CompiledExpression,
    pub rendered: Option<String>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LineError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

#[derive(Debug, Clone)]
pub struct FailedLine {
    pub line: SourceLine,
    pub error: LineError,
}

impl FailedLine {
    /// Caret report for compile errors, plain message otherwise
    pub fn report(&self) -> String {
        match &self.error {
            LineError::Compile(e) => e.report(&self.line.source),
            LineError::Render(e) => e.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct BatchResults {
    pub compiled: Vec<CompiledLine>,
    pub failed: Vec<FailedLine>,
    /// Files that could not be read at all
    pub unreadable_files: Vec<(PathBuf, BatchError)>,
    pub files_discovered: usize,
    pub files_processed: usize,
    pub processing_duration: Duration,
    pub cache: CacheStats,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success_count(&self) -> usize {
        self.compiled.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failed.len() + self.unreadable_files.len()
    }

    pub fn lines_processed(&self) -> usize {
        self.compiled.len() + self.failed.len()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.lines_processed();
        if total == 0 {
            0.0
        } else {
            self.compiled.len() as f64 / total as f64
        }
    }

    fn merge(&mut self, other: BatchResults) {
        self.compiled.extend(other.compiled);
        self.failed.extend(other.failed);
        self.unreadable_files.extend(other.unreadable_files);
        self.files_processed += other.files_processed;
    }

    /// Restore file/line order after parallel workers
    fn sort(&mut self) {
        self.compiled
            .sort_by(|a, b| (&a.line.file, a.line.line).cmp(&(&b.line.file, b.line.line)));
        self.failed
            .sort_by(|a, b| (&a.line.file, a.line.line).cmp(&(&b.line.file, b.line.line)));
        self.unreadable_files.sort_by(|a, b| a.0.cmp(&b.0));
    }

    pub fn summary(&self) -> String {
        format!(
            "Batch compilation completed: {} files, {} expressions, {} compiled ({:.1}%), {} failed, {:.2}s total",
            self.files_processed,
            self.lines_processed(),
            self.success_count(),
            self.success_rate() * 100.0,
            self.failure_count(),
            self.processing_duration.as_secs_f64()
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BatchError {
    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("No .el files found in directory: {path}")]
    NoFilesFound { path: String },

    #[error("Too many files found: {count} (max: {max})")]
    TooManyFiles { count: usize, max: usize },

    #[error("File too large: {path} is {size} bytes (max: {max})")]
    FileTooLarge { path: String, size: u64, max: u64 },

    #[error("File has too many lines: {path} has {count} (max: {max})")]
    TooManyLines { path: String, count: usize, max: usize },

    #[error("IO error: {error}")]
    IoError { error: String },

    #[error("Worker thread error: {message}")]
    ThreadError { message: String },
}

impl BatchError {
    pub fn error_code(&self) -> logging::Code {
        match self {
            BatchError::DirectoryNotFound { .. } => codes::batch::DIRECTORY_NOT_FOUND,
            BatchError::NoFilesFound { .. } => codes::batch::NO_FILES_FOUND,
            BatchError::TooManyFiles { .. } => codes::batch::TOO_MANY_FILES,
            BatchError::FileTooLarge { .. } | BatchError::TooManyLines { .. } => {
                codes::file_processing::FILE_TOO_LARGE
            }
            BatchError::IoError { .. } => codes::file_processing::IO_ERROR,
            BatchError::ThreadError { .. } => codes::batch::THREAD_ERROR,
        }
    }
}

// ============================================================================
// FILE DISCOVERY
// ============================================================================

/// Find `.el` files under a directory, sorted by path
pub fn discover_expression_files(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<Vec<PathBuf>, BatchError> {
    crate::log_info!("Starting file discovery",
        "directory" => dir_path.display(),
        "recursive" => config.recursive
    );

    if !dir_path.is_dir() {
        return Err(BatchError::DirectoryNotFound {
            path: dir_path.display().to_string(),
        });
    }

    let mut files = Vec::new();
    visit_directory(dir_path, &mut files, config.recursive)?;

    if files.is_empty() {
        return Err(BatchError::NoFilesFound {
            path: dir_path.display().to_string(),
        });
    }

    files.sort();

    if let Some(max_files) = config.max_files {
        if files.len() > max_files {
            crate::log_warning!(
                "Reached maximum file limit",
                "files_found" => files.len(),
                "limit" => max_files
            );
            files.truncate(max_files);
        }
    }

    if files.len() > batch_processing::MAX_FILES_PER_BATCH {
        return Err(BatchError::TooManyFiles {
            count: files.len(),
            max: batch_processing::MAX_FILES_PER_BATCH,
        });
    }

    Ok(files)
}

fn visit_directory(
    dir_path: &Path,
    files: &mut Vec<PathBuf>,
    recursive: bool,
) -> Result<(), BatchError> {
    let entries = fs::read_dir(dir_path).map_err(|e| BatchError::IoError {
        error: e.to_string(),
    })?;

    for entry in entries {
        let path = entry
            .map_err(|e| BatchError::IoError {
                error: e.to_string(),
            })?
            .path();

        if path.is_dir() {
            if recursive {
                visit_directory(&path, files, recursive)?;
            }
        } else if is_expression_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

fn is_expression_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(EXPRESSION_FILE_EXTENSION))
}

/// Read the expression lines of one file
pub fn read_expression_lines(file_path: &Path) -> Result<Vec<SourceLine>, BatchError> {
    let metadata = fs::metadata(file_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", file_path.display(), e),
    })?;
    if metadata.len() > file_processing::MAX_FILE_SIZE {
        return Err(BatchError::FileTooLarge {
            path: file_path.display().to_string(),
            size: metadata.len(),
            max: file_processing::MAX_FILE_SIZE,
        });
    }

    let content = fs::read_to_string(file_path).map_err(|e| BatchError::IoError {
        error: format!("{}: {}", file_path.display(), e),
    })?;

    let lines: Vec<SourceLine> = content
        .lines()
        .enumerate()
        .filter(|(_, text)| {
            let trimmed = text.trim();
            !trimmed.is_empty() && !trimmed.starts_with(COMMENT_PREFIX)
        })
        .map(|(index, text)| SourceLine {
            file: file_path.to_path_buf(),
            line: index + 1,
            source: text.to_string(),
        })
        .collect();

    if lines.len() > file_processing::MAX_LINES_PER_FILE {
        return Err(BatchError::TooManyLines {
            path: file_path.display().to_string(),
            count: lines.len(),
            max: file_processing::MAX_LINES_PER_FILE,
        });
    }

    Ok(lines)
}

// ============================================================================
// BATCH PROCESSING
// ============================================================================

fn compile_line(
    line: SourceLine,
    source_id: usize,
    cache: &CompilationCache,
    dialect: Option<Dialect>,
) -> Result<CompiledLine, FailedLine> {
    logging::with_source_context(line.origin(), source_id, || {
        let outcome = cache.get_or_compile(&line.source).map_err(LineError::from).and_then(
            |compiled| match dialect {
                Some(dialect) => render::render_source(&compiled, dialect)
                    .map(|text| (compiled, Some(text)))
                    .map_err(LineError::from),
                None => Ok((compiled, None)),
            },
        );

        match outcome {
            Ok((compiled, rendered)) => Ok(CompiledLine {
                line,
                compiled,
                rendered,
            }),
            Err(error) => {
                crate::log_error!(
                    codes::batch::LINE_FAILED,
                    "Expression failed to compile",
                    "origin" => line.origin(),
                    "error" => &error
                );
                Err(FailedLine { line, error })
            }
        }
    })
}

/// Compile every line of one file into `results`; false when fail-fast tripped
fn process_file_into(
    file_path: &Path,
    file_id: usize,
    cache: &CompilationCache,
    config: &BatchConfig,
    results: &mut BatchResults,
) -> bool {
    let lines = match read_expression_lines(file_path) {
        Ok(lines) => lines,
        Err(e) => {
            crate::log_error!(e.error_code(), &e.to_string(), "file" => file_path.display());
            results.unreadable_files.push((file_path.to_path_buf(), e));
            results.files_processed += 1;
            return !config.fail_fast;
        }
    };

    for (index, line) in lines.into_iter().enumerate() {
        // Unique per file within the limits enforced above
        let source_id = file_id * file_processing::MAX_LINES_PER_FILE + index;
        match compile_line(line, source_id, cache, config.dialect) {
            Ok(compiled) => results.compiled.push(compiled),
            Err(failed) => {
                results.failed.push(failed);
                if config.fail_fast {
                    results.files_processed += 1;
                    return false;
                }
            }
        }
    }

    results.files_processed += 1;
    true
}

/// Compile a single `.el` file
pub fn process_file(file_path: &Path, config: &BatchConfig) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let cache = CompilationCache::new();
    let mut results = BatchResults::new();
    results.files_discovered = 1;

    let lines = read_expression_lines(file_path)?;
    for (index, line) in lines.into_iter().enumerate() {
        match compile_line(line, index, &cache, config.dialect) {
            Ok(compiled) => results.compiled.push(compiled),
            Err(failed) => {
                results.failed.push(failed);
                if config.fail_fast {
                    break;
                }
            }
        }
    }
    results.files_processed = 1;
    results.cache = cache.stats();
    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);
    Ok(results)
}

pub fn process_directory_sequential(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();

    crate::log_info!("Starting sequential batch compilation",
        "directory" => dir_path.display()
    );

    let files = discover_expression_files(dir_path, config)?;
    let cache = CompilationCache::new();
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    for (file_id, file_path) in files.iter().enumerate() {
        if config.progress_reporting {
            println!(
                "Compiling file {} of {}: {}",
                file_id + 1,
                files.len(),
                file_path.display()
            );
        }

        if !process_file_into(file_path, file_id, &cache, config, &mut results) {
            crate::log_warning!("Fail-fast mode enabled, stopping batch compilation");
            break;
        }
    }

    results.cache = cache.stats();
    results.processing_duration = start_time.elapsed();
    log_completion(&results, 1);
    Ok(results)
}

pub fn process_directory_parallel(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let start_time = Instant::now();
    let threads = config
        .max_threads
        .clamp(1, batch_processing::MAX_WORKER_THREADS);

    crate::log_info!("Starting parallel batch compilation",
        "directory" => dir_path.display(),
        "max_threads" => threads
    );

    let files = discover_expression_files(dir_path, config)?;
    let cache = Arc::new(CompilationCache::new());
    let mut results = BatchResults::new();
    results.files_discovered = files.len();

    let chunk_size = calculate_chunk_size(files.len(), threads);
    crate::log_debug!("Parallel compilation configuration",
        "total_files" => files.len(),
        "chunk_size" => chunk_size,
        "threads" => threads
    );

    for (chunk_index, chunk) in files.chunks(chunk_size).enumerate() {
        let first_id = chunk_index * chunk_size;
        let chunk_results = process_chunk_parallel(chunk, first_id, threads, &cache, config)?;
        results.merge(chunk_results);

        if config.fail_fast && results.failure_count() > 0 {
            crate::log_warning!("Fail-fast mode enabled, stopping batch compilation");
            break;
        }
    }

    results.sort();
    results.cache = cache.stats();
    results.processing_duration = start_time.elapsed();
    log_completion(&results, threads);
    Ok(results)
}

fn process_chunk_parallel(
    files: &[PathBuf],
    first_id: usize,
    threads: usize,
    cache: &Arc<CompilationCache>,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    let results = Arc::new(Mutex::new(BatchResults::new()));
    let files_per_thread = files.len().div_ceil(threads);
    let mut handles = Vec::new();

    for (thread_id, thread_files) in files.chunks(files_per_thread.max(1)).enumerate() {
        let thread_files = thread_files.to_vec();
        let start_id = first_id + thread_id * files_per_thread;
        let results = Arc::clone(&results);
        let cache = Arc::clone(cache);
        let config = config.clone();

        handles.push(thread::spawn(move || {
            let mut local = BatchResults::new();
            for (offset, file_path) in thread_files.iter().enumerate() {
                if !process_file_into(file_path, start_id + offset, &cache, &config, &mut local) {
                    break;
                }
            }
            results
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .merge(local);
        }));
    }

    for handle in handles {
        handle.join().map_err(|_| BatchError::ThreadError {
            message: "Worker panicked during compilation".to_string(),
        })?;
    }

    let results = Arc::try_unwrap(results).map_err(|_| BatchError::ThreadError {
        message: "Failed to collect worker results".to_string(),
    })?;
    Ok(results
        .into_inner()
        .unwrap_or_else(|poisoned| poisoned.into_inner()))
}

fn calculate_chunk_size(file_count: usize, threads: usize) -> usize {
    let per_round = threads.max(1) * batch_processing::MAX_CHUNK_SIZE;
    file_count.clamp(1, per_round.max(1))
}

fn log_completion(results: &BatchResults, threads: usize) {
    crate::log_success!(
        codes::success::BATCH_COMPLETE,
        "Batch compilation completed",
        "files_processed" => results.files_processed,
        "compiled" => results.success_count(),
        "failed" => results.failure_count(),
        "cache_hits" => results.cache.hits,
        "threads_used" => threads,
        "duration_ms" => format!("{:.2}", results.processing_duration.as_secs_f64() * 1000.0)
    );
}

// ============================================================================
// PUBLIC API
// ============================================================================

pub fn process_directory_with_config(
    dir_path: &Path,
    config: &BatchConfig,
) -> Result<BatchResults, BatchError> {
    if config.max_threads <= 1 {
        process_directory_sequential(dir_path, config)
    } else {
        process_directory_parallel(dir_path, config)
    }
}

pub fn process_directory(dir_path: &Path) -> Result<BatchResults, BatchError> {
    process_directory_with_config(dir_path, &BatchConfig::default())
}

#[derive(Debug, Clone)]
pub struct BatchInfo {
    pub max_recommended_threads: usize,
    pub max_files_per_batch: usize,
    pub max_lines_per_file: usize,
    pub file_extension: &'static str,
}

impl BatchInfo {
    pub fn summary(&self) -> String {
        format!(
            "Batch compiler: up to {} threads, {} files per batch, {} lines per .{} file",
            self.max_recommended_threads,
            self.max_files_per_batch,
            self.max_lines_per_file,
            self.file_extension
        )
    }
}

pub fn get_batch_info() -> BatchInfo {
    BatchInfo {
        max_recommended_threads: BatchConfig::default().max_threads,
        max_files_per_batch: batch_processing::MAX_FILES_PER_BATCH,
        max_lines_per_file: file_processing::MAX_LINES_PER_FILE,
        file_extension: EXPRESSION_FILE_EXTENSION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::tempdir;

    fn quiet(threads: usize) -> BatchConfig {
        BatchConfig {
            max_threads: threads,
            progress_reporting: false,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn test_read_lines_skips_comments_and_blanks() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("props.el");
        fs::write(&path, "// header\n${a:toUpper()}\n\n   \n  // indented\nplain text\n").unwrap();

        let lines = read_expression_lines(&path).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line, 2);
        assert_eq!(lines[1].source, "plain text");
        assert_eq!(lines[1].line, 6);
        assert!(lines[0].origin().ends_with("props.el:2"));
    }

    #[test]
    fn test_discovery_filters_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.el"), "${a}").unwrap();
        fs::write(dir.path().join("b.EL"), "${b}").unwrap();
        fs::write(dir.path().join("notes.txt"), "${c}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.el"), "${c}").unwrap();

        let files = discover_expression_files(dir.path(), &quiet(1)).unwrap();
        assert_eq!(files.len(), 3);

        let flat = BatchConfig {
            recursive: false,
            ..quiet(1)
        };
        assert_eq!(discover_expression_files(dir.path(), &flat).unwrap().len(), 2);

        let limited = BatchConfig {
            max_files: Some(1),
            ..quiet(1)
        };
        assert_eq!(discover_expression_files(dir.path(), &limited).unwrap().len(), 1);
    }

    #[test]
    fn test_discovery_errors() {
        let dir = tempdir().unwrap();
        assert_matches!(
            discover_expression_files(dir.path(), &quiet(1)),
            Err(BatchError::NoFilesFound { .. })
        );
        assert_matches!(
            discover_expression_files(&dir.path().join("missing"), &quiet(1)),
            Err(BatchError::DirectoryNotFound { .. })
        );
    }

    #[test]
    fn test_failing_line_does_not_block_others() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("mixed.el");
        fs::write(&path, "${a:toUpper()}\n${a:frob()}\n${b:length()}\n").unwrap();

        let results = process_file(&path, &quiet(1)).unwrap();
        assert_eq!(results.success_count(), 2);
        assert_eq!(results.failed.len(), 1);
        assert_eq!(results.failed[0].line.line, 2);
        assert!(results.failed[0].report().contains("UnknownFunctionError"));
    }

    #[test]
    fn test_sequential_and_parallel_agree() {
        let dir = tempdir().unwrap();
        for i in 0..6 {
            fs::write(
                dir.path().join(format!("f{i}.el")),
                format!("${{a{i}:trim()}}\n${{shared:toLower()}}\n${{bad{i}:nope()}}\n"),
            )
            .unwrap();
        }

        let sequential = process_directory_with_config(dir.path(), &quiet(1)).unwrap();
        let parallel = process_directory_with_config(dir.path(), &quiet(3)).unwrap();

        assert_eq!(sequential.files_processed, 6);
        assert_eq!(parallel.files_processed, 6);
        assert_eq!(sequential.success_count(), parallel.success_count());
        assert_eq!(sequential.failed.len(), parallel.failed.len());
        assert!(sequential.cache.hits >= 5);

        let origins = |r: &BatchResults| -> Vec<String> {
            r.compiled.iter().map(|c| c.line.origin()).collect()
        };
        assert_eq!(origins(&sequential), origins(&parallel));
    }

    #[test]
    fn test_fail_fast_stops_sequential_batch() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.el"), "${x:nope()}\n${y}\n").unwrap();
        fs::write(dir.path().join("b.el"), "${z}\n").unwrap();

        let config = BatchConfig {
            fail_fast: true,
            ..quiet(1)
        };
        let results = process_directory_with_config(dir.path(), &config).unwrap();
        assert_eq!(results.failed.len(), 1);
        assert_eq!(results.success_count(), 0);
        assert_eq!(results.files_processed, 1);
    }

    #[test]
    fn test_render_failures_are_line_failures() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("render.el");
        fs::write(&path, "${a:toUpper()}\n${a:evaluateELString()}\n").unwrap();

        let config = BatchConfig {
            dialect: Some(Dialect::Python),
            ..quiet(1)
        };
        let results = process_file(&path, &config).unwrap();
        assert_eq!(results.compiled[0].rendered.as_deref(), Some("el_str(attributes.get(\"a\", '')).upper()"));
        assert_matches!(results.failed[0].error, LineError::Render(_));
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(calculate_chunk_size(0, 4), 1);
        assert_eq!(calculate_chunk_size(3, 4), 3);
        let cap = 4 * batch_processing::MAX_CHUNK_SIZE;
        assert_eq!(calculate_chunk_size(cap + 10, 4), cap);
    }
}
