//! Consolidated diagnostic codes and classification system
//!
//! Single source of truth for all codes, their metadata, and classification functions.

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// CODE WRAPPER TYPE
// ============================================================================

/// Universal code wrapper for both error and success codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Code(&'static str);

impl Code {
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for Code {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// ERROR CLASSIFICATION TYPES
// ============================================================================

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Critical = 0,
    High = 1,
    Medium = 2,
    Low = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
        }
    }
}

/// Complete metadata for a code
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: &'static str,
    pub severity: Severity,
    pub recoverable: bool,
    pub requires_halt: bool,
    pub description: &'static str,
    pub recommended_action: &'static str,
}

impl ErrorMetadata {
    pub fn new(
        code: &'static str,
        category: &'static str,
        severity: Severity,
        recoverable: bool,
        requires_halt: bool,
        description: &'static str,
        recommended_action: &'static str,
    ) -> Self {
        Self {
            code,
            category,
            severity,
            recoverable,
            requires_halt,
            description,
            recommended_action,
        }
    }
}

// ============================================================================
// ERROR CODE CONSTANTS
// ============================================================================

/// System error codes
pub mod system {
    use super::Code;

    pub const INTERNAL_ERROR: Code = Code::new("ERR001");
    pub const INITIALIZATION_FAILURE: Code = Code::new("ERR002");
}

/// Source file error codes (batch inputs, replay corpora)
pub mod file_processing {
    use super::Code;

    pub const FILE_NOT_FOUND: Code = Code::new("E005");
    pub const FILE_TOO_LARGE: Code = Code::new("E007");
    pub const IO_ERROR: Code = Code::new("E011");
    pub const INVALID_PATH: Code = Code::new("E012");
}

/// Lexical analysis error codes
pub mod lexical {
    use super::Code;

    pub const INVALID_CHARACTER: Code = Code::new("E020");
    pub const UNTERMINATED_STRING: Code = Code::new("E021");
    pub const INVALID_NUMBER: Code = Code::new("E022");
    pub const UNTERMINATED_EXPRESSION: Code = Code::new("E023");
    pub const UNTERMINATED_PARAMETER: Code = Code::new("E024");
    pub const EMPTY_PARAMETER_NAME: Code = Code::new("E025");
}

/// Syntax (parser) error codes
pub mod syntax {
    use super::Code;

    pub const UNEXPECTED_TOKEN: Code = Code::new("E040");
    pub const UNEXPECTED_END_OF_INPUT: Code = Code::new("E041");
    pub const EMPTY_EXPRESSION: Code = Code::new("E042");
    pub const NESTED_EXPRESSION: Code = Code::new("E043");
}

/// Semantic resolution error codes
pub mod resolution {
    use super::Code;

    pub const UNKNOWN_FUNCTION: Code = Code::new("E060");
    pub const ARITY_MISMATCH: Code = Code::new("E061");
    pub const SUBJECT_REQUIRED: Code = Code::new("E062");
    pub const SUBJECT_NOT_ALLOWED: Code = Code::new("E063");
    pub const MULTI_VALUE_UNREDUCED: Code = Code::new("E064");
    pub const UNSUPPORTED_FEATURE: Code = Code::new("E065");
}

/// Evaluation error codes
pub mod evaluation {
    use super::Code;

    pub const TYPE_COERCION: Code = Code::new("E080");
    pub const INVALID_REGEX: Code = Code::new("E081");
    pub const ARITHMETIC: Code = Code::new("E082");
    pub const INVALID_ARGUMENT: Code = Code::new("E083");
    pub const UNSUPPORTED_FEATURE: Code = Code::new("E084");
    pub const HOST_LOOKUP: Code = Code::new("E085");
    pub const NESTED_COMPILE: Code = Code::new("E086");
    pub const UNREDUCED_MULTI_VALUE: Code = Code::new("E087");
}

/// Source rendering error codes
pub mod render {
    use super::Code;

    pub const UNSUPPORTED_IN_DIALECT: Code = Code::new("E090");
}

/// Batch compilation error codes
pub mod batch {
    use super::Code;

    pub const DIRECTORY_NOT_FOUND: Code = Code::new("E100");
    pub const NO_FILES_FOUND: Code = Code::new("E101");
    pub const TOO_MANY_FILES: Code = Code::new("E102");
    pub const THREAD_ERROR: Code = Code::new("E103");
    pub const LINE_FAILED: Code = Code::new("E104");
}

/// Sample replay error codes
pub mod replay {
    use super::Code;

    pub const CORPUS_UNREADABLE: Code = Code::new("E110");
    pub const CORPUS_INVALID: Code = Code::new("E111");
    pub const SAMPLE_MISMATCH: Code = Code::new("E112");
}

// ============================================================================
// SUCCESS CODE CONSTANTS
// ============================================================================

/// Success codes
pub mod success {
    use super::Code;

    pub const OPERATION_COMPLETED_SUCCESSFULLY: Code = Code::new("I001");
    pub const SYSTEM_INITIALIZATION_COMPLETED: Code = Code::new("I004");
    pub const FILE_PROCESSING_SUCCESS: Code = Code::new("I006");
    pub const TOKENIZATION_COMPLETE: Code = Code::new("I020");
    pub const CST_CONSTRUCTION_COMPLETE: Code = Code::new("I040");
    pub const RESOLUTION_COMPLETE: Code = Code::new("I060");
    pub const COMPILATION_COMPLETE: Code = Code::new("I070");
    pub const EVALUATION_COMPLETE: Code = Code::new("I080");
    pub const RENDER_COMPLETE: Code = Code::new("I090");
    pub const BATCH_COMPLETE: Code = Code::new("I100");
    pub const REPLAY_COMPLETE: Code = Code::new("I110");
}

// ============================================================================
// ERROR METADATA REGISTRY
// ============================================================================

type MetadataRow = (
    &'static str,
    &'static str,
    Severity,
    bool,
    bool,
    &'static str,
    &'static str,
);

/// (code, category, severity, recoverable, requires_halt, description, action)
const METADATA_TABLE: &[MetadataRow] = &[
    // System
    ("ERR001", "System", Severity::Critical, false, true,
        "Critical internal compiler error",
        "File a bug report with the failing expression"),
    ("ERR002", "System", Severity::Critical, false, true,
        "Logging or configuration initialization failed",
        "Check EL_* environment variables and the build profile"),
    // Files
    ("E005", "FileProcessing", Severity::High, true, false,
        "Input file or directory not found",
        "Check the path passed on the command line"),
    ("E007", "FileProcessing", Severity::High, true, false,
        "Input file exceeds the configured size limit",
        "Split the file or raise max_file_size in the build profile"),
    ("E011", "FileProcessing", Severity::High, true, false,
        "I/O error while reading input",
        "Check permissions and that the file is valid UTF-8"),
    ("E012", "FileProcessing", Severity::Medium, true, false,
        "Input path is not usable",
        "Pass an .el file or a directory containing .el files"),
    // Lexical
    ("E020", "Lexical", Severity::High, true, false,
        "Character not valid inside an expression",
        "Quote the value or remove the character"),
    ("E021", "Lexical", Severity::High, true, false,
        "String literal is missing its closing quote",
        "Close the string with the same quote character it was opened with"),
    ("E022", "Lexical", Severity::High, true, false,
        "Malformed or out-of-range numeric literal",
        "Use an integer, decimal or exponent literal within 64-bit range"),
    ("E023", "Lexical", Severity::High, true, false,
        "Expression opened with ${ is never closed",
        "Add the closing } or escape the dollar sign as $$"),
    ("E024", "Lexical", Severity::High, true, false,
        "Parameter reference opened with #{ is never closed",
        "Add the closing } or escape the marker as ##{"),
    ("E025", "Lexical", Severity::High, true, false,
        "Parameter reference has an empty name",
        "Write the parameter name between #{ and }"),
    // Syntax
    ("E040", "Syntax", Severity::High, true, false,
        "Token does not fit the expression grammar here",
        "Check the function call syntax subject:function(args)"),
    ("E041", "Syntax", Severity::High, true, false,
        "Expression ended before it was complete",
        "Complete the function call or argument list"),
    ("E042", "Syntax", Severity::High, true, false,
        "Expression has no subject",
        "Write an attribute name or a standalone function inside ${}"),
    ("E043", "Syntax", Severity::High, true, false,
        "A nested expression is malformed",
        "Fix the inner ${...} expression"),
    // Resolution
    ("E060", "Resolution", Severity::High, true, false,
        "Function name is not in the catalog",
        "Check the spelling of the function name"),
    ("E061", "Resolution", Severity::High, true, false,
        "Function called with the wrong number of arguments",
        "Pass the number of arguments the function accepts"),
    ("E062", "Resolution", Severity::High, true, false,
        "Function needs a subject but was called standalone",
        "Apply the function to a subject, e.g. ${attr:function()}"),
    ("E063", "Resolution", Severity::High, true, false,
        "Standalone function used inside a chain",
        "Call the function at the head of an expression"),
    ("E064", "Resolution", Severity::High, true, false,
        "Multi-value result is never reduced",
        "End the chain with join(), count() or a boolean predicate"),
    ("E065", "Resolution", Severity::Medium, true, false,
        "Function is recognized but not supported",
        "Replace the function or degrade to a flagged placeholder"),
    // Evaluation
    ("E080", "Evaluation", Severity::Medium, true, false,
        "Value could not be coerced to the required type",
        "Check the attribute values fed to the expression"),
    ("E081", "Evaluation", Severity::Medium, true, false,
        "Regular expression failed to compile",
        "Fix the regular expression argument"),
    ("E082", "Evaluation", Severity::Medium, true, false,
        "Arithmetic error such as integer division by zero",
        "Guard the divisor before dividing"),
    ("E083", "Evaluation", Severity::Medium, true, false,
        "Argument value is outside the accepted range",
        "Check the argument against the function contract"),
    ("E084", "Evaluation", Severity::Medium, true, false,
        "Operation is recognized but not supported at runtime",
        "Use a supported operation"),
    ("E085", "Evaluation", Severity::Medium, true, false,
        "Host information could not be read",
        "Check the host name configuration"),
    ("E086", "Evaluation", Severity::Medium, true, false,
        "Expression produced at runtime failed to compile",
        "Check the attribute passed to evaluateELString"),
    ("E087", "Evaluation", Severity::High, true, false,
        "Multi-value reached a function that cannot consume it",
        "Reduce the multi-value with join() or count()"),
    // Render
    ("E090", "Render", Severity::Medium, true, false,
        "Expression cannot be rendered in the requested dialect",
        "Use the evaluator artifact or the canonical dialect"),
    // Batch
    ("E100", "Batch", Severity::High, true, false,
        "Batch input directory not found",
        "Check the directory path"),
    ("E101", "Batch", Severity::Medium, true, false,
        "No .el files found",
        "Add .el files or point at another directory"),
    ("E102", "Batch", Severity::Medium, true, false,
        "More files than the batch limit allows",
        "Use --max-files or split the directory"),
    ("E103", "Batch", Severity::Critical, false, true,
        "Worker thread failed",
        "Re-run with --sequential to isolate the failure"),
    ("E104", "Batch", Severity::Medium, true, false,
        "A property line failed to compile",
        "Fix the reported expression; other lines are unaffected"),
    // Replay
    ("E110", "Replay", Severity::High, true, false,
        "Sample corpus could not be read",
        "Check the corpus path"),
    ("E111", "Replay", Severity::High, true, false,
        "Sample corpus is not valid JSON",
        "Check the corpus against the sample schema"),
    ("E112", "Replay", Severity::Medium, true, false,
        "Evaluated value differs from the captured value",
        "Inspect the diff report for the sample"),
    // Success
    ("I001", "Success", Severity::Low, true, false,
        "Operation completed successfully", "Continue"),
    ("I004", "Success", Severity::Low, true, false,
        "System initialization completed", "Continue"),
    ("I006", "Success", Severity::Low, true, false,
        "Input file processed", "Continue"),
    ("I020", "Success", Severity::Low, true, false,
        "Tokenization completed", "Continue to parsing"),
    ("I040", "Success", Severity::Low, true, false,
        "Concrete syntax tree built", "Continue to resolution"),
    ("I060", "Success", Severity::Low, true, false,
        "Expression resolved against the catalog", "Continue to rendering"),
    ("I070", "Success", Severity::Low, true, false,
        "Expression compiled", "Evaluate or render the compiled expression"),
    ("I080", "Success", Severity::Low, true, false,
        "Expression evaluated", "Continue"),
    ("I090", "Success", Severity::Low, true, false,
        "Expression rendered", "Continue"),
    ("I100", "Success", Severity::Low, true, false,
        "Batch compilation finished", "Review the summary"),
    ("I110", "Success", Severity::Low, true, false,
        "Sample replay finished", "Review the diff report"),
];

/// Error metadata registry using OnceLock for thread safety
static ERROR_REGISTRY: OnceLock<HashMap<&'static str, ErrorMetadata>> = OnceLock::new();

fn get_error_registry() -> &'static HashMap<&'static str, ErrorMetadata> {
    ERROR_REGISTRY.get_or_init(|| {
        METADATA_TABLE
            .iter()
            .map(|&(code, category, severity, recoverable, halt, description, action)| {
                (
                    code,
                    ErrorMetadata::new(
                        code,
                        category,
                        severity,
                        recoverable,
                        halt,
                        description,
                        action,
                    ),
                )
            })
            .collect()
    })
}

// ============================================================================
// CLASSIFICATION FUNCTIONS
// ============================================================================

/// Get error metadata for a specific code
pub fn get_error_metadata(code: &str) -> Option<&'static ErrorMetadata> {
    get_error_registry().get(code)
}

/// Get severity from code
pub fn get_severity(code: &str) -> Severity {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.severity)
        .unwrap_or(Severity::Medium)
}

/// Check if error is recoverable
pub fn is_recoverable(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recoverable)
        .unwrap_or(true)
}

/// Check if error requires immediate halt
pub fn requires_halt(code: &str) -> bool {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.requires_halt)
        .unwrap_or(false)
}

/// Get human-readable description for code
pub fn get_description(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.description)
        .unwrap_or("Unknown error")
}

/// Get recommended action for code
pub fn get_action(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.recommended_action)
        .unwrap_or("No specific action available")
}

/// Get category from code
pub fn get_category(code: &str) -> &'static str {
    get_error_registry()
        .get(code)
        .map(|metadata| metadata.category)
        .unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_constant_has_metadata() {
        let all = [
            system::INTERNAL_ERROR,
            lexical::UNTERMINATED_EXPRESSION,
            syntax::NESTED_EXPRESSION,
            resolution::MULTI_VALUE_UNREDUCED,
            resolution::UNSUPPORTED_FEATURE,
            evaluation::TYPE_COERCION,
            render::UNSUPPORTED_IN_DIALECT,
            batch::LINE_FAILED,
            replay::SAMPLE_MISMATCH,
            success::COMPILATION_COMPLETE,
        ];
        for code in all {
            assert!(
                get_error_metadata(code.as_str()).is_some(),
                "missing metadata for {}",
                code
            );
        }
    }

    #[test]
    fn test_classification() {
        assert_eq!(get_category("E061"), "Resolution");
        assert_eq!(get_severity("ERR001"), Severity::Critical);
        assert!(requires_halt("ERR001"));
        assert!(is_recoverable("E080"));
        assert_eq!(get_description("nope"), "Unknown error");
    }
}
