use crate::catalog;
use crate::config::build_info;
use crate::config::compile_time::cache::MAX_CACHED_EXPRESSIONS;

/// Information about compiler capabilities
#[derive(Debug, Clone)]
pub struct PipelineInfo {
    pub stages: Vec<&'static str>,
    pub catalog_functions: usize,
    pub supported_functions: usize,
    pub unsupported_functions: usize,
    pub math_operations: usize,
    pub max_cached_expressions: usize,
    pub build_profile: &'static str,
    pub global_logging_enabled: bool,
}

impl PipelineInfo {
    pub fn report(&self) -> String {
        format!(
            "EL Compilation Pipeline:\n\
             - Stages: {}\n\
             - Catalog Functions: {} ({} supported, {} declared unsupported)\n\
             - Math Operations: {}\n\
             - Cache Capacity: {}\n\
             - Build Profile: {}\n\
             - Global Logging: {}",
            self.stages.join(" -> "),
            self.catalog_functions,
            self.supported_functions,
            self.unsupported_functions,
            self.math_operations,
            self.max_cached_expressions,
            self.build_profile,
            self.global_logging_enabled,
        )
    }

    pub fn summary(&self) -> String {
        format!(
            "{}-stage EL compiler with {} catalog functions",
            self.stages.len(),
            self.catalog_functions
        )
    }
}

/// Get pipeline capabilities information
pub fn get_pipeline_info() -> PipelineInfo {
    let signatures = catalog::all_signatures();
    let supported = signatures.iter().filter(|s| s.supported).count();

    PipelineInfo {
        stages: vec!["lexical", "syntax", "resolution"],
        catalog_functions: signatures.len(),
        supported_functions: supported,
        unsupported_functions: signatures.len() - supported,
        math_operations: catalog::SUPPORTED_MATH_OPERATIONS.len(),
        max_cached_expressions: MAX_CACHED_EXPRESSIONS,
        build_profile: build_info::profile(),
        global_logging_enabled: crate::logging::is_initialized(),
    }
}
