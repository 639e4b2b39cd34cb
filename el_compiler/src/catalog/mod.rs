//! Function catalog
//!
//! Process-wide immutable table mapping function names to signatures. The
//! lookup indexes are built on first use and never mutated afterwards, so
//! concurrent compilations share them without locking.

pub mod functions;
pub mod signature;

pub use functions::{
    BooleanFn, DateTimeFn, EncodingFn, Function, HashFn, JsonFn, MultiFn, NumericFn, StandaloneFn,
    StateFn, StringFn,
};
pub use signature::{Category, FunctionSignature, ValueType};

use signature::SIGNATURES;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Operation names accepted by `math(op)` and `math(op, arg)`
pub const SUPPORTED_MATH_OPERATIONS: &[&str] = &[
    "abs", "ceil", "floor", "round", "sqrt", "cbrt", "signum", "exp", "log", "log10", "sin", "cos",
    "tan", "pow", "max", "min",
];

/// Alternative spellings accepted in source
const ALIASES: &[(&str, &str)] = &[("uuid", "UUID")];

static BY_NAME: OnceLock<HashMap<&'static str, &'static FunctionSignature>> = OnceLock::new();
static BY_FUNCTION: OnceLock<HashMap<Function, &'static FunctionSignature>> = OnceLock::new();

fn by_name() -> &'static HashMap<&'static str, &'static FunctionSignature> {
    BY_NAME.get_or_init(|| {
        let mut map: HashMap<&'static str, &'static FunctionSignature> =
            SIGNATURES.iter().map(|sig| (sig.name, sig)).collect();
        for (alias, target) in ALIASES {
            if let Some(sig) = map.get(target).copied() {
                map.insert(*alias, sig);
            }
        }
        map
    })
}

/// Look up a function by the name written in source
pub fn lookup(name: &str) -> Option<&'static FunctionSignature> {
    by_name().get(name).copied()
}

pub fn signature_of(function: Function) -> Option<&'static FunctionSignature> {
    BY_FUNCTION
        .get_or_init(|| SIGNATURES.iter().map(|sig| (sig.function, sig)).collect())
        .get(&function)
        .copied()
}

pub fn all_signatures() -> &'static [FunctionSignature] {
    SIGNATURES
}

pub fn is_supported_math_operation(op: &str) -> bool {
    SUPPORTED_MATH_OPERATIONS.contains(&op)
}

/// Per-category counts, used by diagnostics output
pub fn category_counts() -> Vec<(Category, usize)> {
    let mut counts: Vec<(Category, usize)> = Vec::new();
    for sig in SIGNATURES {
        match counts.iter_mut().find(|(c, _)| *c == sig.category) {
            Some((_, n)) => *n += 1,
            None => counts.push((sig.category, 1)),
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_function_has_one_signature() {
        let mut seen = HashSet::new();
        for function in Function::all() {
            let sig = signature_of(function)
                .unwrap_or_else(|| panic!("missing signature for {}", function));
            assert_eq!(sig.name, function.name());
            assert!(seen.insert(sig.name), "duplicate {}", sig.name);
        }
        assert_eq!(seen.len(), all_signatures().len());
    }

    #[test]
    fn test_lookup_and_alias() {
        let sig = lookup("substringBefore").unwrap();
        assert_eq!(sig.min_args, 1);
        assert_eq!(sig.max_args, Some(1));
        assert!(sig.requires_subject);

        assert_eq!(lookup("uuid").unwrap().function, Function::Standalone(StandaloneFn::Uuid));
        assert!(lookup("toupper").is_none());
    }

    #[test]
    fn test_flags() {
        assert!(lookup("join").unwrap().is_reducing);
        assert!(lookup("count").unwrap().is_reducing);
        assert!(lookup("allAttributes").unwrap().produces_multi);
        assert!(!lookup("allAttributes").unwrap().requires_subject);
        assert!(lookup("isNull").unwrap().null_safe);
        assert!(!lookup("isEmpty").unwrap().null_safe);
        assert!(!lookup("and").unwrap().multi_aware);
        assert!(!lookup("jsonPath").unwrap().supported);
        assert!(!lookup("getStateValue").unwrap().supported);
        assert_eq!(lookup("getStateValue").unwrap().category, Category::State);
        assert!(lookup("base64Encode").unwrap().supported);
    }

    #[test]
    fn test_arity() {
        let sig = lookup("in").unwrap();
        assert!(sig.accepts_arity(5));
        assert!(!sig.accepts_arity(0));
        assert_eq!(sig.arity_description(), "1+");
        assert_eq!(lookup("substring").unwrap().arity_description(), "1-2");
        assert_eq!(lookup("jsonPathPut").unwrap().arity_description(), "3");
    }

    #[test]
    fn test_math_operations() {
        assert!(is_supported_math_operation("sqrt"));
        assert!(!is_supported_math_operation("gamma"));
        let total: usize = category_counts().iter().map(|(_, n)| n).sum();
        assert_eq!(total, all_signatures().len());
    }
}
