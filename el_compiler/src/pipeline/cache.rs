//! Read-mostly cache of compiled expressions keyed by source text

use super::{compile, CompileError, CompiledExpression};
use crate::config::compile_time::cache::MAX_CACHED_EXPRESSIONS;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: usize,
    pub misses: usize,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Failed compilations are not cached, so every caller sees the error.
#[derive(Debug)]
pub struct CompilationCache {
    entries: RwLock<HashMap<Arc<str>, CompiledExpression>>,
    capacity: usize,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl Default for CompilationCache {
    fn default() -> Self {
        Self::with_capacity(MAX_CACHED_EXPRESSIONS)
    }
}

impl CompilationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            capacity,
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    pub fn get(&self, source: &str) -> Option<CompiledExpression> {
        let entries = self.entries.read().unwrap_or_else(|p| p.into_inner());
        entries.get(source).cloned()
    }

    /// Cached expression for `source`, compiling it on a miss
    pub fn get_or_compile(&self, source: &str) -> Result<CompiledExpression, CompileError> {
        if let Some(compiled) = self.get(source) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(compiled);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let compiled = compile(source)?;

        let mut entries = self.entries.write().unwrap_or_else(|p| p.into_inner());
        if entries.len() < self.capacity {
            entries
                .entry(Arc::from(source))
                .or_insert_with(|| compiled.clone());
        }
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(|p| p.into_inner())
            .clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
