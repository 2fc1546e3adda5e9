//! Process-local memoization of compiled lesson bodies.
//!
//! # Invariants
//! - Entries are keyed by the SHA-256 of the body source, so an edited body
//!   never hits a stale entry.

use super::compile::{compile_lesson_body, CompiledLesson};
use log::debug;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Thread-safe compile cache. Cheap to share behind an `Arc`.
#[derive(Debug, Default)]
pub struct CompileCache {
    entries: Mutex<HashMap<String, Arc<CompiledLesson>>>,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowercase hex SHA-256 of `source`.
    pub fn key_for(source: &str) -> String {
        hex::encode(Sha256::digest(source.as_bytes()))
    }

    /// Returns the cached compilation of `source`, compiling on a miss.
    pub fn get_or_compile(&self, source: &str) -> Arc<CompiledLesson> {
        let key = Self::key_for(source);
        if let Some(hit) = self.lock().get(&key) {
            debug!("event=compile_cache module=content status=hit key={key}");
            return Arc::clone(hit);
        }

        // Compile outside the lock; a racing miss compiles the same source twice.
        let compiled = Arc::new(compile_lesson_body(source));
        debug!("event=compile_cache module=content status=miss key={key}");
        Arc::clone(self.lock().entry(key).or_insert(compiled))
    }

    /// Drops one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Arc<CompiledLesson>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
