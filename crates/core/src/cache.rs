//! Cache abstraction for recommendation snapshots.
//!
//! Writes are whole-value replacements, never incremental mutation, so a
//! per-key atomic get/set is all an implementation has to guarantee.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

#[async_trait]
pub trait RecommendationCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Value>;
    async fn set(&self, key: &str, value: Value, ttl: Duration);
    async fn delete(&self, key: &str);
}

/// Process-local TTL cache. Expired entries are dropped lazily on read.
#[derive(Debug, Default)]
pub struct InMemoryTtlCache {
    entries: Mutex<HashMap<String, (Value, Instant)>>,
}

impl InMemoryTtlCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecommendationCache for InMemoryTtlCache {
    async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };

        match entries.get(key) {
            Some((value, expires_at)) if *expires_at > Instant::now() => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.insert(key.to_owned(), (value, Instant::now() + ttl));
    }

    async fn delete(&self, key: &str) {
        let mut entries = match self.entries.lock() {
            Ok(entries) => entries,
            Err(poisoned) => poisoned.into_inner(),
        };
        entries.remove(key);
    }
}
