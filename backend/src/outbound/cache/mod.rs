//! In-process page render cache.
//!
//! Implements the `PageCache` port with a map of path to scope variant to
//! rendered HTML. Invalidation drops every variant of a path at once, so a
//! write made under one facility scope is never served stale under another.
//! It also advances the path's generation, which turns away renders that
//! loaded their data before the write landed.
//!
//! The cache is per process; multiple replicas each hold their own copy and
//! invalidate independently.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{PageCache, RenderKey};

#[derive(Debug, Default)]
struct PathRenders {
    generation: u64,
    variants: HashMap<String, String>,
}

/// Render cache held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryPageCache {
    entries: RwLock<HashMap<String, PathRenders>>,
}

impl InMemoryPageCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached renders across all paths.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(|renders| renders.variants.len())
            .sum()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PageCache for InMemoryPageCache {
    async fn get(&self, key: &RenderKey) -> Option<String> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key.path())
            .and_then(|renders| renders.variants.get(key.variant()))
            .cloned()
    }

    async fn generation(&self, path: &str) -> u64 {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(path)
            .map_or(0, |renders| renders.generation)
    }

    async fn put(&self, key: RenderKey, html: String, generation: u64) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let renders = entries.entry(key.path().to_owned()).or_default();
        if renders.generation != generation {
            debug!(
                path = key.path(),
                generation,
                current = renders.generation,
                "stale render discarded"
            );
            return;
        }
        renders.variants.insert(key.variant().to_owned(), html);
    }

    async fn revalidate(&self, path: &str) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let renders = entries.entry(path.to_owned()).or_default();
        renders.generation = renders.generation.wrapping_add(1);
        let removed = std::mem::take(&mut renders.variants).len();
        debug!(path, removed, generation = renders.generation, "page cache revalidated");
    }
}
