//! Port for cached page renders.

use async_trait::async_trait;

/// Identifies one cached render.
///
/// Renders are partitioned by the caller's resolved scope so a cached page
/// never leaks across facilities.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderKey {
    path: String,
    variant: String,
}

impl RenderKey {
    /// Key a render of `path` for the given variant.
    pub fn new(path: impl Into<String>, variant: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            variant: variant.into(),
        }
    }

    /// Route path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Scope variant.
    pub fn variant(&self) -> &str {
        &self.variant
    }
}

/// Render cache with path-level invalidation.
///
/// Each path carries a generation that [`PageCache::revalidate`] advances.
/// Callers read it before loading the data they render and hand it back to
/// [`PageCache::put`]; a render started before an invalidation is discarded.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageCache: Send + Sync {
    /// Fetch a cached render.
    async fn get(&self, key: &RenderKey) -> Option<String>;

    /// Current generation of `path`.
    async fn generation(&self, path: &str) -> u64;

    /// Store a render taken at `generation`. Ignored when `path` has been
    /// revalidated since.
    async fn put(&self, key: RenderKey, html: String, generation: u64);

    /// Drop every render of `path`, whatever its variant.
    async fn revalidate(&self, path: &str);
}
