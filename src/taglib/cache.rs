//! Per-project cache of loaded tag libraries.
//!
//! Loading a project's taglibs walks the filesystem, so results are kept
//! per project root until [`TaglibCache::clear`] is called (configuration
//! changes, watched descriptor files, shutdown). Async callers go through
//! [`TaglibCache::preload`] so the walk runs on the blocking pool.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use super::loader::{DiscoveryOptions, TaglibLoader, find_project_root};
use super::lookup::TaglibLookup;

pub struct TaglibCache {
    options: ArcSwap<DiscoveryOptions>,
    lookups: Arc<DashMap<PathBuf, Arc<TaglibLookup>>>,
}

impl std::fmt::Debug for TaglibCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaglibCache")
            .field("options", &self.options.load())
            .field("cached_roots", &self.lookups.len())
            .finish()
    }
}

impl Default for TaglibCache {
    fn default() -> Self {
        Self::new(DiscoveryOptions::default())
    }
}

impl TaglibCache {
    pub fn new(options: DiscoveryOptions) -> Self {
        Self {
            options: ArcSwap::new(Arc::new(options)),
            lookups: Arc::new(DashMap::new()),
        }
    }

    /// Lookup for the project owning `dir`, loading it on first use.
    pub fn lookup(&self, dir: &Path) -> Arc<TaglibLookup> {
        lookup_or_load(&self.lookups, &self.options.load(), dir)
    }

    /// Same as [`TaglibCache::lookup`], with root detection and loading
    /// moved onto tokio's blocking pool.
    pub async fn preload(&self, dir: &Path) -> Arc<TaglibLookup> {
        let lookups = Arc::clone(&self.lookups);
        let options = self.options.load_full();
        let owned_dir = dir.to_path_buf();
        let task = tokio::task::spawn_blocking(move || {
            lookup_or_load(&lookups, &options, &owned_dir)
        });
        match task.await {
            Ok(lookup) => lookup,
            Err(err) => {
                log::warn!(target: "marko_ls::taglib", "Taglib load task failed: {}", err);
                self.lookup(dir)
            }
        }
    }

    /// Replace discovery options. Cached lookups are dropped when they change.
    pub fn set_options(&self, options: DiscoveryOptions) {
        if **self.options.load() != options {
            self.options.store(Arc::new(options));
            self.clear();
        }
    }

    pub fn clear(&self) {
        log::debug!(
            target: "marko_ls::taglib",
            "Clearing {} cached taglib lookups",
            self.lookups.len()
        );
        self.lookups.clear();
    }

    pub fn len(&self) -> usize {
        self.lookups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lookups.is_empty()
    }
}

fn lookup_or_load(
    lookups: &DashMap<PathBuf, Arc<TaglibLookup>>,
    options: &DiscoveryOptions,
    dir: &Path,
) -> Arc<TaglibLookup> {
    let root = find_project_root(dir);
    if let Some(cached) = lookups.get(&root) {
        return Arc::clone(cached.value());
    }

    let loaded = Arc::new(TaglibLoader::new(options).load(&root));
    // Concurrent loads of one root produce equivalent lookups; the last insert wins.
    lookups.insert(root, Arc::clone(&loaded));
    loaded
}
