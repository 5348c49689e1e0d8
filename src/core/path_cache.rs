// src/core/path_cache.rs

//! # Path Cache
//!
//! Memoizes executable lookups by command name. The cache is owned by the
//! application state and shared behind an `Arc`; pre-warm workers and the main
//! flow read and write it concurrently under a `RwLock`.
//!
//! Only hits are stored. A miss or a timed-out lookup is not remembered, so a later
//! cold lookup gets another chance. Once a name is resolved, its path never changes
//! for the lifetime of the process.

use crate::constants::{PATH_LOOKUP_TIMEOUT, SHELL_BUILTINS};
use std::{
    collections::HashMap,
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};
use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathCacheError {
    /// The search finished without finding an executable with this name.
    #[error("Command '{0}' was not found in the search path.")]
    NotFound(String),
    /// The search did not finish within the lookup timeout.
    #[error("Lookup for command '{0}' timed out.")]
    Timeout(String),
}

/// A blocking executable search. Implementations must be cheap to share across threads.
pub trait ExecutableSearch: Send + Sync + 'static {
    /// Returns the absolute path of `name`, or `None` if it cannot be found.
    fn search(&self, name: &str) -> Option<PathBuf>;
}

/// Searches the directories named by `PATH`, or an explicit list of directories.
#[derive(Debug, Clone, Default)]
pub struct SystemSearch {
    paths: Option<OsString>,
}

impl SystemSearch {
    /// Searches the process's `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Searches only the given `PATH`-style list of directories.
    pub fn with_paths(paths: impl Into<OsString>) -> Self {
        Self {
            paths: Some(paths.into()),
        }
    }
}

impl ExecutableSearch for SystemSearch {
    fn search(&self, name: &str) -> Option<PathBuf> {
        match &self.paths {
            Some(paths) => {
                let cwd = std::env::current_dir().ok()?;
                which::which_in(name, Some(paths), cwd).ok()
            }
            None => which::which(name).ok(),
        }
    }
}

/// Concurrent, append-only cache of resolved executable paths.
pub struct PathCache {
    entries: RwLock<HashMap<String, PathBuf>>,
    search: Arc<dyn ExecutableSearch>,
    timeout: Duration,
}

impl fmt::Debug for PathCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathCache")
            .field("entries", &self.len())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(SystemSearch::new())
    }
}

impl PathCache {
    pub fn new(search: impl ExecutableSearch) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            search: Arc::new(search),
            timeout: PATH_LOOKUP_TIMEOUT,
        }
    }

    /// Overrides the bounded wait applied to each cold lookup.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a cached hit without searching.
    pub fn get(&self, name: &str) -> Option<PathBuf> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Number of resolved commands currently cached.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolves a command name to an executable path.
    ///
    /// Resolution order:
    /// 1. A cached hit is returned immediately.
    /// 2. Shell built-ins (`cd`, `echo`, `exit`) resolve to themselves.
    /// 3. Absolute paths are checked for existence instead of searched.
    /// 4. Anything else is searched on a blocking task, bounded by the lookup timeout.
    ///
    /// # Errors
    /// `NotFound` if the search completes without a match, `Timeout` if it does not
    /// complete in time. Neither outcome is cached.
    pub async fn resolve(&self, name: &str) -> Result<PathBuf, PathCacheError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PathCacheError::NotFound(String::new()));
        }

        if let Some(hit) = self.get(name) {
            log::trace!("Path cache hit for '{}'", name);
            return Ok(hit);
        }

        if SHELL_BUILTINS.contains(&name) {
            return Ok(PathBuf::from(name));
        }

        let as_path = Path::new(name);
        if as_path.is_absolute() {
            return if as_path.exists() {
                Ok(self.insert(name, as_path.to_path_buf()))
            } else {
                Err(PathCacheError::NotFound(name.to_string()))
            };
        }

        let search = Arc::clone(&self.search);
        let owned_name = name.to_string();
        let lookup = tokio::task::spawn_blocking(move || search.search(&owned_name));

        match tokio::time::timeout(self.timeout, lookup).await {
            Ok(Ok(Some(found))) => {
                log::debug!("Resolved '{}' to '{}'", name, found.display());
                Ok(self.insert(name, found))
            }
            Ok(Ok(None)) => Err(PathCacheError::NotFound(name.to_string())),
            Ok(Err(join_error)) => {
                log::warn!("Lookup task for '{}' failed: {}", name, join_error);
                Err(PathCacheError::NotFound(name.to_string()))
            }
            Err(_) => Err(PathCacheError::Timeout(name.to_string())),
        }
    }

    /// Resolves every name concurrently in the background.
    ///
    /// Failures are only logged; a later synchronous lookup retries them. The returned
    /// handle completes once every lookup has finished and may simply be dropped.
    pub fn prewarm(self: &Arc<Self>, names: &[&str]) -> JoinHandle<()> {
        let lookups: Vec<JoinHandle<()>> = names
            .iter()
            .map(|name| {
                let cache = Arc::clone(self);
                let name = (*name).to_string();
                tokio::spawn(async move {
                    if let Err(e) = cache.resolve(&name).await {
                        log::debug!("Pre-warm skipped: {}", e);
                    }
                })
            })
            .collect();

        let cache = Arc::clone(self);
        tokio::spawn(async move {
            for lookup in lookups {
                let _ = lookup.await;
            }
            log::debug!("Path cache pre-warm finished with {} entries", cache.len());
        })
    }

    /// Stores a hit unless one is already present and returns the stored value.
    fn insert(&self, name: &str, path: PathBuf) -> PathBuf {
        let mut entries = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        entries.entry(name.to_string()).or_insert(path).clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::NamedTempFile;

    /// A search over a fixed table that counts how often it is consulted.
    #[derive(Debug, Default)]
    pub(crate) struct FakeSearch {
        pub(crate) known: HashMap<String, PathBuf>,
        pub(crate) delay: Duration,
        pub(crate) calls: Arc<AtomicUsize>,
    }

    impl FakeSearch {
        pub(crate) fn with(names: &[&str]) -> Self {
            Self {
                known: names
                    .iter()
                    .map(|n| ((*n).to_string(), PathBuf::from(format!("/fake/bin/{n}"))))
                    .collect(),
                ..Self::default()
            }
        }
    }

    impl ExecutableSearch for FakeSearch {
        fn search(&self, name: &str) -> Option<PathBuf> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }
            self.known.get(name).cloned()
        }
    }

    #[tokio::test]
    async fn test_second_resolution_is_served_from_cache() {
        let search = FakeSearch::with(&["fzf"]);
        let calls = Arc::clone(&search.calls);
        let cache = PathCache::new(search);

        let first = cache.resolve("fzf").await.unwrap();
        let second = cache.resolve("fzf").await.unwrap();

        assert_eq!(first, PathBuf::from("/fake/bin/fzf"));
        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_misses_are_not_cached() {
        let search = FakeSearch::with(&[]);
        let calls = Arc::clone(&search.calls);
        let cache = PathCache::new(search);

        for _ in 0..2 {
            assert_eq!(
                cache.resolve("nope").await,
                Err(PathCacheError::NotFound("nope".to_string()))
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_builtins_resolve_to_themselves() {
        let search = FakeSearch::with(&[]);
        let calls = Arc::clone(&search.calls);
        let cache = PathCache::new(search);

        for builtin in ["cd", "echo", "exit"] {
            assert_eq!(cache.resolve(builtin).await.unwrap(), PathBuf::from(builtin));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_absolute_paths_are_checked_for_existence() {
        let search = FakeSearch::with(&[]);
        let calls = Arc::clone(&search.calls);
        let cache = PathCache::new(search);
        let file = NamedTempFile::new().unwrap();
        let existing = file.path().to_str().unwrap().to_string();

        assert_eq!(cache.resolve(&existing).await.unwrap(), file.path());
        assert!(matches!(
            cache.resolve("/definitely/not/here/bin").await,
            Err(PathCacheError::NotFound(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_slow_search_reports_timeout() {
        let search = FakeSearch {
            delay: Duration::from_millis(300),
            ..FakeSearch::with(&["slow"])
        };
        let cache = PathCache::new(search).with_timeout(Duration::from_millis(20));

        assert_eq!(
            cache.resolve("slow").await,
            Err(PathCacheError::Timeout("slow".to_string()))
        );
        assert!(cache.get("slow").is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_resolutions_agree() {
        let cache = Arc::new(PathCache::new(FakeSearch::with(&["mpv"])));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                tokio::spawn(async move { cache.resolve("mpv").await })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), PathBuf::from("/fake/bin/mpv"));
        }
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_prewarm_populates_hits_and_ignores_failures() {
        let cache = Arc::new(PathCache::new(FakeSearch::with(&["fzf", "file"])));

        cache.prewarm(&["fzf", "file", "missing"]).await.unwrap();

        assert_eq!(cache.get("fzf"), Some(PathBuf::from("/fake/bin/fzf")));
        assert_eq!(cache.get("file"), Some(PathBuf::from("/fake/bin/file")));
        assert_eq!(cache.get("missing"), None);
    }
}
