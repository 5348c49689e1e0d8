// EN: src/system/shell.rs

//! One-shot detection of the interactive shell used to run the picker.

use crate::{
    constants::{SHELL_CANDIDATES, SHELL_DETECT_TIMEOUT},
    core::path_cache::PathCache,
    models::ShellKind,
};
use colored::Colorize;
use std::{env, path::PathBuf, sync::Arc, time::Duration};
use tokio::{sync::OnceCell, task::JoinHandle, time::Instant};

/// Detects the user's shell at most once per process.
///
/// Concurrent callers of [`ShellDetector::detect`] share a single detection run;
/// once a shell is chosen it never changes.
#[derive(Debug)]
pub struct ShellDetector {
    paths: Arc<PathCache>,
    declared: Option<String>,
    timeout: Duration,
    choice: OnceCell<ShellKind>,
}

impl ShellDetector {
    /// Creates a detector that trusts `$SHELL` when it names a known shell.
    pub fn from_env(paths: Arc<PathCache>) -> Self {
        Self::new(paths, env::var("SHELL").ok())
    }

    pub fn new(paths: Arc<PathCache>, declared: Option<String>) -> Self {
        Self {
            paths,
            declared,
            timeout: SHELL_DETECT_TIMEOUT,
            choice: OnceCell::new(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The detected shell, if detection has already completed.
    pub fn get(&self) -> Option<ShellKind> {
        self.choice.get().copied()
    }

    /// Returns the shell to use, running detection on the first call only.
    pub async fn detect(&self) -> ShellKind {
        *self.choice.get_or_init(|| self.run_detection()).await
    }

    /// Resolves the detected shell to an executable path, falling back to its bare name.
    ///
    /// When the shell came from an absolute, existing `$SHELL`, that exact binary is
    /// used instead of searching `PATH` for a same-named one.
    pub async fn shell_path(&self) -> PathBuf {
        let shell = self.detect().await;
        if let Some(declared) = self.declared_path(shell) {
            return declared;
        }
        self.paths
            .resolve(shell.as_str())
            .await
            .unwrap_or_else(|_| PathBuf::from(shell.as_str()))
    }

    /// Starts detection in the background so later callers find it already done.
    pub fn spawn_detection(self: &Arc<Self>) -> JoinHandle<ShellKind> {
        let detector = Arc::clone(self);
        tokio::spawn(async move { detector.detect().await })
    }

    fn declared_path(&self, shell: ShellKind) -> Option<PathBuf> {
        let declared = PathBuf::from(self.declared.as_deref()?.trim());
        let usable = declared.is_absolute()
            && ShellKind::from_path(&declared.to_string_lossy()) == Some(shell)
            && declared.exists();
        usable.then_some(declared)
    }

    async fn run_detection(&self) -> ShellKind {
        // Fast path: the declared default shell.
        if let Some(shell) = self.declared.as_deref().and_then(ShellKind::from_path) {
            log::debug!("Using declared shell '{}'", shell);
            return shell;
        }

        // All candidates are looked up concurrently, but results are read in priority
        // order against one shared deadline, so the outcome does not depend on which
        // lookup happens to finish first.
        let deadline = Instant::now() + self.timeout;
        let lookups: Vec<(ShellKind, JoinHandle<bool>)> = SHELL_CANDIDATES
            .iter()
            .filter_map(|name| name.parse::<ShellKind>().ok())
            .map(|shell| {
                let paths = Arc::clone(&self.paths);
                let handle = tokio::spawn(async move { paths.resolve(shell.as_str()).await.is_ok() });
                (shell, handle)
            })
            .collect();

        for (shell, lookup) in lookups {
            match tokio::time::timeout_at(deadline, lookup).await {
                Ok(Ok(true)) => {
                    log::debug!("Detected shell '{}'", shell);
                    return shell;
                }
                Ok(_) => continue,
                Err(_) => break,
            }
        }

        eprintln!(
            "{} could not detect a usable shell in time, falling back to 'sh'.",
            "Warning:".yellow()
        );
        log::warn!("Shell detection fell back to 'sh'");
        ShellKind::Sh
    }
}
