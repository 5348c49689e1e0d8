// src/state.rs

use crate::{
    constants::PREWARM_COMMANDS,
    core::{
        mime::{MimeResolver, MimeTool},
        path_cache::PathCache,
    },
    models::Config,
    system::shell::ShellDetector,
};
use std::{sync::Arc, time::Duration};

/// The shared, process-wide probes: the executable path cache and the shell detector.
///
/// Built once at start-up and passed by reference to everything that launches
/// processes. Both members are safe to use from concurrent tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Resolved executable paths, shared with the pre-warm workers.
    pub paths: Arc<PathCache>,
    /// The one-shot shell detector used to run the picker.
    pub shell: Arc<ShellDetector>,
    /// Whether a Ctrl+C after picking ends the process. Only the real binary sets it.
    pub exit_on_interrupt: bool,
}

impl AppState {
    /// Bundles an existing cache and detector without starting anything in the background.
    pub fn new(paths: Arc<PathCache>, shell: Arc<ShellDetector>) -> Self {
        Self {
            paths,
            shell,
            exit_on_interrupt: false,
        }
    }

    /// Creates the state from the real environment and starts the background probes.
    ///
    /// Must be called from within a Tokio runtime. The pre-warm sweep and the shell
    /// detection run while the caller goes on parsing flags and loading config.
    pub fn bootstrap() -> Self {
        let paths = Arc::new(PathCache::default());
        drop(paths.prewarm(PREWARM_COMMANDS));

        let shell = Arc::new(ShellDetector::from_env(Arc::clone(&paths)));
        drop(shell.spawn_detection());

        Self {
            exit_on_interrupt: true,
            ..Self::new(paths, shell)
        }
    }

    /// Builds a MIME resolver that shares this state's path cache.
    pub fn mime_resolver(&self, config: &Config) -> MimeResolver {
        MimeResolver::new(
            Arc::clone(&self.paths),
            MimeTool {
                command: config.mime_command.clone(),
                timeout: Duration::from_millis(config.mime_timeout_ms),
            },
        )
    }
}
