// EN: src/system/launcher.rs

use crate::core::path_cache::{PathCache, PathCacheError};
use crate::system::executor::{self, ExecutionError};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LaunchError {
    /// The configured command line is empty or cannot be split.
    #[error("Invalid application command: {0}")]
    InvalidCommand(#[from] ExecutionError),
    /// The program is not on `PATH`, or the lookup timed out.
    #[error("Program '{program}' could not be resolved: {source}")]
    Unresolved {
        program: String,
        #[source]
        source: PathCacheError,
    },
    /// The OS refused to start the resolved program.
    #[error("Program '{0}' could not be started: {1}")]
    SpawnFailed(String, std::io::Error),
}

/// Starts `app_command` with `file_path` appended as its last argument, fully detached.
///
/// The child gets no standard streams and, on Unix, its own process group so signals
/// aimed at fzf-open (such as Ctrl+C in the terminal) do not reach it. The handle is
/// dropped right after spawning: success means "started", not "finished".
///
/// Returns the resolved program path on success.
pub async fn launch(
    paths: &PathCache,
    app_command: &str,
    file_path: &Path,
) -> Result<PathBuf, LaunchError> {
    let (program, args) = executor::split_command_line(app_command)?;

    let resolved = paths
        .resolve(&program)
        .await
        .map_err(|source| LaunchError::Unresolved {
            program: program.clone(),
            source,
        })?;

    let mut command = Command::new(&resolved);
    command
        .args(&args)
        .arg(file_path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    detach(&mut command);

    log::debug!(
        "Launching '{}' with args {:?} for '{}'",
        resolved.display(),
        args,
        file_path.display()
    );

    let child = command
        .spawn()
        .map_err(|e| LaunchError::SpawnFailed(program.clone(), e))?;
    log::debug!("Started '{}' as PID {}", program, child.id());
    drop(child);

    Ok(resolved)
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn detach(_command: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::path_cache::SystemSearch;

    #[tokio::test]
    async fn test_unresolvable_program_is_a_failure_value() {
        let paths = PathCache::new(SystemSearch::new());
        let result = launch(&paths, "no-such-viewer-xyz --flag", Path::new("/tmp/a.pdf")).await;
        assert!(matches!(result, Err(LaunchError::Unresolved { .. })));
    }

    #[tokio::test]
    async fn test_empty_command_is_rejected() {
        let paths = PathCache::new(SystemSearch::new());
        let result = launch(&paths, "  ", Path::new("/tmp/a.pdf")).await;
        assert!(matches!(
            result,
            Err(LaunchError::InvalidCommand(ExecutionError::EmptyCommand))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_launch_returns_without_waiting() {
        let paths = PathCache::new(SystemSearch::new());
        let started = std::time::Instant::now();
        let resolved = launch(&paths, "/bin/sh -c 'sleep 2'", Path::new("/tmp/ignored"))
            .await
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/bin/sh"));
        assert!(started.elapsed() < std::time::Duration::from_secs(2));
    }
}
