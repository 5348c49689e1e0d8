// EN: src/system/executor.rs

use std::ffi::OsStr;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command could not be parsed: {0}")]
    CommandParse(String),
    #[error("No command specified to run.")]
    EmptyCommand,
    #[error("Command '{0}' could not be executed: {1}")]
    CommandFailed(String, std::io::Error),
    #[error("Command '{0}' exited with a non-zero error code.")]
    NonZeroExitStatus(String),
    #[error("Command '{command}' produced output that was not valid UTF-8")]
    InvalidUtf8Output {
        command: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("Command '{command}' did not finish within {timeout:?}.")]
    TimedOut { command: String, timeout: Duration },
}

/// Splits a configured command line into its program and fixed argument prefix.
///
/// Quoting follows POSIX shell rules, so `alacritty -e "my editor"` yields two arguments.
pub fn split_command_line(command_line: &str) -> Result<(String, Vec<String>), ExecutionError> {
    let trimmed = command_line.trim();
    if trimmed.is_empty() {
        return Err(ExecutionError::EmptyCommand);
    }

    let parts =
        shlex::split(trimmed).ok_or_else(|| ExecutionError::CommandParse(trimmed.to_string()))?;
    let (program, args) = parts.split_first().ok_or(ExecutionError::EmptyCommand)?;
    Ok((program.clone(), args.to_vec()))
}

/// Runs a short-lived program and captures its standard output.
///
/// Stdin is closed and stderr is discarded. The child is killed if it does not
/// finish within `timeout`.
pub async fn capture_output_with_timeout<I, S>(
    program: &Path,
    args: I,
    timeout: Duration,
) -> Result<String, ExecutionError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let display = program.display().to_string();

    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .kill_on_drop(true);

    log::debug!("Capturing output of '{}' (timeout {:?})", display, timeout);

    let output = match tokio::time::timeout(timeout, command.output()).await {
        Ok(result) => result.map_err(|e| ExecutionError::CommandFailed(display.clone(), e))?,
        Err(_) => {
            return Err(ExecutionError::TimedOut {
                command: display,
                timeout,
            });
        }
    };

    if !output.status.success() {
        return Err(ExecutionError::NonZeroExitStatus(display));
    }

    String::from_utf8(output.stdout).map_err(|e| ExecutionError::InvalidUtf8Output {
        command: display,
        source: e,
    })
}
