// EN: src/system/picker.rs

//! Runs the interactive picker and reads back what the user chose.
//!
//! The picker runs under the detected shell as
//! `cd <dir> && exec <picker_command> > <output>`, either in the current terminal or in
//! a new terminal window. The `exec` makes the picker replace the shell, so the process
//! fzf-open waits on (and kills on timeout) is the picker itself. `picker_command` must
//! therefore be a single command, not a pipeline or a list.
//!
//! The selection is read from the output file afterwards; a missing or empty file
//! simply means nothing was selected.

use crate::{
    constants::INTERRUPTED_EXIT_CODE,
    core::paths::{self, PathError},
    models::Config,
    system::executor::{self, ExecutionError},
};
use colored::Colorize;
use scopeguard::defer;
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    process::{ExitStatus, Stdio},
    time::Duration,
};
use thiserror::Error;
use tokio::{process::Command, task::JoinHandle};

#[derive(Error, Debug)]
pub enum PickerError {
    #[error("Path '{0}' cannot be passed to the shell safely.")]
    Unquotable(String),
    #[error("Invalid terminal command: {0}")]
    Terminal(#[from] ExecutionError),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Could not start the picker via '{0}': {1}")]
    Spawn(String, std::io::Error),
    #[error("Failed while waiting for the picker: {0}")]
    Wait(std::io::Error),
    #[error("The picker did not finish within {0:?} and was terminated.")]
    TimedOut(Duration),
}

/// How to open a new terminal window for the picker.
#[derive(Debug, Clone)]
pub struct TerminalOptions {
    /// Terminal emulator command line, e.g. `alacritty`.
    pub command: String,
    /// Flag that sets the window title; empty to omit the title.
    pub title_flag: String,
    pub title: String,
    /// Passed when the window should stay open after the picker exits.
    pub hold_flag: Option<String>,
}

/// A fully configured picker invocation.
#[derive(Debug, Clone)]
pub struct Picker {
    /// The picker command line, run with `exec` inside the shell script.
    pub command: String,
    /// File the picker's standard output is redirected to.
    pub output: PathBuf,
    /// Deadline after which the picker is killed.
    pub timeout: Duration,
    /// Run the shell with `-i` so rc files are loaded.
    pub interactive: bool,
    /// Open a new terminal window instead of using the current one.
    pub terminal: Option<TerminalOptions>,
}

impl Picker {
    pub fn from_config(config: &Config) -> Result<Self, PickerError> {
        let terminal = config.spawn_term.then(|| TerminalOptions {
            command: config.terminal.clone(),
            title_flag: config.win_title_flag.clone(),
            title: config.win_title.clone(),
            hold_flag: (config.keep_open && !config.hold_flag.is_empty())
                .then(|| config.hold_flag.clone()),
        });

        Ok(Self {
            command: config.picker_command.clone(),
            output: paths::expand_path(&config.picker_output)?,
            timeout: Duration::from_secs(config.picker_timeout_secs),
            interactive: config.interactive_shell,
            terminal,
        })
    }

    /// The shell script run by the picker's shell.
    pub fn script(&self, starting_dir: &Path) -> Result<String, PickerError> {
        Ok(format!(
            "cd {} && exec {} > {}",
            quote(starting_dir)?,
            self.command.trim(),
            quote(&self.output)?
        ))
    }

    fn build_command(&self, shell: &Path, script: &str) -> Result<Command, PickerError> {
        let mut shell_args: Vec<String> = Vec::new();
        if self.interactive {
            shell_args.push("-i".to_string());
        }
        shell_args.push("-c".to_string());
        shell_args.push(script.to_string());

        let command = match &self.terminal {
            Some(term) => {
                let (program, mut args) = executor::split_command_line(&term.command)?;
                if let Some(hold) = &term.hold_flag {
                    args.push(hold.clone());
                }
                if !term.title_flag.is_empty() {
                    args.push(term.title_flag.clone());
                    args.push(term.title.clone());
                }
                args.push("-e".to_string());
                args.push(shell.to_string_lossy().into_owned());
                args.extend(shell_args);

                let mut cmd = Command::new(program);
                cmd.args(args).stdin(Stdio::null());
                cmd
            }
            None => {
                let mut cmd = Command::new(shell);
                cmd.args(shell_args)
                    .stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
                cmd
            }
        };
        Ok(command)
    }

    /// Runs the picker rooted at `starting_dir` and returns the absolute selected path.
    ///
    /// `Ok(None)` covers every "nothing selected" outcome: user cancellation (exit 130),
    /// a non-zero picker exit, and a missing, empty or dangling selection.
    ///
    /// # Errors
    /// The picker could not be started, or it exceeded the configured deadline (in
    /// which case it is killed).
    pub async fn pick(&self, shell: &Path, starting_dir: &Path) -> Result<Option<PathBuf>, PickerError> {
        // 1. Build the invocation.
        let script = self.script(starting_dir)?;
        let mut command = self.build_command(shell, &script)?;
        command.kill_on_drop(true);

        // 2. A stale selection from an earlier run must not be mistaken for this one.
        let _ = fs::remove_file(&self.output);
        let output = self.output.clone();
        defer! {
            let _ = fs::remove_file(&output);
        }

        // 3. Run it under the deadline.
        log::debug!("Starting picker: {:?}", command.as_std());
        let mut child = command
            .spawn()
            .map_err(|e| PickerError::Spawn(format!("{:?}", command.as_std().get_program()), e))?;

        // Ctrl+C belongs to the picker; fzf-open keeps running to observe its exit code.
        // Listening installs a process-wide SIGINT handler that outlives this call;
        // callers restore the default behavior with `exit_on_interrupt`.
        let wait = async {
            loop {
                tokio::select! {
                    status = child.wait() => break status,
                    _ = tokio::signal::ctrl_c() => log::debug!("Interrupt received while picker is running"),
                }
            }
        };

        let waited = tokio::time::timeout(self.timeout, wait).await;
        let status = match waited {
            Ok(status) => status.map_err(PickerError::Wait)?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    log::warn!("Failed to kill timed-out picker: {}", e);
                }
                return Err(PickerError::TimedOut(self.timeout));
            }
        };

        // 4. Only a clean exit has a selection worth reading.
        if !picker_succeeded(status) {
            return Ok(None);
        }

        Ok(self.read_selection(starting_dir))
    }

    fn read_selection(&self, starting_dir: &Path) -> Option<PathBuf> {
        let content = match fs::read_to_string(&self.output) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                log::warn!(
                    "Could not read picker output '{}': {}",
                    self.output.display(),
                    e
                );
                return None;
            }
        };

        let relative = content.trim();
        if relative.is_empty() {
            return None;
        }

        let selected = starting_dir.join(relative);
        if !selected.exists() {
            eprintln!(
                "{} selected path does not exist: '{}'",
                "Warning:".yellow(),
                selected.display()
            );
            return None;
        }
        Some(selected)
    }
}

/// Makes the next Ctrl+C end the process with the interrupt exit code.
///
/// Once [`Picker::pick`] has listened for SIGINT, the signal no longer terminates
/// fzf-open on its own. Call this after picking so an interrupt during the open phase
/// still stops the run.
///
/// # Errors
/// The signal listener could not be registered.
pub fn exit_on_interrupt() -> std::io::Result<JoinHandle<()>> {
    on_interrupt(|| std::process::exit(INTERRUPTED_EXIT_CODE))
}

#[cfg(unix)]
fn on_interrupt<F>(action: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    use tokio::signal::unix::{SignalKind, signal};

    // Registered before returning, so no interrupt is missed once this succeeds.
    let mut interrupts = signal(SignalKind::interrupt())?;
    Ok(tokio::spawn(async move {
        if interrupts.recv().await.is_some() {
            log::debug!("Interrupt received after picking");
            action();
        }
    }))
}

#[cfg(not(unix))]
fn on_interrupt<F>(action: F) -> std::io::Result<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    Ok(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            action();
        }
    }))
}

fn picker_succeeded(status: ExitStatus) -> bool {
    match status.code() {
        Some(0) => true,
        Some(INTERRUPTED_EXIT_CODE) => {
            log::debug!("Picker cancelled by the user");
            false
        }
        code => {
            log::debug!("Picker exited without a selection ({:?})", code);
            false
        }
    }
}

fn quote(path: &Path) -> Result<String, PickerError> {
    let raw = path
        .to_str()
        .ok_or_else(|| PickerError::Unquotable(path.display().to_string()))?;
    shlex::try_quote(raw)
        .map(|q| q.into_owned())
        .map_err(|_| PickerError::Unquotable(raw.to_string()))
}
