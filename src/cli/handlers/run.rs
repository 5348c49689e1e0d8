// EN: src/cli/handlers/run.rs

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::open::{self, OpenedWith};
use crate::{
    cli::Cli,
    core::{config_loader, paths},
    dev_utils::BlockTimer,
    models::Config,
    state::AppState,
    system::picker::{self, Picker},
};

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The user cancelled, the picker produced nothing, or the picker itself failed.
    NothingSelected,
    Opened { path: PathBuf, with: OpenedWith },
}

/// The main handler: load config, pick a file, open it.
pub async fn handle(cli: Cli, state: &AppState) -> Result<RunOutcome> {
    let mut loaded =
        config_loader::load(cli.config.as_deref()).context("Failed to load configuration")?;
    config_loader::apply_overrides(&mut loaded.config, &cli.overrides());
    log::debug!("Effective config: {:?}", loaded.config);

    run_with_config(&loaded.config, dirs::home_dir().as_deref(), state).await
}

/// Runs the pick-and-open flow with an already resolved configuration.
///
/// An unusable starting directory falls back to `home`; if that is unusable too the
/// run fails before the picker is started.
pub async fn run_with_config(
    config: &Config,
    home: Option<&Path>,
    state: &AppState,
) -> Result<RunOutcome> {
    // 1. Settle the directory the picker starts in.
    let requested = paths::expand_path(&config.starting_dir).unwrap_or_else(|e| {
        log::warn!("{}", e);
        PathBuf::from(&config.starting_dir)
    });
    let starting_dir = paths::resolve_starting_dir(&requested, home)?;
    let picker = Picker::from_config(config).context("Invalid picker configuration")?;

    // 2. Let the user pick. Every non-error outcome without a file ends the run quietly.
    let selected = {
        let _timer = BlockTimer::new("pick");
        let shell = state.shell.shell_path().await;
        match picker.pick(&shell, &starting_dir).await {
            Ok(Some(path)) => path,
            Ok(None) => return Ok(RunOutcome::NothingSelected),
            Err(e) => {
                eprintln!("{}: {}", "Picker failed".red().bold(), e);
                return Ok(RunOutcome::NothingSelected);
            }
        }
    };

    // 3. The picker is done with Ctrl+C; give it back its usual meaning.
    if state.exit_on_interrupt {
        if let Err(e) = picker::exit_on_interrupt() {
            log::warn!("Could not watch for interrupts: {}", e);
        }
    }

    // 4. Hand the file to an application.
    let _timer = BlockTimer::new("open");
    let mime = state.mime_resolver(config);
    let with = open::open_selected(&selected, config, state, &mime).await?;

    Ok(RunOutcome::Opened {
        path: selected,
        with,
    })
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::{
        core::path_cache::{PathCache, SystemSearch},
        models::AppId,
        system::shell::ShellDetector,
    };
    use std::{fs, sync::Arc};
    use tempfile::TempDir;

    fn state() -> AppState {
        let paths = Arc::new(
            PathCache::new(SystemSearch::new()).with_timeout(std::time::Duration::from_secs(5)),
        );
        let shell = Arc::new(ShellDetector::new(Arc::clone(&paths), Some("/bin/sh".to_string())));
        AppState::new(paths, shell)
    }

    fn config_in(dir: &Path, picker_command: &str) -> Config {
        let mut config = Config {
            starting_dir: dir.display().to_string(),
            picker_command: picker_command.to_string(),
            picker_output: dir.join("selection").display().to_string(),
            fallback_opener: "no-such-opener-xyz".to_string(),
            ..Config::default()
        };
        config.apps.pdf_viewer = "true".to_string();
        config
    }

    #[tokio::test]
    async fn test_selected_pdf_opens_with_pdf_viewer() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("doc.pdf"), "%PDF").unwrap();
        let config = config_in(dir.path(), "echo doc.pdf");

        let outcome = run_with_config(&config, None, &state()).await.unwrap();

        let expected_path = dunce::canonicalize(dir.path()).unwrap().join("doc.pdf");
        assert_eq!(
            outcome,
            RunOutcome::Opened {
                path: expected_path,
                with: OpenedWith::App(AppId::PdfViewer)
            }
        );
    }

    #[tokio::test]
    async fn test_cancelled_picker_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path(), "sh -c 'exit 130'");

        let outcome = run_with_config(&config, None, &state()).await.unwrap();
        assert_eq!(outcome, RunOutcome::NothingSelected);
    }

    #[tokio::test]
    async fn test_invalid_dir_falls_back_to_home() {
        let home = TempDir::new().unwrap();
        fs::write(home.path().join("doc.pdf"), "%PDF").unwrap();
        let mut config = config_in(home.path(), "echo doc.pdf");
        config.starting_dir = "/no/such/start/dir".to_string();

        let outcome = run_with_config(&config, Some(home.path()), &state()).await.unwrap();
        assert!(matches!(outcome, RunOutcome::Opened { .. }));
    }

    #[tokio::test]
    async fn test_unusable_dir_and_home_fail_before_picking() {
        let dir = TempDir::new().unwrap();
        let marker = dir.path().join("picker-ran");
        let mut config = config_in(dir.path(), &format!("touch '{}'", marker.display()));
        config.starting_dir = "/no/such/start/dir".to_string();

        let result = run_with_config(&config, Some(Path::new("/no/such/home")), &state()).await;

        assert!(result.is_err());
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_unopenable_selection_is_an_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("blob.unknownext"), [0u8, 1]).unwrap();
        let mut config = config_in(dir.path(), "echo blob.unknownext");
        config.mime_command = "no-such-mime-tool-xyz".to_string();

        let result = run_with_config(&config, None, &state()).await;

        let err = result.unwrap_err();
        assert!(err.downcast_ref::<open::OpenError>().is_some());
    }
}
