// EN: src/cli/handlers/open.rs

use crate::{
    core::{
        dispatch::{self, AssociationTable, ExtensionVerdict},
        mime::MimeResolver,
    },
    models::{AppId, Config},
    state::AppState,
    system::launcher::{self, LaunchError},
};
use colored::Colorize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenError {
    /// Neither the matching application nor the fallback opener could be started.
    #[error("'{path}' could not be opened by any application, including the fallback opener '{opener}': {source}")]
    Exhausted {
        path: PathBuf,
        opener: String,
        #[source]
        source: LaunchError,
    },
}

/// Which route ended up opening the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenedWith {
    /// The application configured for the file's type.
    App(AppId),
    /// The generic opener, after no rule matched or the application failed to start.
    Fallback,
}

/// Chooses an application for `path` and launches it, falling back to the generic opener.
///
/// The MIME type is only queried when the extension alone cannot decide. A failed
/// application launch is retried once with the fallback opener; only when that also
/// fails is an error returned.
pub async fn open_selected(
    path: &Path,
    config: &Config,
    state: &AppState,
    mime: &MimeResolver,
) -> Result<OpenedWith, OpenError> {
    let table = AssociationTable::builtin();
    let extension = dispatch::extension_of(path);

    // 1. Extension first; the MIME type only when the extension is not conclusive.
    let app = match table.by_extension(&extension) {
        ExtensionVerdict::App(app) => Some(app),
        ExtensionVerdict::TextIfMimeAllows | ExtensionVerdict::NoMatch => {
            let mime_type = mime.mime_type(path).await;
            table.select_app(&extension, &mime_type)
        }
    };

    // 2. Try the matching application.
    if let Some(app) = app {
        let command = config.apps.command_for(app);
        match launcher::launch(&state.paths, command, path).await {
            Ok(program) => {
                log::info!("Opened '{}' with {} ({})", path.display(), app, program.display());
                return Ok(OpenedWith::App(app));
            }
            Err(e) => {
                eprintln!(
                    "{} {} failed: {}. Trying '{}'.",
                    "Warning:".yellow(),
                    app,
                    e,
                    config.fallback_opener
                );
            }
        }
    } else {
        log::debug!("No rule for '{}', using the fallback opener", path.display());
    }

    // 3. Last resort: the generic opener.
    launcher::launch(&state.paths, &config.fallback_opener, path)
        .await
        .map(|_| OpenedWith::Fallback)
        .map_err(|source| OpenError::Exhausted {
            path: path.to_path_buf(),
            opener: config.fallback_opener.clone(),
            source,
        })
}
