// src/models.rs

use crate::constants::{DEFAULT_MIME_TIMEOUT_MS, DEFAULT_PICKER_OUTPUT, DEFAULT_PICKER_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::{fmt, path::Path, str::FromStr};

// --- APPLICATION IDENTIFIERS ---

/// The kinds of application a selected file can be dispatched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppId {
    PdfViewer,
    DocxViewer,
    ImageViewer,
    VideoPlayer,
    SpreadsheetEditor,
    WebBrowser,
    TextEditor,
}

impl AppId {
    /// The key used for this application in the `[apps]` config section.
    pub fn config_key(self) -> &'static str {
        match self {
            Self::PdfViewer => "pdf_viewer",
            Self::DocxViewer => "docx_viewer",
            Self::ImageViewer => "image_viewer",
            Self::VideoPlayer => "video_player",
            Self::SpreadsheetEditor => "spreadsheet_editor",
            Self::WebBrowser => "web_browser",
            Self::TextEditor => "text_editor",
        }
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

// --- SHELLS ---

/// The interactive shells fzf-open knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShellKind {
    Bash,
    Zsh,
    Fish,
    Dash,
    Sh,
    Ksh,
    Csh,
    Tcsh,
}

impl ShellKind {
    /// The executable name of the shell.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bash => "bash",
            Self::Zsh => "zsh",
            Self::Fish => "fish",
            Self::Dash => "dash",
            Self::Sh => "sh",
            Self::Ksh => "ksh",
            Self::Csh => "csh",
            Self::Tcsh => "tcsh",
        }
    }

    /// Parses a shell from a path such as `/usr/bin/zsh` by looking at its base name.
    pub fn from_path(path: &str) -> Option<Self> {
        Path::new(path.trim())
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.parse().ok())
    }
}

impl FromStr for ShellKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bash" => Ok(Self::Bash),
            "zsh" => Ok(Self::Zsh),
            "fish" => Ok(Self::Fish),
            "dash" => Ok(Self::Dash),
            "sh" => Ok(Self::Sh),
            "ksh" => Ok(Self::Ksh),
            "csh" => Ok(Self::Csh),
            "tcsh" => Ok(Self::Tcsh),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ShellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// --- CONFIGURATION MODELS (config.toml) ---

/// The command line used to open each kind of file.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AppsConfig {
    pub pdf_viewer: String,
    pub docx_viewer: String,
    pub image_viewer: String,
    pub video_player: String,
    pub spreadsheet_editor: String,
    pub web_browser: String,
    pub text_editor: String,
}

impl Default for AppsConfig {
    fn default() -> Self {
        Self {
            pdf_viewer: "zathura".to_string(),
            docx_viewer: "libreoffice --writer".to_string(),
            image_viewer: "imv".to_string(),
            video_player: "mpv".to_string(),
            spreadsheet_editor: "libreoffice --calc".to_string(),
            web_browser: "firefox".to_string(),
            text_editor: "alacritty -e nvim".to_string(),
        }
    }
}

impl AppsConfig {
    /// Returns the configured command line for an application.
    pub fn command_for(&self, app: AppId) -> &str {
        match app {
            AppId::PdfViewer => &self.pdf_viewer,
            AppId::DocxViewer => &self.docx_viewer,
            AppId::ImageViewer => &self.image_viewer,
            AppId::VideoPlayer => &self.video_player,
            AppId::SpreadsheetEditor => &self.spreadsheet_editor,
            AppId::WebBrowser => &self.web_browser,
            AppId::TextEditor => &self.text_editor,
        }
    }
}

/// The full, user-editable configuration of fzf-open.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Terminal emulator used when the picker runs in a new window.
    pub terminal: String,
    pub win_title_flag: String,
    pub win_title: String,
    /// Terminal flag that keeps the window open after the picker exits.
    pub hold_flag: String,
    /// Directory the picker starts in. `~` and `$VARS` are expanded.
    pub starting_dir: String,
    pub spawn_term: bool,
    pub keep_open: bool,
    /// Run the picker through an interactive shell so rc files are loaded.
    pub interactive_shell: bool,
    /// The platform's generic opener, used when no rule matches.
    pub fallback_opener: String,
    pub picker_command: String,
    pub picker_output: String,
    pub picker_timeout_secs: u64,
    pub mime_command: String,
    pub mime_timeout_ms: u64,
    pub apps: AppsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            terminal: "alacritty".to_string(),
            win_title_flag: "--title".to_string(),
            win_title: "fzf-open-run".to_string(),
            hold_flag: "--hold".to_string(),
            starting_dir: "~".to_string(),
            spawn_term: false,
            keep_open: false,
            interactive_shell: false,
            fallback_opener: default_opener().to_string(),
            picker_command: "fzf --prompt='Select file> ' --border --no-multi".to_string(),
            picker_output: DEFAULT_PICKER_OUTPUT.to_string(),
            picker_timeout_secs: DEFAULT_PICKER_TIMEOUT_SECS,
            mime_command: "file --brief --mime-type".to_string(),
            mime_timeout_ms: DEFAULT_MIME_TIMEOUT_MS,
            apps: AppsConfig::default(),
        }
    }
}

fn default_opener() -> &'static str {
    if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    }
}
