// src/constants.rs

use std::time::Duration;

/// The name of the fzf-open directory inside the system config directory.
pub const CONFIG_DIR_NAME: &str = "fzf-open";

/// The name of the configuration file (inside ~/.config/fzf-open/).
pub const CONFIG_FILENAME: &str = "config.toml";

/// Where the picker writes its selection unless the config says otherwise.
pub const DEFAULT_PICKER_OUTPUT: &str = "/tmp/fzf-open";

/// Exit status a shell reports for a child killed by SIGINT.
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Bounded wait for a single executable search.
pub const PATH_LOOKUP_TIMEOUT: Duration = Duration::from_millis(100);

/// Bounded wait for the whole shell detection race.
pub const SHELL_DETECT_TIMEOUT: Duration = Duration::from_millis(200);

/// Default bounded wait for the external MIME query.
pub const DEFAULT_MIME_TIMEOUT_MS: u64 = 1000;

/// Default top-level deadline for the interactive picker (5 minutes).
pub const DEFAULT_PICKER_TIMEOUT_SECS: u64 = 300;

/// Shell built-ins that resolve to themselves without touching the filesystem.
pub const SHELL_BUILTINS: &[&str] = &["cd", "echo", "exit"];

/// Shell candidates probed when `$SHELL` is unusable, highest priority first.
pub const SHELL_CANDIDATES: &[&str] = &["zsh", "bash", "fish", "dash", "sh"];

/// Programs resolved in the background at start-up.
pub const PREWARM_COMMANDS: &[&str] = &[
    "fzf",
    "file",
    "xdg-open",
    "alacritty",
    "nvim",
    "zathura",
    "imv",
    "mpv",
    "libreoffice",
    "firefox",
];
