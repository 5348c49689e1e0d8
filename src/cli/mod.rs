use crate::core::config_loader::Overrides;
use clap::Parser;
use std::path::PathBuf;

pub mod handlers;

/// fzf-open: pick a file with fzf and open it with the right application.
///
/// The application is chosen from the file's extension, then its MIME type; files
/// that match no rule are handed to the platform's generic opener.
#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about,
    long_about = None,
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
pub struct Cli {
    /// Spawn the picker in a new terminal window.
    #[arg(short = 'n', long)]
    pub new_terminal: bool,

    /// Directory the picker starts in (defaults to the config's `starting_dir`).
    #[arg(short = 'd', long, value_name = "DIR")]
    pub dir: Option<String>,

    /// Terminal emulator command used with `--new-terminal`.
    #[arg(short = 't', long, value_name = "CMD")]
    pub terminal: Option<String>,

    /// Keep the terminal window open after the picker exits.
    #[arg(short = 'k', long)]
    pub keep_open: bool,

    /// Run the picker through an interactive shell so rc files are loaded.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Generic opener used when no application rule matches.
    #[arg(short = 'o', long, value_name = "CMD")]
    pub opener: Option<String>,

    /// Use this config file instead of `~/.config/fzf-open/config.toml`.
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl Cli {
    /// The config values overridden by these flags. Toggles only ever switch features on.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            spawn_term: self.new_terminal.then_some(true),
            keep_open: self.keep_open.then_some(true),
            interactive_shell: self.interactive.then_some(true),
            starting_dir: self.dir.clone(),
            terminal: self.terminal.clone(),
            fallback_opener: self.opener.clone(),
        }
    }
}
