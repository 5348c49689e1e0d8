// EN: src/bin/fzf-open.rs

use clap::Parser;
use colored::*;
use fzf_open::{
    cli::{Cli, handlers::run},
    state::AppState,
};

/// The main entry point of `fzf-open`.
///
/// It sets up logging, starts the background probes, parses arguments, runs the
/// pick-and-open flow and performs centralized error handling.
#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // The probes start before flag parsing so they overlap with it.
    let state = AppState::bootstrap();
    let cli = Cli::parse();
    log::debug!("CLI args parsed: {:?}", cli);

    match run::handle(cli, &state).await {
        Ok(outcome) => {
            log::debug!("Finished: {:?}", outcome);
            // Exit right away; abandoned background lookups are not worth waiting for.
            std::process::exit(0);
        }
        Err(e) => {
            // --- Centralized Error Handling ---
            eprintln!("\n{}: {:#}", "Error".red().bold(), e);
            std::process::exit(1);
        }
    }
}
