//! Pick a file with an interactive fuzzy finder and open it with the right application.

pub mod cli;
pub mod constants;
pub mod core;
pub mod dev_utils;
pub mod models;
pub mod state;
pub mod system;
