//! # System Interaction Layer
//!
//! This module provides abstractions for interacting with the underlying operating system.
//! It serves as a boundary between the core decision logic and the specifics of process
//! management and shell environments.
//!
//! ## Modules
//!
//! - **`executor`**: Runs short-lived external queries with a timeout and captures their
//!   output. Also splits configured command lines into program and arguments.
//! - **`launcher`**: Starts the chosen application fully detached from fzf-open.
//! - **`picker`**: Runs the interactive picker, in the current terminal or a new one,
//!   and reads back the selection.
//! - **`shell`**: Detects, once per process, which interactive shell runs the picker.

pub mod executor;
pub mod launcher;
pub mod picker;
pub mod shell;
