// EN: src/cli/handlers/mod.rs

// The pick-and-open flow, split into its top-level run and the open step.

pub mod open;
pub mod run;
