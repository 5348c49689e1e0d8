// src/core/mod.rs

pub mod config_loader;
pub mod dispatch;
pub mod mime;
pub mod path_cache;
pub mod paths;
