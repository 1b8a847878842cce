//! CLI command handlers

pub mod commands;

pub use commands::{check, load, template};
