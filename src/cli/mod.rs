//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, logging setup, task listing
//! and shell completion.

pub mod app;
pub mod logging;

// Re-export main types
pub use app::*;
