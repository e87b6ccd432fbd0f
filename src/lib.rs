//! sitepipe - a static-site build pipeline
//!
//! Lints, templates, minifies and deploys a landing page by running a fixed
//! graph of named tasks. Composite tasks are fail-fast sequences; leaf tasks
//! hand their work to external tools through a [`runner::Toolchain`].

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod runner;
pub mod tasks;

// Re-export commonly used types
pub use error::{Result, SiteError};

/// Current version of sitepipe
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
