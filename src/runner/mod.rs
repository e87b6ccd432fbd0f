//! Task execution engine
//!
//! This module holds the task registry and sequence executor, the shared
//! build context, file selection and external tool invocation.

pub mod command;
pub mod context;
pub mod fileset;
pub mod interpolate;
pub mod registry;
pub mod sequence;

// Re-export main types
pub use command::*;
pub use context::*;
pub use fileset::*;
pub use interpolate::*;
pub use registry::*;
pub use sequence::*;
