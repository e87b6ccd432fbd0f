//! Configuration validation
//!
//! This module provides validation logic for project descriptors.

use crate::config::types::{Paths, SiteConfig};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::Tool;
use std::collections::HashSet;
use std::path::{Component, Path};

/// Validate a complete descriptor
pub fn validate_config(config: &SiteConfig) -> ConfigResult<()> {
    if config.name.trim().is_empty() {
        return Err(ConfigError::MissingField("name"));
    }

    validate_paths(&config.paths)?;

    for key in config.tools.keys() {
        if Tool::from_key(key).is_none() {
            return Err(ConfigError::Invalid(format!(
                "Unknown tool '{}'. Must be one of: {}",
                key,
                Tool::ALL
                    .iter()
                    .map(|t| t.key())
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
    }

    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() || interpreter[0].trim().is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    if config.deploy.token_env.trim().is_empty() {
        return Err(ConfigError::MissingField("deploy.token_env"));
    }

    Ok(())
}

/// Validate the directory layout
///
/// Every directory must be relative and stay inside the project, and the
/// four directories must be distinct, because `clean` removes the publish
/// and compiled trees wholesale.
fn validate_paths(paths: &Paths) -> ConfigResult<()> {
    let entries = [
        ("paths.source", &paths.source),
        ("paths.data", &paths.data),
        ("paths.publish", &paths.publish),
        ("paths.compiled", &paths.compiled),
    ];

    let mut seen = HashSet::new();
    for (field, value) in entries {
        let path = Path::new(value.as_str());
        let escapes = path
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if value.trim().is_empty() || escapes {
            return Err(ConfigError::Invalid(format!(
                "{} must be a relative path inside the project, got '{}'",
                field, value
            )));
        }
        if !seen.insert(value.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "{} '{}' is used by another directory",
                field, value
            )));
        }
    }

    Ok(())
}
