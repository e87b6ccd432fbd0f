//! Project descriptor discovery and parsing

use crate::config::types::SiteConfig;
use crate::error::{ConfigError, ConfigResult, SiteError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Descriptor file names to search for, in order of preference
const CONFIG_FILE_NAMES: &[&str] = &["site.yml", "site.yaml", "package.json"];

/// Find the descriptor by searching current and parent directories
pub fn find_config_file() -> ConfigResult<PathBuf> {
    find_config_file_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the descriptor starting from a specific directory
pub fn find_config_file_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in CONFIG_FILE_NAMES {
            let config_path = current_dir.join(file_name);
            searched_paths.push(config_path.display().to_string());

            if config_path.is_file() {
                return Ok(config_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => return Err(ConfigError::NotFound(searched_paths.join(", "))),
        }
    }
}

/// Parse a descriptor file from a path
pub fn parse_config_file(path: &Path) -> Result<SiteConfig, SiteError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    debug!(path = %path.display(), "parsing project descriptor");
    parse_config(&contents)
}

/// Parse a descriptor from a string
///
/// JSON is a subset of YAML, so `package.json` parses here as well.
pub fn parse_config(yaml: &str) -> Result<SiteConfig, SiteError> {
    let mut config: SiteConfig = serde_yaml::from_str(yaml)?;
    config.paths.normalize();
    Ok(config)
}

/// Parse the descriptor with automatic file discovery
pub fn parse_config_auto() -> Result<(SiteConfig, PathBuf), SiteError> {
    let config_path = find_config_file()?;
    let config = parse_config_file(&config_path)?;
    Ok((config, config_path))
}
