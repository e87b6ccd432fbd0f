//! Core configuration types
//!
//! This module defines the data structures that represent the project
//! descriptor (`site.yml`, or the `package.json` the page already ships with).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Top-level project descriptor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Project name, also the hosting project deployed to
    #[serde(default)]
    pub name: String,

    /// Human-readable name used in templates
    #[serde(
        rename = "displayName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub display_name: Option<String>,

    /// Page description used in templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Template variables (theme colors and any extra values)
    #[serde(default)]
    pub vars: SiteVars,

    /// Directory layout, relative to the descriptor
    #[serde(default)]
    pub paths: Paths,

    /// Command templates overriding the default external tools
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tools: BTreeMap<String, String>,

    /// Interpreter used to run tool commands (e.g., ["bash", "-c"])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpreter: Option<Vec<String>>,

    /// Deploy settings
    #[serde(default)]
    pub deploy: DeployConfig,
}

/// Template variables from the descriptor
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SiteVars {
    /// Theme colors, also exposed to stylesheets
    #[serde(default)]
    pub theme: Theme,

    /// Any other variables, nested maps allowed
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

/// Theme colors substituted into stylesheets
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Theme {
    #[serde(default)]
    pub primary: String,

    #[serde(default)]
    pub accent: String,

    #[serde(default)]
    pub background: String,

    #[serde(rename = "text-on-background", default)]
    pub text_on_background: String,
}

/// Directory layout of a project
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Paths {
    /// Source tree with templates, styles, scripts and images
    #[serde(default = "default_source")]
    pub source: String,

    /// Auxiliary data tree produced outside the pipeline
    #[serde(default = "default_data")]
    pub data: String,

    /// Final tree served to users
    #[serde(default = "default_publish")]
    pub publish: String,

    /// Compiled script output
    #[serde(default = "default_compiled")]
    pub compiled: String,
}

impl Default for Paths {
    fn default() -> Self {
        Paths {
            source: default_source(),
            data: default_data(),
            publish: default_publish(),
            compiled: default_compiled(),
        }
    }
}

impl Paths {
    /// Drop `.` components and trailing separators, so `./webpage` and
    /// `webpage/` both read `webpage`
    pub fn normalize(&mut self) {
        for dir in [
            &mut self.source,
            &mut self.data,
            &mut self.publish,
            &mut self.compiled,
        ] {
            *dir = normalize_dir(dir);
        }
    }
}

fn normalize_dir(dir: &str) -> String {
    Path::new(dir)
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect::<PathBuf>()
        .to_string_lossy()
        .into_owned()
}

fn default_source() -> String {
    "webpage".to_string()
}

fn default_data() -> String {
    "output".to_string()
}

fn default_publish() -> String {
    "public".to_string()
}

fn default_compiled() -> String {
    "dist".to_string()
}

/// Deploy settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeployConfig {
    /// Hosting project, defaults to the descriptor name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,

    /// Environment variable holding the deploy token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

impl Default for DeployConfig {
    fn default() -> Self {
        DeployConfig {
            project: None,
            token_env: default_token_env(),
        }
    }
}

fn default_token_env() -> String {
    "FIREBASE_TOKEN".to_string()
}

impl SiteConfig {
    /// Hosting project to deploy to
    pub fn deploy_project(&self) -> &str {
        self.deploy.project.as_deref().unwrap_or(&self.name)
    }
}
