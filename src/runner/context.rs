//! Build context and progress reporting
//!
//! The [`BuildContext`] is assembled once at startup from the project
//! descriptor and the command line, then shared read-only by every task.

use crate::config::SiteConfig;
use chrono::Datelike;
use colored::Colorize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Environment name used when `--env` is not given
pub const DEFAULT_ENV: &str = "development";

/// Read-only configuration shared by all tasks
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Project root (the directory holding the descriptor)
    pub root: PathBuf,

    /// Environment name (`development`, `production`, ...)
    pub env: String,

    /// Year exposed to templates
    pub year: i32,

    /// Parsed project descriptor
    pub config: SiteConfig,
}

impl BuildContext {
    /// Create a context rooted at `root` for the current year and the default env
    pub fn new(config: SiteConfig, root: impl Into<PathBuf>) -> Self {
        BuildContext {
            root: root.into(),
            env: DEFAULT_ENV.to_string(),
            year: chrono::Local::now().year(),
            config,
        }
    }

    /// Set the environment name
    pub fn with_env(mut self, env: impl Into<String>) -> Self {
        self.env = env.into();
        self
    }

    /// Set the year exposed to templates
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = year;
        self
    }

    pub fn source_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.source)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.data)
    }

    pub fn publish_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.publish)
    }

    pub fn compiled_dir(&self) -> PathBuf {
        self.root.join(&self.config.paths.compiled)
    }

    /// Project-relative path for display
    pub fn display_path<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Variables for HTML templates.
    ///
    /// Precedence, later wins: descriptor variables, display metadata,
    /// runtime variables.
    pub fn html_vars(&self) -> BTreeMap<String, String> {
        let config = &self.config;
        let mut vars = BTreeMap::new();

        for (key, value) in &config.vars.extra {
            flatten_value(key, value, &mut vars);
        }
        let theme = &config.vars.theme;
        vars.insert("theme.primary".to_string(), theme.primary.clone());
        vars.insert("theme.accent".to_string(), theme.accent.clone());
        vars.insert("theme.background".to_string(), theme.background.clone());
        vars.insert(
            "theme.text-on-background".to_string(),
            theme.text_on_background.clone(),
        );

        vars.insert(
            "name".to_string(),
            config
                .display_name
                .clone()
                .unwrap_or_else(|| config.name.clone()),
        );
        vars.insert(
            "description".to_string(),
            config.description.clone().unwrap_or_default(),
        );

        vars.insert("env".to_string(), self.env.clone());
        vars.insert("year".to_string(), self.year.to_string());

        vars
    }

    /// Variables for stylesheets: only the theme colors
    pub fn css_vars(&self) -> BTreeMap<String, String> {
        let theme = &self.config.vars.theme;
        BTreeMap::from([
            ("theme-primary".to_string(), theme.primary.clone()),
            ("theme-accent".to_string(), theme.accent.clone()),
            ("theme-background".to_string(), theme.background.clone()),
            (
                "theme-text-on-background".to_string(),
                theme.text_on_background.clone(),
            ),
        ])
    }
}

/// Flatten nested descriptor values into dotted keys
fn flatten_value(key: &str, value: &serde_yaml::Value, out: &mut BTreeMap<String, String>) {
    use serde_yaml::Value;

    match value {
        Value::Null => {
            out.insert(key.to_string(), String::new());
        }
        Value::Bool(b) => {
            out.insert(key.to_string(), b.to_string());
        }
        Value::Number(n) => {
            out.insert(key.to_string(), n.to_string());
        }
        Value::String(s) => {
            out.insert(key.to_string(), s.clone());
        }
        Value::Mapping(map) => {
            for (k, v) in map {
                if let Some(k) = k.as_str() {
                    flatten_value(&format!("{}.{}", key, k), v, out);
                }
            }
        }
        Value::Tagged(tagged) => flatten_value(key, &tagged.value, out),
        // Lists have no sensible scalar rendering
        Value::Sequence(_) => {}
    }
}

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

/// User-facing progress output, gated by verbosity
#[derive(Debug, Clone, Copy)]
pub struct Reporter {
    pub verbosity: Verbosity,
}

impl Reporter {
    pub fn new(verbosity: Verbosity) -> Self {
        Reporter { verbosity }
    }

    /// Reporter that prints nothing
    pub fn silent() -> Self {
        Reporter::new(Verbosity::Silent)
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if self.verbosity >= Verbosity::Normal {
            eprintln!("{} {}", "[INFO]".cyan(), message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        if self.verbosity >= Verbosity::Quiet {
            eprintln!("{} {}", "[ERROR]".red().bold(), message);
        }
    }

    /// Print debug message (only in verbose mode)
    pub fn print_debug(&self, message: &str) {
        if self.verbosity >= Verbosity::Verbose {
            eprintln!("{} {}", "[DEBUG]".dimmed(), message);
        }
    }

    pub fn task_start(&self, task_name: &str) {
        self.print_info(&format!("Running task: {}", task_name.bold()));
    }

    pub fn task_complete(&self, task_name: &str) {
        self.print_debug(&format!("Task completed: {}", task_name));
    }

    pub fn task_failed(&self, task_name: &str, reason: &str) {
        self.print_error(&format!("Task '{}' failed: {}", task_name, reason));
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Reporter::new(Verbosity::Normal)
    }
}
