//! Glob-based file selection
//!
//! A [`FileSet`] is a list of inclusion patterns and a list of exclusion
//! patterns, both relative to the project root. Exclusions are applied after
//! inclusions: a path matched by any exclusion is dropped.

use crate::error::{TaskError, TaskResult};
use glob::{MatchOptions, Pattern};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A selected file
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SourceFile {
    /// Absolute (root-joined) path
    pub path: PathBuf,

    /// Path relative to the glob base of the pattern that selected it
    pub relative: PathBuf,
}

/// Inclusion and exclusion patterns
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    include: Vec<String>,
    exclude: Vec<String>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    /// Select regular files under `root`, sorted and deduplicated
    pub fn select(&self, root: &Path) -> TaskResult<Vec<SourceFile>> {
        let excluded = build_globset(&self.exclude)?;
        let escaped_root = Pattern::escape(&root.to_string_lossy());
        let mut selected = BTreeMap::new();

        for pattern in &self.include {
            let base = glob_base(pattern);
            let full = format!("{}/{}", escaped_root.trim_end_matches('/'), pattern);
            let entries = glob::glob_with(&full, match_options()).map_err(|e| {
                TaskError::io(
                    root.join(pattern),
                    io::Error::new(io::ErrorKind::InvalidInput, e.msg),
                )
            })?;

            for entry in entries {
                let path = entry.map_err(|e| {
                    let path = e.path().to_path_buf();
                    TaskError::io(path, io::Error::from(e))
                })?;
                if !path.is_file() {
                    continue;
                }
                let Ok(from_root) = path.strip_prefix(root) else {
                    continue;
                };
                if excluded.is_match(from_root) {
                    continue;
                }
                let relative = from_root
                    .strip_prefix(&base)
                    .unwrap_or(from_root)
                    .to_path_buf();
                // First pattern to select a file decides its base
                selected
                    .entry(path.clone())
                    .or_insert(SourceFile { path, relative });
            }
        }

        debug!(
            include = ?self.include,
            exclude = ?self.exclude,
            count = selected.len(),
            "selected files"
        );
        Ok(selected.into_values().collect())
    }
}

/// Wildcards never match hidden files or directories
fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_leading_dot: true,
        ..MatchOptions::default()
    }
}

fn build_globset(patterns: &[String]) -> TaskResult<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()
            .map_err(|e| {
                TaskError::io(
                    pattern.clone(),
                    io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
                )
            })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| {
        TaskError::io(
            patterns.join(","),
            io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
        )
    })
}

/// Leading path components of a pattern that contain no wildcards.
///
/// A pattern without wildcards names a single file, so its base is the
/// file's parent directory.
pub fn glob_base(pattern: &str) -> PathBuf {
    let is_magic = |s: &str| s.contains(['*', '?', '[', '{']);
    let components: Vec<&str> = pattern.split('/').collect();

    match components.iter().position(|c| is_magic(c)) {
        Some(index) => components[..index].iter().collect(),
        None => Path::new(pattern)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().unwrap();
        for file in files {
            let path = temp_dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, file).unwrap();
        }
        temp_dir
    }

    fn relatives(files: &[SourceFile]) -> Vec<String> {
        files
            .iter()
            .map(|f| f.relative.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_glob_base() {
        assert_eq!(glob_base("webpage/**/*.html"), PathBuf::from("webpage"));
        assert_eq!(glob_base("webpage/static/logo.png"), PathBuf::from("webpage/static"));
        assert_eq!(glob_base("**/*.js"), PathBuf::new());
        assert_eq!(glob_base("public/*.{js,css}"), PathBuf::from("public"));
    }

    #[test]
    fn test_select_with_exclusions() {
        let dir = tree(&[
            "webpage/index.html",
            "webpage/header.tpl.html",
            "webpage/embed/chart.frame.html",
            "webpage/about/index.html",
            "webpage/style.css",
        ]);

        let files = FileSet::new()
            .include("webpage/**/*.html")
            .exclude("webpage/**/*.tpl.html")
            .exclude("webpage/**/*.frame.html")
            .select(dir.path())
            .unwrap();

        assert_eq!(relatives(&files), vec!["about/index.html", "index.html"]);
        assert!(files.iter().all(|f| f.path.starts_with(dir.path())));
    }

    #[test]
    fn test_single_file_pattern() {
        let dir = tree(&["webpage/static/logo.png", "webpage/static/other.png"]);
        let files = FileSet::new()
            .include("webpage/static/logo.png")
            .select(dir.path())
            .unwrap();
        assert_eq!(relatives(&files), vec!["logo.png"]);
    }

    #[test]
    fn test_exclusion_is_idempotent_and_order_independent() {
        let dir = tree(&[
            "output/data.json",
            "output/data.csv",
            "output/nested/more.csv",
            "output/nested/map.svg",
        ]);

        let once = FileSet::new()
            .include("output/**/*")
            .exclude("output/**/*.csv")
            .exclude("output/**/*.svg")
            .select(dir.path())
            .unwrap();
        let twice = FileSet::new()
            .include("output/**/*")
            .exclude("output/**/*.svg")
            .exclude("output/**/*.csv")
            .exclude("output/**/*.csv")
            .select(dir.path())
            .unwrap();

        assert_eq!(once, twice);
        assert_eq!(relatives(&once), vec!["data.json"]);
    }

    #[test]
    fn test_overlapping_includes_deduplicated() {
        let dir = tree(&["public/app.js"]);
        let files = FileSet::new()
            .include("public/**/*.js")
            .include("public/*.js")
            .select(dir.path())
            .unwrap();
        assert_eq!(files.len(), 1);
    }

    #[test]
    fn test_node_modules_excluded() {
        let dir = tree(&["public/app.js", "public/node_modules/lib/index.js"]);
        let files = FileSet::new()
            .include("public/**/*.js")
            .exclude("public/node_modules/**/*")
            .select(dir.path())
            .unwrap();
        assert_eq!(relatives(&files), vec!["app.js"]);
    }

    #[test]
    fn test_hidden_files_not_selected() {
        let dir = tree(&[
            "webpage/static/app.js",
            "webpage/.DS_Store",
            "webpage/.cache/state",
            "webpage/static/.keep",
        ]);
        let files = FileSet::new()
            .include("webpage/**/*")
            .select(dir.path())
            .unwrap();
        assert_eq!(relatives(&files), vec!["static/app.js"]);
    }

    #[test]
    fn test_root_with_glob_metacharacters() {
        let outer = tree(&["proj[1]/webpage/index.html", "proj1/webpage/other.html"]);
        let root = outer.path().join("proj[1]");
        let files = FileSet::new()
            .include("webpage/**/*.html")
            .select(&root)
            .unwrap();
        assert_eq!(relatives(&files), vec!["index.html"]);
        assert!(files[0].path.starts_with(&root));
    }

    #[test]
    fn test_missing_root_selects_nothing() {
        let dir = TempDir::new().unwrap();
        let files = FileSet::new()
            .include("webpage/**/*.ts")
            .select(dir.path())
            .unwrap();
        assert!(files.is_empty());
    }
}
