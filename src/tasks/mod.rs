//! The site pipeline
//!
//! Every built-in task is a [`TaskId`]. Leaves delegate to one external tool
//! (or to the in-process templater); composites are fail-fast sequences.
//! [`build_registry`] declares the whole graph once at startup.

pub mod build;
pub mod clean;
pub mod copy;
pub mod deploy;
pub mod lint;
pub mod minify;
pub mod template;

use crate::error::{GraphError, TaskError, TaskResult};
use crate::runner::{BuildContext, Registry, Toolchain};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// What every leaf task receives
pub struct Site {
    /// Read-only build configuration
    pub context: BuildContext,

    /// How external tools are invoked
    pub toolchain: Box<dyn Toolchain>,
}

impl Site {
    pub fn new(context: BuildContext, toolchain: Box<dyn Toolchain>) -> Self {
        Site { context, toolchain }
    }

    /// Glob under the source tree
    fn source_glob(&self, pattern: &str) -> String {
        format!("{}/{}", self.context.config.paths.source, pattern)
    }

    /// Glob under the data-output tree
    fn data_glob(&self, pattern: &str) -> String {
        format!("{}/{}", self.context.config.paths.data, pattern)
    }

    /// Glob under the publish tree
    fn publish_glob(&self, pattern: &str) -> String {
        format!("{}/{}", self.context.config.paths.publish, pattern)
    }
}

/// A leaf task body
pub type LeafFn = fn(&Site) -> TaskResult<()>;

/// How a task is implemented
pub enum TaskKind {
    Leaf(LeafFn),
    Sequence(&'static [TaskId]),
}

/// Every built-in task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskId {
    LintHtml,
    LintJs,
    Clean,
    BuildCss,
    BuildHtml,
    BuildLogo,
    BuildTs,
    CopyStatic,
    CopyOutput,
    MinifyJs,
    MinifyHtml,
    MinifyImg,
    Firebase,
    Exit,
    LintAll,
    BuildAll,
    CopyAll,
    MinifyAll,
    BuildDebug,
    BuildProd,
    Build,
    Default,
    Deploy,
}

impl TaskId {
    /// All tasks, each listed after everything it depends on
    pub const ALL: [TaskId; 23] = [
        TaskId::LintHtml,
        TaskId::LintJs,
        TaskId::Clean,
        TaskId::BuildCss,
        TaskId::BuildHtml,
        TaskId::BuildLogo,
        TaskId::BuildTs,
        TaskId::CopyStatic,
        TaskId::CopyOutput,
        TaskId::MinifyJs,
        TaskId::MinifyHtml,
        TaskId::MinifyImg,
        TaskId::Firebase,
        TaskId::Exit,
        TaskId::LintAll,
        TaskId::BuildAll,
        TaskId::CopyAll,
        TaskId::MinifyAll,
        TaskId::BuildDebug,
        TaskId::BuildProd,
        TaskId::Build,
        TaskId::Default,
        TaskId::Deploy,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TaskId::LintHtml => "lint:html",
            TaskId::LintJs => "lint:js",
            TaskId::Clean => "clean",
            TaskId::BuildCss => "build:css",
            TaskId::BuildHtml => "build:html",
            TaskId::BuildLogo => "build:logo",
            TaskId::BuildTs => "build:ts",
            TaskId::CopyStatic => "copy:static",
            TaskId::CopyOutput => "copy:output",
            TaskId::MinifyJs => "minify:js",
            TaskId::MinifyHtml => "minify:html",
            TaskId::MinifyImg => "minify:img",
            TaskId::Firebase => "firebase",
            TaskId::Exit => "exit",
            TaskId::LintAll => "lint:all",
            TaskId::BuildAll => "build:all",
            TaskId::CopyAll => "copy:all",
            TaskId::MinifyAll => "minify:all",
            TaskId::BuildDebug => "build:debug",
            TaskId::BuildProd => "build:prod",
            TaskId::Build => "build",
            TaskId::Default => "default",
            TaskId::Deploy => "deploy",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            TaskId::LintHtml => "Check HTML pages against style rules",
            TaskId::LintJs => "Check scripts against style rules",
            TaskId::Clean => "Delete the publish and compiled directories",
            TaskId::BuildCss => "Render and minify stylesheets",
            TaskId::BuildHtml => "Render HTML pages with build variables",
            TaskId::BuildLogo => "Resize the logo to 64, 128 and 512 pixels",
            TaskId::BuildTs => "Compile TypeScript sources",
            TaskId::CopyStatic => "Copy static assets to the publish directory",
            TaskId::CopyOutput => "Copy generated data (except CSV) to the publish directory",
            TaskId::MinifyJs => "Minify published scripts in place",
            TaskId::MinifyHtml => "Minify published pages in place",
            TaskId::MinifyImg => "Optimize source images into the publish directory",
            TaskId::Firebase => "Deploy the publish directory to Firebase Hosting",
            TaskId::Exit => "Finish a deploy",
            TaskId::LintAll => "Run all linters",
            TaskId::BuildAll => "Build stylesheets, logo, pages and scripts",
            TaskId::CopyAll => "Copy static assets and generated data",
            TaskId::MinifyAll => "Minify scripts, pages and images",
            TaskId::BuildDebug => "Lint, build and copy",
            TaskId::BuildProd => "Debug build followed by minification",
            TaskId::Build => "Production build",
            TaskId::Default => "Production build",
            TaskId::Deploy => "Deploy the site",
        }
    }

    pub fn kind(self) -> TaskKind {
        use TaskId::*;

        match self {
            LintHtml => TaskKind::Leaf(lint::html),
            LintJs => TaskKind::Leaf(lint::js),
            Clean => TaskKind::Leaf(clean::clean),
            BuildCss => TaskKind::Leaf(build::css),
            BuildHtml => TaskKind::Leaf(build::html),
            BuildLogo => TaskKind::Leaf(build::logo),
            BuildTs => TaskKind::Leaf(build::scripts),
            CopyStatic => TaskKind::Leaf(copy::static_assets),
            CopyOutput => TaskKind::Leaf(copy::data_output),
            MinifyJs => TaskKind::Leaf(minify::js),
            MinifyHtml => TaskKind::Leaf(minify::html),
            MinifyImg => TaskKind::Leaf(minify::images),
            Firebase => TaskKind::Leaf(deploy::firebase),
            Exit => TaskKind::Leaf(deploy::finish),
            LintAll => TaskKind::Sequence(&[LintHtml, LintJs]),
            BuildAll => TaskKind::Sequence(&[BuildCss, BuildLogo, BuildHtml, BuildTs]),
            CopyAll => TaskKind::Sequence(&[CopyStatic, CopyOutput]),
            MinifyAll => TaskKind::Sequence(&[MinifyJs, MinifyHtml, MinifyImg]),
            BuildDebug => TaskKind::Sequence(&[LintAll, BuildAll, CopyAll]),
            BuildProd => TaskKind::Sequence(&[BuildDebug, MinifyAll]),
            Build => TaskKind::Sequence(&[BuildProd]),
            Default => TaskKind::Sequence(&[Build]),
            Deploy => TaskKind::Sequence(&[Firebase, Exit]),
        }
    }

    /// Children of a composite task
    pub fn children(self) -> Option<&'static [TaskId]> {
        match self.kind() {
            TaskKind::Sequence(children) => Some(children),
            TaskKind::Leaf(_) => None,
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TaskId {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskId::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or_else(|| GraphError::UnknownTask(s.to_string()))
    }
}

/// Declare the full pipeline graph
pub fn build_registry() -> Result<Registry<Site>, GraphError> {
    let mut registry = Registry::new();

    for id in TaskId::ALL {
        match id.kind() {
            TaskKind::Leaf(body) => registry.register(id.name(), body)?,
            TaskKind::Sequence(children) => {
                let names: Vec<&str> = children.iter().map(|c| c.name()).collect();
                registry.sequence(id.name(), &names)?;
            }
        }
    }

    Ok(registry)
}

/// Write a file, creating parent directories
fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> TaskResult<()> {
    ensure_parent(path)?;
    fs::write(path, contents).map_err(|e| TaskError::io(path, e))
}

fn read_file(path: &Path) -> TaskResult<String> {
    fs::read_to_string(path).map_err(|e| TaskError::io(path, e))
}

fn ensure_parent(path: &Path) -> TaskResult<()> {
    match path.parent() {
        Some(parent) => fs::create_dir_all(parent).map_err(|e| TaskError::io(parent, e)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_are_unique_and_parse_back() {
        let names: HashSet<_> = TaskId::ALL.iter().map(|id| id.name()).collect();
        assert_eq!(names.len(), TaskId::ALL.len());
        for id in TaskId::ALL {
            assert_eq!(id.name().parse::<TaskId>(), Ok(id));
        }
        assert!("gulp".parse::<TaskId>().is_err());
    }

    #[test]
    fn test_children_declared_before_parents() {
        for (index, id) in TaskId::ALL.iter().enumerate() {
            for child in id.children().unwrap_or_default() {
                let child_index = TaskId::ALL.iter().position(|c| c == child).unwrap();
                assert!(child_index < index, "{} listed after {}", child, id);
            }
        }
    }

    #[test]
    fn test_registry_graph() {
        let registry = build_registry().unwrap();
        assert_eq!(registry.names().len(), TaskId::ALL.len());
        assert_eq!(
            registry.children("build:debug").unwrap(),
            ["lint:all", "build:all", "copy:all"]
        );
        assert_eq!(registry.children("default").unwrap(), ["build"]);
        assert_eq!(registry.children("deploy").unwrap(), ["firebase", "exit"]);
        assert!(registry.children("lint:html").is_none());
    }
}
