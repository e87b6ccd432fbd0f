//! Lint tasks

use super::Site;
use crate::error::{TaskError, TaskResult, ToolError};
use crate::runner::{FileSet, SourceFile, Tool, ToolArgs};
use std::io::{self, Write};
use std::path::PathBuf;
use tempfile::NamedTempFile;
use tracing::debug;

/// `lint:html`: every page except partials and embedded frames
pub fn html(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.source_glob("**/*.html"))
        .exclude(site.source_glob("**/*.tpl.html"))
        .exclude(site.source_glob("**/*.frame.html"))
        .select(&site.context.root)?;

    run_linter(site, Tool::HtmlLint, &files, ToolArgs::new())
}

/// `lint:js`: every source script, with relaxed constructor and subscript rules
pub fn js(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.source_glob("**/*.js"))
        .select(&site.context.root)?;

    if files.is_empty() {
        debug!("no scripts to lint");
        return Ok(());
    }

    let options = serde_json::json!({ "newcap": false, "sub": true });
    let config = jshint_config(&options)?;

    // The options file is removed when `config` drops
    run_linter(
        site,
        Tool::JsLint,
        &files,
        ToolArgs::new().path("config", config.path()),
    )
}

/// Write linter options to a private temporary file
fn jshint_config(options: &serde_json::Value) -> TaskResult<NamedTempFile> {
    let mut file = tempfile::Builder::new()
        .prefix("sitepipe-jshintrc-")
        .suffix(".json")
        .tempfile()
        .map_err(|e| TaskError::io(std::env::temp_dir(), e))?;
    serde_json::to_writer(&mut file, options)
        .map_err(|e| TaskError::io(file.path(), io::Error::from(e)))?;
    file.flush().map_err(|e| TaskError::io(file.path(), e))?;
    Ok(file)
}

fn run_linter(
    site: &Site,
    tool: Tool,
    files: &[SourceFile],
    args: ToolArgs,
) -> TaskResult<()> {
    if files.is_empty() {
        debug!(%tool, "nothing to lint");
        return Ok(());
    }

    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    site.toolchain
        .invoke(tool, &args.paths("files", &paths))
        .map_err(|source| match source {
            ToolError::Failed { .. } => TaskError::LintViolation {
                linter: tool.key(),
                count: files.len(),
                source,
            },
            other => TaskError::Tool(other),
        })
}
