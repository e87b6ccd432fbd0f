//! Build tasks: stylesheets, pages, logo, scripts

use super::{template, write_file, read_file, ensure_parent, Site};
use crate::error::{TaskError, TaskResult, ToolError};
use crate::runner::{FileSet, Tool, ToolArgs};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Widths the logo is resized to
pub const LOGO_WIDTHS: [u32; 3] = [64, 128, 512];

/// Script compiler language level
pub const SCRIPT_TARGET: &str = "ES2015";

/// Script compiler module format
pub const SCRIPT_MODULE: &str = "commonjs";

/// Emit declaration files and reject untyped bindings
pub const SCRIPT_FLAGS: [&str; 2] = ["--declaration", "--noImplicitAny"];

/// `build:css`: render theme colors into each stylesheet, then minify it
/// as `<name>.min.css` in the publish directory
pub fn css(site: &Site) -> TaskResult<()> {
    let ctx = &site.context;
    let files = FileSet::new()
        .include(site.source_glob("**/*.css"))
        .select(&ctx.root)?;
    let vars = ctx.css_vars();

    for file in files {
        let rendered = render_file(&file.path, &vars)?;
        let output = ctx.publish_dir().join(min_name(&file.relative));
        write_file(&output, rendered)?;

        let args = ToolArgs::new().path("input", &output).path("output", &output);
        site.toolchain.invoke(Tool::CssMinify, &args)?;
        debug!(output = %ctx.display_path(&output).display(), "built stylesheet");
    }

    Ok(())
}

/// `build:html`: render every page except partials
pub fn html(site: &Site) -> TaskResult<()> {
    let ctx = &site.context;
    let files = FileSet::new()
        .include(site.source_glob("**/*.html"))
        .exclude(site.source_glob("**/*.tpl.html"))
        .select(&ctx.root)?;
    let vars = ctx.html_vars();

    for file in files {
        let rendered = render_file(&file.path, &vars)?;
        let output = ctx.publish_dir().join(&file.relative);
        write_file(&output, rendered)?;
        debug!(output = %ctx.display_path(&output).display(), "rendered page");
    }

    Ok(())
}

/// `build:logo`: derive `logo-<width>.png` for every entry of [`LOGO_WIDTHS`]
pub fn logo(site: &Site) -> TaskResult<()> {
    let ctx = &site.context;
    let files = FileSet::new()
        .include(site.source_glob("static/logo.png"))
        .select(&ctx.root)?;
    let out_dir = ctx.publish_dir().join("static");

    for file in files {
        for width in LOGO_WIDTHS {
            let output = out_dir.join(suffixed_name(&file.relative, &format!("-{}", width)));
            ensure_parent(&output)?;

            let args = ToolArgs::new()
                .path("input", &file.path)
                .path("output", &output)
                .value("width", width.to_string());
            site.toolchain.invoke(Tool::ImageResize, &args)?;
        }
    }

    Ok(())
}

/// `build:ts`: compile all TypeScript sources into the compiled directory
pub fn scripts(site: &Site) -> TaskResult<()> {
    let ctx = &site.context;
    let files = FileSet::new()
        .include(site.source_glob("**/*.ts"))
        .select(&ctx.root)?;

    if files.is_empty() {
        debug!("no scripts to compile");
        return Ok(());
    }

    let out_dir = ctx.compiled_dir();
    fs::create_dir_all(&out_dir).map_err(|e| TaskError::io(&out_dir, e))?;

    let paths: Vec<PathBuf> = files.iter().map(|f| f.path.clone()).collect();
    let args = ToolArgs::new()
        .value("target", SCRIPT_TARGET)
        .value("module", SCRIPT_MODULE)
        .values("flags", SCRIPT_FLAGS)
        .path("root_dir", &ctx.source_dir())
        .path("out_dir", &out_dir)
        .paths("files", &paths);

    site.toolchain
        .invoke(Tool::ScriptCompile, &args)
        .map_err(|source| match source {
            ToolError::Failed { .. } => TaskError::CompileError {
                count: files.len(),
                source,
            },
            other => TaskError::Tool(other),
        })
}

fn render_file(
    path: &Path,
    vars: &std::collections::BTreeMap<String, String>,
) -> TaskResult<String> {
    let content = read_file(path)?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    Ok(template::render(&content, vars, base_dir)?)
}

/// `style.css` becomes `style.min.css`, keeping the directory
pub fn min_name(relative: &Path) -> PathBuf {
    suffixed_relative(relative, ".min")
}

fn suffixed_relative(relative: &Path, suffix: &str) -> PathBuf {
    let name = suffixed_name(relative, suffix);
    match relative.parent() {
        Some(parent) => parent.join(name),
        None => PathBuf::from(name),
    }
}

/// File name with `suffix` inserted before the extension
fn suffixed_name(path: &Path, suffix: &str) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_name() {
        assert_eq!(min_name(Path::new("style.css")), PathBuf::from("style.min.css"));
        assert_eq!(
            min_name(Path::new("themes/dark.theme.css")),
            PathBuf::from("themes/dark.theme.min.css")
        );
    }

    #[test]
    fn test_suffixed_name() {
        assert_eq!(suffixed_name(Path::new("logo.png"), "-64"), "logo-64.png");
        assert_eq!(suffixed_name(Path::new("LICENSE"), "-1"), "LICENSE-1");
    }
}
