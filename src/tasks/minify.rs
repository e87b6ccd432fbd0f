//! Minification tasks

use super::{ensure_parent, Site};
use crate::error::TaskResult;
use crate::runner::{FileSet, Tool, ToolArgs};

/// Dependency artifacts that may end up in the publish tree
const NODE_MODULES: &str = "node_modules/**/*";

/// `minify:js`: uglify published scripts in place
pub fn js(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.publish_glob("**/*.js"))
        .exclude(site.publish_glob(NODE_MODULES))
        .select(&site.context.root)?;

    for file in files {
        let args = ToolArgs::new()
            .path("input", &file.path)
            .path("output", &file.path);
        site.toolchain.invoke(Tool::JsMinify, &args)?;
    }
    Ok(())
}

/// `minify:html`: minify published pages, including their inline scripts
pub fn html(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.publish_glob("**/*.html"))
        .exclude(site.publish_glob(NODE_MODULES))
        .select(&site.context.root)?;

    for file in files {
        let args = ToolArgs::new()
            .path("input", &file.path)
            .path("output", &file.path);
        site.toolchain.invoke(Tool::HtmlMinify, &args)?;
    }
    Ok(())
}

/// `minify:img`: optimize source images into the publish tree
pub fn images(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.source_glob("**/*.png"))
        .include(site.source_glob("**/*.jpg"))
        .include(site.source_glob("**/*.jpeg"))
        .include(site.source_glob("**/*.gif"))
        .select(&site.context.root)?;
    let publish = site.context.publish_dir();

    for file in files {
        let output = publish.join(&file.relative);
        ensure_parent(&output)?;
        let args = ToolArgs::new()
            .path("input", &file.path)
            .path("output", &output);
        site.toolchain.invoke(Tool::ImageMinify, &args)?;
    }
    Ok(())
}
