//! Copy tasks

use super::{ensure_parent, Site};
use crate::error::{TaskError, TaskResult};
use crate::runner::{FileSet, SourceFile};
use std::fs;
use std::path::Path;
use tracing::debug;

/// `copy:static`: source assets that no build task processes
pub fn static_assets(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.source_glob("**/*"))
        .exclude(site.source_glob("**/*.ts"))
        .exclude(site.source_glob("**/*.css"))
        .exclude(site.source_glob("**/*.html"))
        .select(&site.context.root)?;

    copy_all(&files, &site.context.publish_dir())
}

/// `copy:output`: generated data, minus the raw CSV tables
pub fn data_output(site: &Site) -> TaskResult<()> {
    let files = FileSet::new()
        .include(site.data_glob("**/*"))
        .exclude(site.data_glob("**/*.csv"))
        .select(&site.context.root)?;

    copy_all(&files, &site.context.publish_dir())
}

fn copy_all(files: &[SourceFile], dest: &Path) -> TaskResult<()> {
    for file in files {
        let target = dest.join(&file.relative);
        ensure_parent(&target)?;
        fs::copy(&file.path, &target).map_err(|e| TaskError::io(&file.path, e))?;
    }
    debug!(count = files.len(), dest = %dest.display(), "copied files");
    Ok(())
}
