//! Clean task

use super::Site;
use crate::error::{TaskError, TaskResult};
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::debug;

/// `clean`: delete the publish and compiled directories wholesale
pub fn clean(site: &Site) -> TaskResult<()> {
    remove_tree(&site.context.publish_dir())?;
    remove_tree(&site.context.compiled_dir())
}

fn remove_tree(path: &Path) -> TaskResult<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TaskError::io(path, e)),
    }
}
