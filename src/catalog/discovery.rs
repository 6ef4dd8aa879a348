use anyhow::Result;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;

/// Find all installed specification files.
///
/// Directory structure: `<root>/specifications/<name>-<version>.json`
#[tracing::instrument(skip(runtime, root))]
pub fn find_all_spec_files<R: Runtime>(runtime: &R, root: &Path) -> Result<Vec<PathBuf>> {
    let mut spec_files = Vec::new();

    let spec_dir = root.join("specifications");
    if !runtime.exists(&spec_dir) {
        return Ok(spec_files);
    }

    for path in runtime.read_dir(&spec_dir)? {
        if path.extension().is_some_and(|ext| ext == "json") && !runtime.is_dir(&path) {
            spec_files.push(path);
        }
    }

    spec_files.sort();
    Ok(spec_files)
}
