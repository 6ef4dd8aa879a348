use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;

use crate::runtime::Runtime;

pub const ROOT_ENV: &str = "GEMLAZY_ROOT";
pub const LOAD_PATH_ENV: &str = "GEMLAZY_LOAD_PATH";

/// Get the install root: explicit path, then `GEMLAZY_ROOT`, then `~/.gemlazy`.
#[tracing::instrument(skip(runtime))]
pub fn resolve_install_root<R: Runtime>(
    runtime: &R,
    install_root: Option<PathBuf>,
) -> Result<PathBuf> {
    if let Some(path) = install_root {
        return Ok(path);
    }
    match runtime.env_var(ROOT_ENV) {
        Ok(value) if !value.is_empty() => Ok(PathBuf::from(value)),
        _ => default_install_root(runtime),
    }
}

/// Get the default installation root directory
#[tracing::instrument(skip(runtime))]
pub fn default_install_root<R: Runtime>(runtime: &R) -> Result<PathBuf> {
    let home_dir = runtime
        .home_dir()
        .context("Could not find home directory")?;
    Ok(home_dir.join(".gemlazy"))
}

/// Directories searched after those of active gems: explicit includes, else
/// the entries of `GEMLAZY_LOAD_PATH`.
pub fn resolve_base_load_path<R: Runtime>(runtime: &R, includes: Vec<PathBuf>) -> Vec<PathBuf> {
    if !includes.is_empty() {
        return includes;
    }
    match runtime.env_var(LOAD_PATH_ENV) {
        Ok(value) => env::split_paths(&value)
            .filter(|p| !p.as_os_str().is_empty())
            .collect(),
        Err(_) => Vec::new(),
    }
}
