//! Reader for an installed package tree.
//!
//! Layout under the install root:
//!
//! ```text
//! <root>/specifications/<name>-<version>.json
//! <root>/gems/<name>-<version>/<require_path>/...
//! ```
//!
//! This crate never writes to the tree; it only builds the [`Catalog`] from it.

use anyhow::Result;
use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::runtime::{Runtime, relative_path_from_dir, to_slash};
use crate::specification::{SpecFile, Specification};

use super::{Catalog, find_all_spec_files};

pub struct SpecRepository<'a, R: Runtime> {
    runtime: &'a R,
    install_root: PathBuf,
}

impl<'a, R: Runtime> SpecRepository<'a, R> {
    pub fn new(runtime: &'a R, install_root: PathBuf) -> Self {
        Self {
            runtime,
            install_root,
        }
    }

    pub fn install_root(&self) -> &Path {
        &self.install_root
    }

    /// Returns: `<install_root>/specifications/<full_name>.json`
    pub fn spec_path(&self, full_name: &str) -> PathBuf {
        self.install_root
            .join("specifications")
            .join(format!("{}.json", full_name))
    }

    /// Returns: `<install_root>/gems/<full_name>`
    pub fn gem_dir(&self, full_name: &str) -> PathBuf {
        self.install_root.join("gems").join(full_name)
    }

    /// List the files under each require path of a gem directory, relative
    /// to that directory (e.g. `lib/b/c.rb`).
    #[tracing::instrument(skip(self))]
    pub fn discover_files(&self, gem_dir: &Path, require_paths: &[String]) -> Result<Vec<String>> {
        if !self.runtime.exists(gem_dir) {
            debug!("Gem directory {:?} does not exist", gem_dir);
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for require_path in require_paths {
            let dir = gem_dir.join(require_path);
            let pattern = format!("{}/**/*", glob::Pattern::escape(&dir.to_string_lossy()));
            for path in self.runtime.glob(&pattern)? {
                if self.runtime.is_dir(&path) {
                    continue;
                }
                if let Some(relative) = relative_path_from_dir(gem_dir, &path) {
                    files.push(to_slash(&relative));
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    /// Load one specification file, discovering its files when they are not recorded.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, spec_path: &Path) -> Result<Specification> {
        let spec_file = SpecFile::load(self.runtime, spec_path)?;
        let gem_dir = self.gem_dir(&spec_file.full_name());

        let files = if spec_file.files.is_some() {
            Vec::new()
        } else {
            self.discover_files(&gem_dir, &spec_file.require_paths)?
        };

        Ok(spec_file.into_specification(files, Some(gem_dir)))
    }

    /// Load every installed specification, skipping unreadable ones.
    pub fn load_all(&self) -> Result<Vec<Specification>> {
        let spec_paths = find_all_spec_files(self.runtime, &self.install_root)?;
        let mut specs = Vec::with_capacity(spec_paths.len());

        for spec_path in spec_paths {
            match self.load(&spec_path) {
                Ok(spec) => specs.push(spec),
                Err(e) => {
                    warn!("Failed to load specification from {:?}: {:#}", spec_path, e);
                }
            }
        }

        debug!("Loaded {} specification(s)", specs.len());
        Ok(specs)
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        Ok(Catalog::new(self.load_all()?))
    }
}
