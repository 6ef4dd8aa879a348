use anyhow::{Context, Result, bail};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::runtime::Runtime;
use crate::specification::{LOADABLE_SUFFIXES, strip_loadable_suffix};

use super::{FeatureLoader, LoadedFeatures};

/// Loader that resolves features against directories on disk.
///
/// A feature is looked up in the load path handed to [`FeatureLoader::require`]
/// first, then in the loader's base directories. A loaded file is recorded by
/// its canonical path, so two spellings of the same file load once.
pub struct FsLoader<R: Runtime> {
    runtime: R,
    base_load_path: Vec<PathBuf>,
    loaded: Mutex<LoadedFeatures>,
}

impl<R: Runtime> FsLoader<R> {
    pub fn new(runtime: R, base_load_path: Vec<PathBuf>) -> Self {
        Self {
            runtime,
            base_load_path,
            loaded: Mutex::default(),
        }
    }

    pub fn base_load_path(&self) -> &[PathBuf] {
        &self.base_load_path
    }

    /// Find the file `feature` refers to, without loading it.
    pub fn resolve(&self, feature: &str, load_path: &[PathBuf]) -> Option<PathBuf> {
        let names = candidate_names(feature);

        if Path::new(feature).is_absolute() {
            return names
                .into_iter()
                .map(PathBuf::from)
                .find(|path| self.runtime.exists(path) && !self.runtime.is_dir(path));
        }

        load_path
            .iter()
            .chain(&self.base_load_path)
            .flat_map(|dir| names.iter().map(move |name| dir.join(name)))
            .find(|path| self.runtime.exists(path) && !self.runtime.is_dir(path))
    }

    fn lock(&self) -> MutexGuard<'_, LoadedFeatures> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A feature with a loadable suffix names one file; a bare one may be any of them.
fn candidate_names(feature: &str) -> Vec<String> {
    if strip_loadable_suffix(feature).len() != feature.len() {
        return vec![feature.to_string()];
    }
    LOADABLE_SUFFIXES
        .iter()
        .map(|suffix| format!("{}{}", feature, suffix))
        .collect()
}

impl<R: Runtime> FeatureLoader for FsLoader<R> {
    #[tracing::instrument(skip(self, load_path))]
    fn require(&self, feature: &str, load_path: &[PathBuf]) -> Result<bool> {
        let Some(found) = self.resolve(feature, load_path) else {
            bail!("cannot load such file -- {}", feature);
        };
        let absolute = self
            .runtime
            .canonicalize(&found)
            .with_context(|| format!("Failed to resolve {:?}", found))?;

        if !self.lock().insert(absolute.to_string_lossy().into_owned()) {
            debug!("{:?} is already loaded", absolute);
            return Ok(false);
        }

        info!("Loaded {:?}", absolute);
        Ok(true)
    }

    fn loaded_features(&self) -> LoadedFeatures {
        self.lock().clone()
    }

    fn restore_loaded_features(&self, features: LoadedFeatures) {
        *self.lock() = features;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{MockRuntime, RealRuntime};
    use mockall::predicate::eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_require_searches_load_path_before_base() {
        let mut runtime = MockRuntime::new();

        // --- Setup ---
        let gem_lib = PathBuf::from("/gems/b-2/lib");
        let base = PathBuf::from("/site");

        // --- 1. Gem directory has b.rb ---
        runtime
            .expect_exists()
            .with(eq(PathBuf::from("/gems/b-2/lib/b.rb")))
            .returning(|_| true);
        runtime
            .expect_is_dir()
            .with(eq(PathBuf::from("/gems/b-2/lib/b.rb")))
            .returning(|_| false);
        runtime
            .expect_canonicalize()
            .with(eq(PathBuf::from("/gems/b-2/lib/b.rb")))
            .returning(|p| Ok(p.to_path_buf()));

        // --- Execute ---
        let loader = FsLoader::new(runtime, vec![base]);
        assert!(loader.require("b", &[gem_lib]).unwrap());

        assert!(loader.loaded_features().contains("/gems/b-2/lib/b.rb"));
    }

    #[test]
    fn test_require_falls_back_to_base_load_path() {
        let mut runtime = MockRuntime::new();

        // --- 1. Nothing in the gem directory, benchmark.rb in the base dir ---
        runtime
            .expect_exists()
            .returning(|p| p == Path::new("/site/benchmark.rb"));
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));

        // --- Execute ---
        let loader = FsLoader::new(runtime, vec![PathBuf::from("/site")]);
        let load_path = vec![PathBuf::from("/gems/b-2/lib")];

        assert!(loader.require("benchmark", &load_path).unwrap());
        assert!(!loader.require("benchmark.rb", &load_path).unwrap());
    }

    #[test]
    fn test_require_missing_feature() {
        let mut runtime = MockRuntime::new();
        runtime.expect_exists().returning(|_| false);
        runtime.expect_canonicalize().never();

        let loader = FsLoader::new(runtime, vec![PathBuf::from("/site")]);
        let err = loader.require("nope", &[]).unwrap_err();

        assert_eq!(err.to_string(), "cannot load such file -- nope");
        assert!(loader.loaded_features().is_empty());
    }

    #[test]
    fn test_explicit_suffix_only_matches_that_file() {
        let mut runtime = MockRuntime::new();
        runtime
            .expect_exists()
            .returning(|p| p == Path::new("/site/native.so"));
        runtime.expect_is_dir().returning(|_| false);
        runtime
            .expect_canonicalize()
            .returning(|p| Ok(p.to_path_buf()));

        let loader = FsLoader::new(runtime, vec![PathBuf::from("/site")]);

        assert!(loader.require("native.rb", &[]).is_err());
        assert!(loader.require("native.so", &[]).unwrap());
    }

    #[test]
    fn test_require_real_files() {
        let dir = tempdir().unwrap();
        let lib = dir.path().join("lib");
        fs::create_dir_all(lib.join("b")).unwrap();
        fs::write(lib.join("b").join("c.rb"), "").unwrap();
        // A directory named like a feature is not loadable.
        fs::create_dir_all(lib.join("d.rb")).unwrap();

        let loader = FsLoader::new(RealRuntime, Vec::new());
        let load_path = vec![lib.clone()];

        assert!(loader.require("b/c", &load_path).unwrap());
        assert!(!loader.require("b/c.rb", &load_path).unwrap());
        assert!(loader.require("d", &load_path).is_err());

        let absolute = lib.join("b").join("c.rb");
        assert!(loader.require(absolute.to_str().unwrap(), &[]).is_ok_and(|l| !l));
    }
}
