//! The load entry point and the module loaders behind it.
//!
//! [`LoadInterceptor`] runs the resolver for every request, then hands the
//! request to a [`FeatureLoader`], which does the actual, idempotent load.
//!
//! # Structure
//!
//! - `interceptor` - Resolution before delegation, [`LoadError`]
//! - `memory` - In-memory loader keyed by symbolic path
//! - `fs` - Loader that searches the load path on disk

mod fs;
mod interceptor;
mod memory;

pub use fs::FsLoader;
pub use interceptor::{LoadError, LoadInterceptor};
pub use memory::MemoryLoader;

use anyhow::Result;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// The set of features a loader has already loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedFeatures(BTreeSet<String>);

impl LoadedFeatures {
    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains(feature)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Returns false when the feature was already present.
    pub(crate) fn insert(&mut self, feature: String) -> bool {
        self.0.insert(feature)
    }
}

/// Loads a feature exactly once per resolved location.
#[cfg_attr(test, mockall::automock)]
pub trait FeatureLoader: Send + Sync {
    /// Load `feature`, searching `load_path` ahead of the loader's own
    /// directories. Returns true if this call loaded it, false if it was
    /// already loaded by any means.
    fn require(&self, feature: &str, load_path: &[PathBuf]) -> Result<bool>;

    fn loaded_features(&self) -> LoadedFeatures;

    fn restore_loaded_features(&self, features: LoadedFeatures);
}

/// Run `f`, then restore the loader's loaded-feature set to what it was before,
/// even if `f` panics.
pub fn save_loaded_features<L, T, F>(loader: &L, f: F) -> T
where
    L: FeatureLoader + ?Sized,
    F: FnOnce() -> T,
{
    struct Restore<'a, L: FeatureLoader + ?Sized> {
        loader: &'a L,
        saved: Option<LoadedFeatures>,
    }

    impl<L: FeatureLoader + ?Sized> Drop for Restore<'_, L> {
        fn drop(&mut self) {
            if let Some(saved) = self.saved.take() {
                self.loader.restore_loaded_features(saved);
            }
        }
    }

    let _restore = Restore {
        loader,
        saved: Some(loader.loaded_features()),
    };
    f()
}
