use anyhow::{Result, bail};
use log::debug;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use crate::specification::normalize_feature;

use super::{FeatureLoader, LoadedFeatures};

/// Loader that tracks loaded features in memory, keyed by symbolic path.
///
/// Without an availability list every feature loads; with one, features
/// outside it fail like a missing file.
#[derive(Debug, Default)]
pub struct MemoryLoader {
    loaded: Mutex<LoadedFeatures>,
    available: Option<BTreeSet<String>>,
}

impl MemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_available<I, S>(features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            loaded: Mutex::default(),
            available: Some(
                features
                    .into_iter()
                    .map(|f| normalize_feature(f.as_ref()))
                    .collect(),
            ),
        }
    }

    /// Mark a feature as loaded by some unrelated means.
    pub fn preload(&self, feature: &str) -> bool {
        self.lock().insert(normalize_feature(feature))
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LoadedFeatures> {
        self.loaded.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeatureLoader for MemoryLoader {
    fn require(&self, feature: &str, _load_path: &[PathBuf]) -> Result<bool> {
        let feature = normalize_feature(feature);
        if let Some(available) = &self.available
            && !available.contains(&feature)
        {
            bail!("cannot load such file -- {}", feature);
        }

        let loaded = self.lock().insert(feature.clone());
        debug!("require {:?} -> {}", feature, loaded);
        Ok(loaded)
    }

    fn loaded_features(&self) -> LoadedFeatures {
        self.lock().clone()
    }

    fn restore_loaded_features(&self, features: LoadedFeatures) {
        *self.lock() = features;
    }
}
