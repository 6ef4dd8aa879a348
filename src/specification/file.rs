use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::runtime::Runtime;
use crate::version::{Requirement, Version};

use super::{DEFAULT_REQUIRE_PATH, Specification};

/// On-disk form of a specification, stored as
/// `<root>/specifications/<name>-<version>.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SpecFile {
    pub name: String,
    pub version: Version,
    #[serde(default)]
    pub dependencies: BTreeMap<String, Requirement>,
    #[serde(default = "default_require_paths")]
    pub require_paths: Vec<String>,
    /// Gem-relative files. When absent they are discovered from the gem directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
}

fn default_require_paths() -> Vec<String> {
    vec![DEFAULT_REQUIRE_PATH.to_string()]
}

impl SpecFile {
    #[tracing::instrument(skip(runtime, path))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let content = runtime.read_to_string(path)?;
        let spec: SpecFile = serde_json::from_str(&content)
            .with_context(|| format!("Invalid specification file {:?}", path))?;
        Ok(spec)
    }

    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    /// Build the in-memory specification, using `files` when the file list
    /// was not recorded in the spec file itself.
    pub fn into_specification(self, files: Vec<String>, gem_dir: Option<PathBuf>) -> Specification {
        let files = self.files.unwrap_or(files);
        let mut spec = self
            .dependencies
            .into_iter()
            .fold(Specification::new(self.name, self.version), |spec, (name, req)| {
                spec.with_dependency(name, req)
            })
            .with_require_paths(self.require_paths)
            .with_files(files);
        if let Some(dir) = gem_dir {
            spec = spec.with_gem_dir(dir);
        }
        spec
    }
}
