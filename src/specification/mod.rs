//! Installed package specifications.
//!
//! A [`Specification`] describes one installed version of a package: its
//! dependencies and the symbolic paths its files make loadable. The symbolic
//! path of a file is its path relative to a require path, minus a loadable
//! suffix: `lib/b/c.rb` with require path `lib` provides `b/c`.

mod file;

pub use file::SpecFile;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::runtime::{normalize_path, to_slash};
use crate::version::{Requirement, Version};

/// File suffixes the loader can load.
pub const LOADABLE_SUFFIXES: [&str; 4] = [".rb", ".so", ".bundle", ".dll"];

/// Require path used when a specification does not declare any.
pub const DEFAULT_REQUIRE_PATH: &str = "lib";

/// Normalize a load request into the symbolic path form used by the catalog.
///
/// Separators become `/`, `.` components are dropped and a trailing
/// loadable suffix is removed: `./b/c.rb` -> `b/c`.
pub fn normalize_feature(path: &str) -> String {
    let slashed = to_slash(&normalize_path(Path::new(&path.replace('\\', "/"))));
    strip_loadable_suffix(&slashed).to_string()
}

/// Remove a trailing loadable suffix, if present.
pub fn strip_loadable_suffix(path: &str) -> &str {
    LOADABLE_SUFFIXES
        .iter()
        .find_map(|suffix| path.strip_suffix(suffix))
        .unwrap_or(path)
}

/// One installed package version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specification {
    name: String,
    version: Version,
    dependencies: BTreeMap<String, Requirement>,
    require_paths: Vec<String>,
    files: Vec<String>,
    gem_dir: Option<PathBuf>,
    provided_paths: BTreeSet<String>,
}

impl Specification {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: BTreeMap::new(),
            require_paths: vec![DEFAULT_REQUIRE_PATH.to_string()],
            files: Vec::new(),
            gem_dir: None,
            provided_paths: BTreeSet::new(),
        }
    }

    /// Add a runtime dependency. A repeated name narrows the existing
    /// requirement instead of replacing it.
    pub fn with_dependency(mut self, name: impl Into<String>, requirement: Requirement) -> Self {
        let name = name.into();
        let requirement = match self.dependencies.get(&name) {
            Some(existing) => existing.intersect(&requirement),
            None => requirement,
        };
        self.dependencies.insert(name, requirement);
        self
    }

    pub fn with_require_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.require_paths = paths.into_iter().map(Into::into).collect();
        self.refresh_provided_paths();
        self
    }

    /// Set the gem-relative files (e.g. `lib/a.rb`) this version ships.
    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = files.into_iter().map(Into::into).collect();
        self.refresh_provided_paths();
        self
    }

    pub fn with_gem_dir(mut self, gem_dir: impl Into<PathBuf>) -> Self {
        self.gem_dir = Some(gem_dir.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    /// `<name>-<version>`, e.g. `b-2`.
    pub fn full_name(&self) -> String {
        format!("{}-{}", self.name, self.version)
    }

    pub fn dependencies(&self) -> &BTreeMap<String, Requirement> {
        &self.dependencies
    }

    pub fn require_paths(&self) -> &[String] {
        &self.require_paths
    }

    pub fn files(&self) -> &[String] {
        &self.files
    }

    pub fn gem_dir(&self) -> Option<&Path> {
        self.gem_dir.as_deref()
    }

    pub fn provided_paths(&self) -> &BTreeSet<String> {
        &self.provided_paths
    }

    pub fn provides(&self, symbolic_path: &str) -> bool {
        self.provided_paths.contains(symbolic_path)
    }

    /// Absolute require directories, empty when the install location is unknown.
    pub fn full_require_paths(&self) -> Vec<PathBuf> {
        match &self.gem_dir {
            Some(dir) => self.require_paths.iter().map(|p| dir.join(p)).collect(),
            None => Vec::new(),
        }
    }

    fn refresh_provided_paths(&mut self) {
        self.provided_paths = self
            .files
            .iter()
            .filter_map(|file| provided_path(file, &self.require_paths))
            .collect();
    }
}

impl fmt::Display for Specification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// The symbolic path a gem-relative file provides, if it lives under a
/// require path and carries a loadable suffix.
fn provided_path(file: &str, require_paths: &[String]) -> Option<String> {
    let file = to_slash(&normalize_path(Path::new(&file.replace('\\', "/"))));
    let stripped = strip_loadable_suffix(&file);
    if stripped.len() == file.len() {
        return None;
    }

    require_paths.iter().find_map(|root| {
        let root = to_slash(Path::new(root));
        let rest = if root.is_empty() {
            stripped
        } else {
            stripped.strip_prefix(&root)?.strip_prefix('/')?
        };
        (!rest.is_empty()).then(|| rest.to_string())
    })
}
