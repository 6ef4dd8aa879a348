//! The catalog of installed specifications.
//!
//! The catalog is populated once, before any resolution, and is read-only
//! afterwards. It indexes specifications by name and by provided symbolic
//! path so the resolver never rescans the whole set.

mod discovery;
mod repository;

pub use discovery::find_all_spec_files;
pub use repository::SpecRepository;

use log::warn;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::specification::{Specification, normalize_feature};
use crate::version::Version;

#[derive(Debug, Default)]
pub struct Catalog {
    specs: Vec<Arc<Specification>>,
    by_name: BTreeMap<String, Vec<Arc<Specification>>>,
    by_path: BTreeMap<String, Vec<Arc<Specification>>>,
}

impl Catalog {
    /// Build the catalog and its indexes.
    ///
    /// Specifications are ordered by name, then ascending version. A second
    /// specification with an already seen `full_name` is ignored.
    pub fn new<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = Specification>,
    {
        let mut specs: Vec<Specification> = specs.into_iter().collect();
        specs.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.version().cmp(b.version())));

        let mut catalog = Catalog::default();
        for spec in specs {
            if catalog.find(spec.name(), spec.version()).is_some() {
                warn!("Ignoring duplicate specification {}", spec.full_name());
                continue;
            }

            let spec = Arc::new(spec);
            catalog
                .by_name
                .entry(spec.name().to_string())
                .or_default()
                .push(Arc::clone(&spec));
            for path in spec.provided_paths() {
                catalog
                    .by_path
                    .entry(path.clone())
                    .or_default()
                    .push(Arc::clone(&spec));
            }
            catalog.specs.push(spec);
        }
        catalog
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Specification>> {
        self.specs.iter()
    }

    /// All installed versions of `name`, lowest first.
    pub fn find_by_name(&self, name: &str) -> &[Arc<Specification>] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn find(&self, name: &str, version: &Version) -> Option<&Arc<Specification>> {
        self.find_by_name(name)
            .iter()
            .find(|spec| spec.version() == version)
    }

    /// Look up a specification by its `<name>-<version>` form.
    pub fn find_by_full_name(&self, full_name: &str) -> Option<&Arc<Specification>> {
        self.specs.iter().find(|spec| spec.full_name() == full_name)
    }

    /// Every specification providing the symbolic path of a load request.
    pub fn find_by_provided_path(&self, path: &str) -> &[Arc<Specification>] {
        self.by_path
            .get(&normalize_feature(path))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The distinct package names providing a path, sorted.
    pub fn provider_names(&self, path: &str) -> BTreeSet<&str> {
        self.find_by_provided_path(path)
            .iter()
            .map(|spec| spec.name())
            .collect()
    }
}
