use log::debug;
use std::fmt;
use std::sync::Arc;

use crate::resolver::{ActivationError, Resolver};
use crate::specification::Specification;
use crate::version::Requirement;

use super::FeatureLoader;

/// Errors from a load request.
#[derive(Debug)]
pub enum LoadError {
    /// Resolution failed; the loader was not invoked.
    Activation(ActivationError),
    /// The loader itself failed.
    Loader(anyhow::Error),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Activation(err) => fmt::Display::fmt(err, f),
            LoadError::Loader(err) => write!(f, "{:#}", err),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Activation(err) => Some(err),
            LoadError::Loader(err) => Some(err.as_ref()),
        }
    }
}

impl From<ActivationError> for LoadError {
    fn from(value: ActivationError) -> Self {
        LoadError::Activation(value)
    }
}

/// Wraps a [`FeatureLoader`] so every load request first settles pending
/// activations for the requested path.
pub struct LoadInterceptor<L: FeatureLoader> {
    resolver: Arc<Resolver>,
    loader: L,
}

impl<L: FeatureLoader> LoadInterceptor<L> {
    pub fn new(resolver: Arc<Resolver>, loader: L) -> Self {
        Self { resolver, loader }
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Load `path`, activating whatever pending package provides it.
    ///
    /// Returns the loader's answer: true if newly loaded, false if it was
    /// already loaded. A package may be activated even when the answer is
    /// false.
    #[tracing::instrument(skip(self))]
    pub fn load(&self, path: &str) -> Result<bool, LoadError> {
        if let Some(spec) = self.resolver.reconcile(path)? {
            debug!("{} activated for {:?}", spec.full_name(), path);
        }

        let load_path = self.resolver.load_path();
        let loaded = self
            .loader
            .require(path, &load_path)
            .map_err(LoadError::Loader)?;
        if !loaded {
            debug!("{:?} was already loaded", path);
        }
        Ok(loaded)
    }

    /// Activate the best version of `name` meeting `requirement` ahead of any load.
    pub fn gem(
        &self,
        name: &str,
        requirement: &Requirement,
    ) -> Result<Arc<Specification>, ActivationError> {
        self.resolver.activate_requirement(name, requirement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::{MemoryLoader, MockFeatureLoader};
    use crate::test_utils::{loaded_spec_names, new_spec, resolver_with, spec};
    use std::path::PathBuf;

    fn benchmark_resolver() -> Arc<Resolver> {
        Arc::new(resolver_with(vec![
            new_spec("a", "1", &[("b", ">= 1")], &["lib/a.rb"]),
            new_spec("b", "1", &[], &["lib/benchmark.rb"]),
            new_spec("b", "2", &[], &["lib/benchmark.rb"]),
        ]))
    }

    #[test_log::test]
    fn test_already_loaded_feature_still_activates() {
        // --- Setup ---
        let resolver = benchmark_resolver();
        resolver.activate(&spec(&resolver, "a-1")).unwrap();

        let loader = MemoryLoader::new();
        loader.preload("benchmark");
        let interceptor = LoadInterceptor::new(Arc::clone(&resolver), loader);

        // --- Execute ---
        let loaded = interceptor.load("benchmark").unwrap();

        // --- Verify ---
        assert!(!loaded);
        assert_eq!(loaded_spec_names(&resolver), vec!["a-1", "b-2"]);
    }

    #[test]
    fn test_loader_not_invoked_on_ambiguity() {
        let resolver = Arc::new(resolver_with(vec![
            new_spec("a", "1", &[("b", ">= 1"), ("x", ">= 1")], &[]),
            new_spec("b", "1", &[], &["lib/ib.rb"]),
            new_spec("b", "2", &[], &["lib/ib.rb"]),
            new_spec("x", "1", &[], &["lib/ib.rb"]),
            new_spec("x", "2", &[], &["lib/ib.rb"]),
        ]));
        resolver.activate(&spec(&resolver, "a-1")).unwrap();

        let mut loader = MockFeatureLoader::new();
        loader.expect_require().never();
        let interceptor = LoadInterceptor::new(Arc::clone(&resolver), loader);

        let err = interceptor.load("ib").unwrap_err();

        assert!(matches!(
            err,
            LoadError::Activation(ActivationError::AmbiguousProvider { .. })
        ));
        assert_eq!(err.to_string(), "ib found in multiple gems: b, x");
        assert_eq!(loaded_spec_names(&resolver), vec!["a-1"]);
    }

    #[test]
    fn test_load_path_from_active_gems() {
        let resolver = Arc::new(resolver_with(vec![
            new_spec("a", "1", &[("b", ">= 1")], &[]),
            new_spec("b", "1", &[], &["lib/b/c.rb"]).with_gem_dir("/gems/b-1"),
            new_spec("b", "2", &[], &["lib/b/c.rb"]).with_gem_dir("/gems/b-2"),
        ]));
        resolver.activate(&spec(&resolver, "a-1")).unwrap();

        let mut loader = MockFeatureLoader::new();
        loader
            .expect_require()
            .withf(|feature, load_path| {
                feature == "b/c" && load_path == [PathBuf::from("/gems/b-2/lib")]
            })
            .times(1)
            .returning(|_, _| Ok(true));
        let interceptor = LoadInterceptor::new(Arc::clone(&resolver), loader);

        assert!(interceptor.load("b/c").unwrap());
        assert!(resolver.is_active("b"));
    }

    #[test]
    fn test_loader_failure_keeps_activation() {
        let resolver = benchmark_resolver();
        resolver.activate(&spec(&resolver, "a-1")).unwrap();

        let interceptor = LoadInterceptor::new(
            Arc::clone(&resolver),
            MemoryLoader::with_available(["a"]),
        );

        let err = interceptor.load("benchmark").unwrap_err();

        assert!(matches!(err, LoadError::Loader(_)));
        assert_eq!(err.to_string(), "cannot load such file -- benchmark");
        assert_eq!(loaded_spec_names(&resolver), vec!["a-1", "b-2"]);
    }

    #[test]
    fn test_unrelated_path_goes_straight_to_loader() {
        let resolver = benchmark_resolver();
        let interceptor = LoadInterceptor::new(Arc::clone(&resolver), MemoryLoader::new());

        assert!(interceptor.load("json").unwrap());
        assert!(!interceptor.load("json.rb").unwrap());
        assert!(loaded_spec_names(&resolver).is_empty());
    }

    #[test]
    fn test_gem_then_load() {
        let resolver = benchmark_resolver();
        let interceptor = LoadInterceptor::new(Arc::clone(&resolver), MemoryLoader::new());

        let selected = interceptor.gem("b", &"< 2".parse().unwrap()).unwrap();
        assert_eq!(selected.full_name(), "b-1");

        assert!(interceptor.load("benchmark").unwrap());
        assert_eq!(loaded_spec_names(&resolver), vec!["b-1"]);
    }
}
