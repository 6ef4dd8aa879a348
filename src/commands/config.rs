use anyhow::Result;
use log::debug;
use std::path::PathBuf;

use crate::catalog::{Catalog, SpecRepository};
use crate::runtime::Runtime;

use super::paths::{resolve_base_load_path, resolve_install_root};

/// Settings shared by every command.
pub struct Config<R: Runtime> {
    pub runtime: R,
    pub install_root: PathBuf,
    pub base_load_path: Vec<PathBuf>,
}

impl<R: Runtime> Config<R> {
    pub fn new(runtime: R, install_root: Option<PathBuf>, includes: Vec<PathBuf>) -> Result<Self> {
        let install_root = resolve_install_root(&runtime, install_root)?;
        let base_load_path = resolve_base_load_path(&runtime, includes);
        debug!(
            "Using install root {:?}, base load path {:?}",
            install_root, base_load_path
        );

        Ok(Self {
            runtime,
            install_root,
            base_load_path,
        })
    }

    pub fn repository(&self) -> SpecRepository<'_, R> {
        SpecRepository::new(&self.runtime, self.install_root.clone())
    }

    pub fn load_catalog(&self) -> Result<Catalog> {
        self.repository().load_catalog()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::MockRuntime;
    use crate::test_utils::{configure_mock_runtime_basics, test_root};

    #[test]
    fn test_config_defaults() {
        let mut runtime = MockRuntime::new();
        configure_mock_runtime_basics(&mut runtime);

        let config = Config::new(runtime, None, Vec::new()).unwrap();

        assert_eq!(config.install_root, test_root());
        assert!(config.base_load_path.is_empty());
        assert_eq!(config.repository().install_root(), test_root());
    }

    #[test]
    fn test_config_explicit() {
        let mut runtime = MockRuntime::new();
        runtime.expect_env_var().never();

        let config = Config::new(
            runtime,
            Some(PathBuf::from("/custom")),
            vec![PathBuf::from("/site")],
        )
        .unwrap();

        assert_eq!(config.install_root, PathBuf::from("/custom"));
        assert_eq!(config.base_load_path, vec![PathBuf::from("/site")]);
    }
}
