use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

use crate::catalog::Catalog;
use crate::loader::{FeatureLoader, FsLoader, LoadInterceptor};
use crate::resolver::Resolver;
use crate::runtime::Runtime;
use crate::specification::Specification;

use super::config::Config;
use super::gem_arg::GemArg;

/// What to do in one `require` session, in order: explicit activations,
/// requirement-based activations, then loads.
#[derive(Debug, Default, Clone)]
pub struct RequireOptions {
    /// Full names such as `a-1`.
    pub activate: Vec<String>,
    pub gems: Vec<GemArg>,
    pub paths: Vec<String>,
}

/// Load paths through a fresh activation session over the installed tree
#[tracing::instrument(skip(config, options))]
pub fn require<R: Runtime>(config: Config<R>, options: &RequireOptions) -> Result<()> {
    let catalog = Arc::new(config.load_catalog()?);
    debug!("Catalog has {} specification(s)", catalog.len());

    let loader = FsLoader::new(config.runtime, config.base_load_path);
    let interceptor = LoadInterceptor::new(Arc::new(Resolver::new(catalog)), loader);

    for line in run_session(&interceptor, options)? {
        println!("{}", line);
    }
    Ok(())
}

/// Run a session and describe it: one line per load, then the active and
/// pending sets.
pub(crate) fn run_session<L: FeatureLoader>(
    interceptor: &LoadInterceptor<L>,
    options: &RequireOptions,
) -> Result<Vec<String>> {
    let resolver = interceptor.resolver();

    for full_name in &options.activate {
        let spec = find_installed(resolver.catalog(), full_name)?;
        resolver.activate(&spec)?;
        info!("Activated {}", spec.full_name());
    }

    for gem in &options.gems {
        let spec = interceptor.gem(&gem.name, &gem.requirement)?;
        info!("Activated {} for {}", spec.full_name(), gem);
    }

    let mut lines = Vec::new();
    for path in &options.paths {
        let loaded = interceptor.load(path)?;
        lines.push(if loaded {
            format!("loaded {}", path)
        } else {
            format!("already loaded {}", path)
        });
    }

    let state = resolver.snapshot();
    lines.extend(
        state
            .registry()
            .iter()
            .map(|spec| format!("active {}", spec.full_name())),
    );
    lines.extend(
        state
            .unresolved()
            .describe()
            .into_iter()
            .map(|pending| format!("pending {}", pending)),
    );
    Ok(lines)
}

fn find_installed(catalog: &Catalog, full_name: &str) -> Result<Arc<Specification>> {
    catalog
        .find_by_full_name(full_name)
        .cloned()
        .with_context(|| format!("{} is not installed", full_name))
}
