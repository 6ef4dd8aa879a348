use anyhow::{Result, bail};

use crate::catalog::Catalog;
use crate::runtime::Runtime;
use crate::specification::normalize_feature;

use super::config::Config;

/// Show the installed specifications that provide a path
#[tracing::instrument(skip(config))]
pub fn which<R: Runtime>(config: &Config<R>, path: &str) -> Result<()> {
    let catalog = config.load_catalog()?;
    let lines = provider_lines(&catalog, path);
    if lines.is_empty() {
        bail!("No installed gem provides {}", normalize_feature(path));
    }

    for line in lines {
        println!("{}", line);
    }
    Ok(())
}

pub(crate) fn provider_lines(catalog: &Catalog, path: &str) -> Vec<String> {
    catalog
        .find_by_provided_path(path)
        .iter()
        .map(|spec| spec.full_name())
        .collect()
}
