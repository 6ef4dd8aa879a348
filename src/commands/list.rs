use anyhow::Result;
use log::debug;

use crate::catalog::Catalog;
use crate::runtime::Runtime;

use super::config::Config;

/// List all installed specifications
#[tracing::instrument(skip(config))]
pub fn list<R: Runtime>(config: &Config<R>) -> Result<()> {
    debug!("Listing specifications from {:?}", config.install_root);

    let catalog = config.load_catalog()?;
    if catalog.is_empty() {
        println!("No gems installed.");
        return Ok(());
    }

    for line in installed_lines(&catalog) {
        println!("{}", line);
    }
    Ok(())
}

/// `name-version` for each installed specification, by name then version.
pub(crate) fn installed_lines(catalog: &Catalog) -> Vec<String> {
    catalog.iter().map(|spec| spec.full_name()).collect()
}
