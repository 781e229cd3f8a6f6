pub mod browse;
pub mod build;
pub mod init;
pub mod serve;
pub mod validate;

use anyhow::{Context, Result};
use phebe_core::{Site, parse_site_toml};
use std::path::Path;

/// Load `site.toml` from a site directory
pub(crate) fn load_site(path: &Path) -> Result<Site> {
    if !path.exists() {
        anyhow::bail!("Site directory does not exist: {}", path.display());
    }

    let site_toml_path = path.join("site.toml");
    if !site_toml_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'phebe init {}' first",
            path.display(),
            path.display()
        );
    }

    parse_site_toml(&site_toml_path).context("Failed to parse site.toml")
}
