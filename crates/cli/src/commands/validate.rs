use super::load_site;
use anyhow::Result;
use std::path::{Path, PathBuf};

pub async fn run(path: PathBuf) -> Result<()> {
    println!("Validating site at: {}", path.display());

    let site = load_site(&path)?;
    println!("✓ site.toml valid");
    println!("  Site: {}", site.metadata.title);
    println!("  Menu links: {}", site.menu.len());
    println!("  Pages: {}", site.pages.len());
    println!("  Articles: {}", site.articles.len());

    let missing = missing_sources(&path, &site.sources());
    if !missing.is_empty() {
        for source in &missing {
            eprintln!("   ✗ Source not found: {}", source.display());
        }
        anyhow::bail!("{} source file(s) missing", missing.len());
    }
    println!("✓ All sources present");

    if !path.join("static/main.js").exists() {
        println!("⚠ static/main.js not found; pages will not navigate in place");
    }

    Ok(())
}

fn missing_sources(site_dir: &Path, sources: &[&PathBuf]) -> Vec<PathBuf> {
    sources
        .iter()
        .map(|source| site_dir.join(source))
        .filter(|path| !path.is_file())
        .collect()
}
