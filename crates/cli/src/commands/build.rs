use super::load_site;
use anyhow::{Context, Result};
use chrono::Local;
use phebe_generator::{PreferredColorScheme, SiteContent};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Build static site for hosting
///
/// Every page is written twice: the HTML document and the JSON
/// representation the navigator fetches. Static hosts cannot negotiate on
/// `Accept`, so the JSON lands next to the HTML for the host to route.
pub async fn run(path: PathBuf, output: PathBuf) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let site = load_site(&path)?;
    println!("✓ Loaded: {}", site.metadata.title);

    let content = SiteContent::load(&path, site, Local::now().date_naive())
        .context("Failed to render site")?;

    println!("📁 Creating output directory...");
    fs::create_dir_all(&output).context("Failed to create output directory")?;

    println!("📄 Generating pages...");
    let generated = content.generate(PreferredColorScheme::Unspecified);
    for page in &generated.pages {
        let (html_path, json_path) = output_paths(&output, &page.href);
        if let Some(parent) = html_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&html_path, &page.html)
            .with_context(|| format!("Failed to write {}", html_path.display()))?;
        fs::write(&json_path, serde_json::to_string(&page.json)?)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        log::debug!("Wrote {} -> {}", page.href, html_path.display());
    }
    println!("   ✓ Generated {} pages", generated.pages.len());

    println!("🎨 Copying static files...");
    let copied = copy_static(&path.join("static"), &output)?;
    println!("   ✓ Copied {} static files", copied);

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();

    Ok(())
}

/// Where the HTML and JSON files of `href` go
///
/// `/` and `/people` become directory indexes; hrefs naming a file such as
/// `/2016/09/post.html` keep their name with a `.json` sibling.
fn output_paths(output: &Path, href: &str) -> (PathBuf, PathBuf) {
    let relative = href.trim_start_matches('/');
    let target = output.join(relative);

    if relative.ends_with(".html") {
        let json = target.with_extension("json");
        (target, json)
    } else {
        (target.join("index.html"), target.join("index.json"))
    }
}

fn copy_static(static_dir: &Path, output: &Path) -> Result<usize> {
    if !static_dir.exists() {
        return Ok(0);
    }

    let mut copied = 0;
    for entry in WalkDir::new(static_dir).into_iter().filter_map(|e| e.ok()) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(static_dir)
            .context("Static file outside static directory")?;
        let dst = output.join(relative);
        if let Some(parent) = dst.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(entry.path(), &dst)
            .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        copied += 1;
    }

    Ok(copied)
}
