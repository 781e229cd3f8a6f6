use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: SiteMetadata,
    #[serde(default)]
    navigator: NavigatorConfig,
    #[serde(default)]
    menu: Vec<MenuItem>,
    #[serde(default)]
    page: Vec<RawPage>,
    #[serde(default)]
    articles: Option<ArticlesIndex>,
    #[serde(default)]
    article: Vec<RawArticle>,
    #[serde(default)]
    theme: Option<Themes>,
}

#[derive(Debug, Deserialize)]
struct RawPage {
    category: Category,
    href: String,
    title: Option<String>,
    source: String, // Convert to PathBuf
}

#[derive(Debug, Deserialize)]
struct RawArticle {
    href: String,
    title: String,
    source: String, // Convert to PathBuf
    date: String,   // Parse as NaiveDate
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<Site> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<Site> {
    let raw: RawConfig = toml::from_str(content)?;

    for item in &raw.menu {
        validate_href(&item.href, "menu.href")?;
    }

    let pages: Result<Vec<PageDef>> = raw
        .page
        .into_iter()
        .map(|p| {
            validate_href(&p.href, "page.href")?;
            Ok(PageDef {
                category: p.category,
                href: p.href,
                title: p.title,
                source: validate_path(&p.source, "page.source")?,
            })
        })
        .collect();

    if let Some(index) = &raw.articles {
        validate_href(&index.href, "articles.href")?;
    } else if !raw.article.is_empty() {
        return Err(Error::ConfigParse(
            "Articles are listed but the [articles] index section is missing".to_string(),
        ));
    }

    let articles: Result<Vec<ArticleDef>> = raw
        .article
        .into_iter()
        .map(|a| {
            validate_href(&a.href, "article.href")?;
            let date = chrono::NaiveDate::parse_from_str(&a.date, "%Y-%m-%d").map_err(|e| {
                Error::ConfigParse(format!("Invalid date '{}' for {}: {}", a.date, a.href, e))
            })?;
            Ok(ArticleDef {
                href: a.href,
                title: a.title,
                source: validate_path(&a.source, "article.source")?,
                date,
            })
        })
        .collect();

    if raw.navigator.code_marker.trim().is_empty() {
        return Err(Error::ConfigParse(
            "navigator.code_marker cannot be empty".to_string(),
        ));
    }

    let theme = raw.theme.unwrap_or_default();
    for scheme in [&theme.light, &theme.dark] {
        validate_color(&scheme.foreground, "theme.foreground")?;
        validate_color(&scheme.background, "theme.background")?;
        for (category, color) in &scheme.accents {
            validate_color(color, &format!("theme.accents.{}", category))?;
        }
    }

    let site = Site {
        metadata: raw.site,
        navigator: raw.navigator,
        menu: raw.menu,
        pages: pages?,
        articles_index: raw.articles,
        articles: articles?,
        theme,
    };

    // Every href must map to exactly one page
    let mut seen = HashSet::new();
    for href in site.hrefs() {
        if !seen.insert(href) {
            return Err(Error::ConfigParse(format!("Duplicate href '{}'", href)));
        }
    }

    // Menu links must point at pages the site serves
    for item in &site.menu {
        if !seen.contains(item.href.as_str()) {
            return Err(Error::ConfigParse(format!(
                "Menu link '{}' points at '{}' which is not a page of this site",
                item.title, item.href
            )));
        }
    }

    Ok(site)
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal vulnerabilities by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Arguments
///
/// * `path_str` - The path string from user input (site.toml)
/// * `field_name` - Name of the field for error messages
///
/// # Examples
///
/// ```text
/// validate_path("pages/index.md", "source")  → Ok(PathBuf)
/// validate_path("/etc/passwd", "source")  → Err("Absolute paths not allowed...")
/// validate_path("../secret.md", "source")  → Err("Parent directory references...")
/// ```
fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    // Ensure path is not empty
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    // Reject absolute paths
    if path.is_absolute() || path_str.starts_with('/') || path_str.starts_with('\\') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    // Check for parent directory references
    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path.to_path_buf())
}

/// Site hrefs are root-relative: they start with a single `/`
fn validate_href(href: &str, field_name: &str) -> Result<()> {
    if !href.starts_with('/') || href.starts_with("//") {
        return Err(Error::ConfigParse(format!(
            "'{}' must be a site path starting with '/': '{}'",
            field_name, href
        )));
    }
    if href.contains(['?', '#']) || href.chars().any(char::is_whitespace) {
        return Err(Error::ConfigParse(format!(
            "'{}' must be a plain path without query, fragment or spaces: '{}'",
            field_name, href
        )));
    }
    Ok(())
}

/// Colors are `#rgb` or `#rrggbb`
fn validate_color(color: &str, field_name: &str) -> Result<()> {
    let hex = color.strip_prefix('#').unwrap_or("");
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(Error::ConfigParse(format!(
            "Invalid color in '{}': '{}', expected #rgb or #rrggbb",
            field_name, color
        )));
    }
    Ok(())
}
