use super::load_site;
use anyhow::{Context, Result};
use async_trait::async_trait;
use phebe_core::{JsonPage, Site};
use phebe_navigator::{
    FetchError, FetchOptions, HeadlessBrowser, HttpFetcher, Navigator, PageFetcher,
    TokioLocalSpawner,
};
use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

/// Records every request the navigator makes
struct CountingFetcher {
    inner: HttpFetcher,
    requests: RefCell<Vec<String>>,
}

#[async_trait(?Send)]
impl PageFetcher for CountingFetcher {
    async fn fetch_page(&self, path: &str, options: FetchOptions) -> Result<JsonPage, FetchError> {
        self.requests.borrow_mut().push(path.to_string());
        self.inner.fetch_page(path, options).await
    }
}

#[derive(Debug)]
struct Visit {
    href: String,
    location: String,
    active_links: Vec<String>,
    content_len: usize,
    full_load: bool,
}

#[derive(Debug)]
struct BrowseReport {
    visits: Vec<Visit>,
    requests: Vec<String>,
    /// Set when a full page load could not be followed
    stopped_at: Option<String>,
}

/// One loaded document with its own navigator, as after a page load
struct Session {
    browser: Rc<HeadlessBrowser>,
    navigator: Rc<Navigator>,
}

/// Walk a running site the way a visitor would.
///
/// The first href is loaded as the initial page. Every following href is
/// hovered, then clicked, and the navigator is given time to settle before
/// the resulting state is reported. A full page load starts a new session on
/// the page the location ended up at.
///
/// # Arguments
///
/// * `path` - Site directory; its menu and categories shape the page
/// * `base_url` - Where the site is served (see `phebe serve`)
/// * `hrefs` - Pages to visit, in order
pub async fn run(path: PathBuf, base_url: String, hrefs: Vec<String>) -> Result<()> {
    let site = load_site(&path)?;

    println!("🧭 Browsing {}", base_url);

    let local = tokio::task::LocalSet::new();
    let report = local.run_until(browse(site, &base_url, &hrefs)).await?;

    for visit in &report.visits {
        let mode = if visit.full_load {
            "full load"
        } else {
            "in place"
        };
        println!(
            "   {} {} ({}) → {} | active: [{}] | {} bytes",
            if visit.full_load { "⚠" } else { "✓" },
            visit.href,
            mode,
            visit.location,
            visit.active_links.join(", "),
            visit.content_len
        );
    }

    if let Some(location) = &report.stopped_at {
        println!();
        println!("⚠ Stopped: {} did not load", location);
    }

    println!();
    println!("📊 {} page request(s)", report.requests.len());
    for request in &report.requests {
        println!("   GET {}", request);
    }

    Ok(())
}

/// Load `href` the way the browser does on a full page load
///
/// The document request itself is not one of the navigator's requests and
/// is not counted.
async fn open_page(
    site: &Site,
    fetcher: &Rc<CountingFetcher>,
    href: &str,
) -> Result<Session, FetchError> {
    let options = FetchOptions::from(&site.navigator);
    let page = fetcher.inner.fetch_page(href, options).await?;

    let links = site
        .menu
        .iter()
        .map(|item| (item.href.clone(), Some(item.category.clone())))
        .collect();
    let browser = Rc::new(HeadlessBrowser::new(
        href,
        &site.metadata.title,
        site.category_of(href).cloned(),
        links,
        &page.content,
    ));

    let navigator = Navigator::new(
        site.navigator.clone(),
        fetcher.clone(),
        browser.clone(),
        browser.clone(),
        Rc::new(TokioLocalSpawner),
    );
    navigator.attach(browser.as_ref());

    Ok(Session { browser, navigator })
}

async fn browse(site: Site, base_url: &str, hrefs: &[String]) -> Result<BrowseReport> {
    let Some((first, rest)) = hrefs.split_first() else {
        anyhow::bail!("Nothing to browse: pass at least one href");
    };

    let fetcher = Rc::new(CountingFetcher {
        inner: HttpFetcher::new(base_url)?,
        requests: RefCell::new(Vec::new()),
    });
    let mut session = open_page(&site, &fetcher, first)
        .await
        .with_context(|| format!("Failed to load initial page {}", first))?;

    let mut visits = Vec::with_capacity(rest.len());
    let mut stopped_at = None;
    for href in rest {
        let browser = Rc::clone(&session.browser);
        let full_loads = browser.full_loads().len();

        browser.hover(href);
        browser.click(href);
        session.navigator.settled().await;

        let location = browser.location();
        let full_load = browser.full_loads().len() > full_loads;
        visits.push(Visit {
            href: href.clone(),
            location: location.clone(),
            active_links: browser.active_links(),
            content_len: browser.content().len(),
            full_load,
        });

        if full_load {
            match open_page(&site, &fetcher, &location).await {
                Ok(next) => session = next,
                Err(err) => {
                    log::warn!("Full page load of {} failed: {}", location, err);
                    stopped_at = Some(location);
                    break;
                }
            }
        }
    }

    let requests = fetcher.requests.borrow().clone();
    Ok(BrowseReport {
        visits,
        requests,
        stopped_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::serve::app;
    use chrono::Local;
    use phebe_core::parse_site_toml_str;
    use phebe_generator::SiteContent;
    use std::fs;
    use tempfile::TempDir;

    const SITE_TOML: &str = r##"
[site]
title = "Test Site"

[[menu]]
category = "me"
href = "/"
title = "Me"

[[menu]]
category = "people"
href = "/people"
title = "People"

[[page]]
category = "me"
href = "/"
source = "pages/index.md"

[[page]]
category = "people"
href = "/people"
source = "pages/people.md"
"##;

    async fn start_server() -> (TempDir, Site, String) {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::write(dir.path().join("pages/index.md"), "Home").unwrap();
        fs::write(dir.path().join("pages/people.md"), "People I know").unwrap();

        let site = parse_site_toml_str(SITE_TOML).unwrap();
        let content =
            SiteContent::load(dir.path(), site.clone(), Local::now().date_naive()).unwrap();
        let router = app(content, dir.path().join("static"));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (dir, site, format!("http://{}", addr))
    }

    #[tokio::test]
    async fn test_browse_navigates_in_place() {
        let (_dir, site, base_url) = start_server().await;
        let hrefs = vec!["/".to_string(), "/people".to_string(), "/".to_string()];

        let local = tokio::task::LocalSet::new();
        let report = local
            .run_until(browse(site, &base_url, &hrefs))
            .await
            .unwrap();

        assert_eq!(report.visits.len(), 2);

        let people = &report.visits[0];
        assert!(!people.full_load);
        assert_eq!(people.location, "/people");
        assert_eq!(people.active_links, vec!["/people".to_string()]);
        assert!(people.content_len > 0);

        let home = &report.visits[1];
        assert!(!home.full_load);
        assert_eq!(home.active_links, vec!["/".to_string()]);

        // Hover and click share one request per page
        assert_eq!(report.requests, vec!["/people".to_string(), "/".to_string()]);
        assert!(report.stopped_at.is_none());
    }

    #[tokio::test]
    async fn test_browse_missing_page_falls_back_to_full_load() {
        let (_dir, site, base_url) = start_server().await;
        let hrefs = vec![
            "/".to_string(),
            "/missing".to_string(),
            "/people".to_string(),
        ];

        let local = tokio::task::LocalSet::new();
        let report = local
            .run_until(browse(site, &base_url, &hrefs))
            .await
            .unwrap();

        // The full load of /missing fails too, so the walk ends there
        assert_eq!(report.visits.len(), 1);
        let missing = &report.visits[0];
        assert!(missing.full_load);
        assert_eq!(missing.location, "/missing");
        assert_eq!(report.stopped_at.as_deref(), Some("/missing"));
        assert_eq!(report.requests, vec!["/missing".to_string()]);
    }

    #[tokio::test]
    async fn test_browse_requires_an_href() {
        let site = parse_site_toml_str(SITE_TOML).unwrap();
        let local = tokio::task::LocalSet::new();
        let result = local
            .run_until(browse(site, "http://127.0.0.1:9", &[]))
            .await;
        assert!(result.is_err());
    }
}
