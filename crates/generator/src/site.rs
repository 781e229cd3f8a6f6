use crate::color_scheme::PreferredColorScheme;
use crate::document::{render_content, render_document};
use crate::html_escape;
use crate::markdown::render_markdown;
use chrono::NaiveDate;
use phebe_core::{ArticleDef, ArticlesIndex, Category, Error, JsonPage, Result, Site};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// One page, rendered down to its content region
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub category: Category,
    pub content: String,
}

/// Output of a static build
pub struct GeneratedSite {
    pub pages: Vec<GeneratedPage>,
}

pub struct GeneratedPage {
    pub href: String,
    pub html: String,
    pub json: JsonPage,
}

/// Every published page of a site, ready to be served or written out
pub struct SiteContent {
    site: Site,
    pages: BTreeMap<String, RenderedPage>,
}

impl SiteContent {
    /// Read and render every source referenced by `site`
    ///
    /// # Arguments
    ///
    /// * `site_dir` - Directory containing site.toml; sources are relative to it
    /// * `site` - Parsed site configuration
    /// * `today` - Articles dated after this day are left out
    pub fn load(site_dir: &Path, site: Site, today: NaiveDate) -> Result<Self> {
        let mut pages = BTreeMap::new();

        for page in &site.pages {
            log::trace!("Rendering {} from {}", page.href, page.source.display());
            let source = read_source(site_dir, &page.source)?;
            pages.insert(
                page.href.clone(),
                RenderedPage {
                    category: page.category.clone(),
                    content: render_content(page.title.as_deref(), &render_markdown(&source)),
                },
            );
        }

        if let Some(index) = &site.articles_index {
            let mut published: Vec<&ArticleDef> = site
                .articles
                .iter()
                .filter(|article| article.is_published(today))
                .collect();
            // Newest first
            published.sort_by(|a, b| b.date.cmp(&a.date));

            pages.insert(
                index.href.clone(),
                RenderedPage {
                    category: index.category.clone(),
                    content: render_articles_index(index, &published),
                },
            );

            for article in published {
                let source = read_source(site_dir, &article.source)?;
                pages.insert(
                    article.href.clone(),
                    RenderedPage {
                        category: index.category.clone(),
                        content: render_article(article, &render_markdown(&source)),
                    },
                );
            }
        }

        log::debug!("Rendered {} pages", pages.len());
        Ok(Self { site, pages })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn page(&self, href: &str) -> Option<&RenderedPage> {
        self.pages.get(href)
    }

    pub fn hrefs(&self) -> impl Iterator<Item = &str> {
        self.pages.keys().map(String::as_str)
    }

    /// JSON representation served to the navigator
    pub fn json_page(&self, href: &str) -> Option<JsonPage> {
        self.pages.get(href).map(|page| JsonPage {
            content: page.content.clone(),
        })
    }

    /// Full HTML document for a first visit
    pub fn html_page(&self, href: &str, scheme: PreferredColorScheme) -> Option<String> {
        self.pages
            .get(href)
            .map(|page| render_document(&self.site, &page.category, &page.content, scheme))
    }

    /// Render every page for static hosting
    pub fn generate(&self, scheme: PreferredColorScheme) -> GeneratedSite {
        let pages = self
            .pages
            .iter()
            .map(|(href, page)| GeneratedPage {
                href: href.clone(),
                html: render_document(&self.site, &page.category, &page.content, scheme),
                json: JsonPage {
                    content: page.content.clone(),
                },
            })
            .collect();

        GeneratedSite { pages }
    }
}

fn read_source(site_dir: &Path, source: &Path) -> Result<String> {
    let path = site_dir.join(source);
    fs::read_to_string(&path)
        .map_err(|e| Error::InvalidData(format!("Cannot read source '{}': {}", path.display(), e)))
}

fn render_articles_index(index: &ArticlesIndex, articles: &[&ArticleDef]) -> String {
    let intro = index
        .intro
        .as_deref()
        .map(|intro| format!("<p>{}</p>", html_escape(intro)))
        .unwrap_or_default();

    let items: String = articles
        .iter()
        .map(|article| {
            format!(
                r#"<li><a href="{}">{}</a></li>"#,
                html_escape(&article.href),
                html_escape(&article.title)
            )
        })
        .collect();

    render_content(Some(&index.title), &format!("{}<ul>{}</ul>", intro, items))
}

fn render_article(article: &ArticleDef, body_html: &str) -> String {
    let date = format!(
        r#"<p class="date"><time datetime="{}">{}</time></p>"#,
        article.date.format("%Y-%m-%d"),
        article.date.format("%B %-d, %Y")
    );
    render_content(Some(&article.title), &format!("{}{}", date, body_html))
}

#[cfg(test)]
mod tests {
    use super::*;
    use phebe_core::{CODE_MARKER, parse_site_toml_str};

    const SITE_TOML: &str = r##"
[site]
title = "Arend van Beelen jr."

[[menu]]
category = "me"
href = "/"
title = "Me"

[[menu]]
category = "articles"
href = "/articles"
title = "Articles"

[[page]]
category = "me"
href = "/"
title = "Arend van Beelen jr."
source = "pages/index.md"

[articles]
href = "/articles"
category = "articles"
title = "Articles"
intro = "I've listed them here for your enjoyment:"

[[article]]
href = "/2015/03/select3-v10-released.html"
title = "Selectivity v1.0 released"
source = "articles/select3.md"
date = "2015-03-01"

[[article]]
href = "/2016/09/how-i-made-text-clipper-fastest-html.html"
title = "How I made text-clipper the fastest HTML clipping library"
source = "articles/text-clipper.md"
date = "2016-09-12"

[[article]]
href = "/2030/01/future.html"
title = "Not yet"
source = "articles/future.md"
date = "2030-01-01"
"##;

    fn load() -> (tempfile::TempDir, SiteContent) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pages")).unwrap();
        fs::create_dir_all(dir.path().join("articles")).unwrap();
        fs::write(dir.path().join("pages/index.md"), "I am a software engineer.").unwrap();
        fs::write(dir.path().join("articles/select3.md"), "Released!").unwrap();
        fs::write(
            dir.path().join("articles/text-clipper.md"),
            "```js\nclip(html, 100);\n```\n",
        )
        .unwrap();

        let site = parse_site_toml_str(SITE_TOML).unwrap();
        let today = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let content = SiteContent::load(dir.path(), site, today).unwrap();
        (dir, content)
    }

    #[test]
    fn test_load_renders_published_pages() {
        let (_dir, content) = load();
        let hrefs: Vec<&str> = content.hrefs().collect();
        assert_eq!(hrefs.len(), 4);
        assert!(content.page("/2030/01/future.html").is_none());

        let home = content.page("/").unwrap();
        assert_eq!(home.category.as_str(), "me");
        assert_eq!(
            home.content,
            r#"<div class="content"><h1>Arend van Beelen jr.</h1><p>I am a software engineer.</p>
</div>"#
        );
    }

    #[test]
    fn test_articles_index_newest_first() {
        let (_dir, content) = load();
        let index = &content.page("/articles").unwrap().content;
        let newer = index.find("text-clipper").unwrap();
        let older = index.find("select3").unwrap();
        assert!(newer < older);
        assert!(index.contains("<p>I&#x27;ve listed them here for your enjoyment:</p>"));
        assert!(!index.contains("Not yet"));
    }

    #[test]
    fn test_article_pages_share_index_category() {
        let (_dir, content) = load();
        let article = content
            .page("/2016/09/how-i-made-text-clipper-fastest-html.html")
            .unwrap();
        assert_eq!(article.category.as_str(), "articles");
        assert!(article.content.contains(r#"<time datetime="2016-09-12">September 12, 2016</time>"#));
        assert!(article.content.contains(CODE_MARKER));
    }

    #[test]
    fn test_json_and_html_representations() {
        let (_dir, content) = load();
        let json = content.json_page("/").unwrap();
        assert_eq!(json.content, content.page("/").unwrap().content);

        let html = content.html_page("/", PreferredColorScheme::Light).unwrap();
        assert!(html.contains(&json.content));
        assert!(html.contains(r#"<body class="me">"#));

        assert!(content.json_page("/missing").is_none());
        assert!(content.html_page("/missing", PreferredColorScheme::Light).is_none());
    }

    #[test]
    fn test_generate_covers_every_page() {
        let (_dir, content) = load();
        let generated = content.generate(PreferredColorScheme::Unspecified);
        assert_eq!(generated.pages.len(), 4);
        assert!(generated.pages.iter().all(|p| p.html.contains(&p.json.content)));
    }

    #[test]
    fn test_missing_source_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let site = parse_site_toml_str(SITE_TOML).unwrap();
        let today = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let result = SiteContent::load(dir.path(), site, today);
        assert!(result.is_err_and(|e| e.to_string().contains("pages/index.md")));
    }
}
