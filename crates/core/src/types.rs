use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Class name reserved for marking the current navigation link
pub const ACTIVE_CLASS: &str = "active";

/// Marker that shows up in rendered HTML when a fenced code block asks for
/// syntax highlighting
pub const CODE_MARKER: &str = "<code class=\"language-";

/// Page classification token
///
/// Rendered as the `class` of `<body>` and of the menu link that belongs to
/// the page. Several pages may share one category (every article page is an
/// `articles` page, for instance).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Category(String);

impl Category {
    /// Create a category, validating it is usable as a single CSS class
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let mut chars = name.chars();
        let valid_start = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '-');
        if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            return Err(Error::InvalidData(format!(
                "Category '{}' is not a valid class name",
                name
            )));
        }
        if name == ACTIVE_CLASS {
            return Err(Error::InvalidData(format!(
                "Category '{}' is reserved for the active link marker",
                name
            )));
        }
        Ok(Self(name))
    }

    /// Extract the category from a class attribute such as `"articles active"`
    ///
    /// The `active` marker is ignored. Returns `None` when no usable class is
    /// left.
    pub fn from_class_list(classes: &str) -> Option<Self> {
        classes
            .split_whitespace()
            .filter(|class| *class != ACTIVE_CLASS)
            .find_map(|class| Category::new(class).ok())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::new(s)
    }
}

impl TryFrom<String> for Category {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Category::new(value)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.0
    }
}

/// JSON representation of a page, served for `Accept: application/json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPage {
    /// HTML fragment replacing the content region
    pub content: String,
}

/// Complete site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub metadata: SiteMetadata,
    pub navigator: NavigatorConfig,
    pub menu: Vec<MenuItem>,
    pub pages: Vec<PageDef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub articles_index: Option<ArticlesIndex>,
    pub articles: Vec<ArticleDef>,
    pub theme: Themes,
}

impl Site {
    /// Menu entry belonging to the given category, if any
    pub fn menu_item(&self, category: &Category) -> Option<&MenuItem> {
        self.menu.iter().find(|item| &item.category == category)
    }

    /// Every href the site serves, in declaration order
    pub fn hrefs(&self) -> Vec<&str> {
        let mut hrefs: Vec<&str> = self.pages.iter().map(|p| p.href.as_str()).collect();
        if let Some(index) = &self.articles_index {
            hrefs.push(index.href.as_str());
        }
        hrefs.extend(self.articles.iter().map(|a| a.href.as_str()));
        hrefs
    }

    /// Category a page at `href` is rendered with
    pub fn category_of(&self, href: &str) -> Option<&Category> {
        if let Some(page) = self.pages.iter().find(|p| p.href == href) {
            return Some(&page.category);
        }
        let index = self.articles_index.as_ref()?;
        if index.href == href || self.articles.iter().any(|a| a.href == href) {
            return Some(&index.category);
        }
        None
    }

    /// Source files referenced by the config, relative to the site directory
    pub fn sources(&self) -> Vec<&PathBuf> {
        self.pages
            .iter()
            .map(|p| &p.source)
            .chain(self.articles.iter().map(|a| &a.source))
            .collect()
    }
}

/// Site-wide metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
}

/// Options for the in-place navigator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorConfig {
    /// Send `Cache-Control: no-cache` with page requests
    pub no_cache: bool,
    /// Substring of page content that triggers syntax highlighting
    pub code_marker: String,
    pub highlight_stylesheet: String,
    pub highlight_script: String,
}

impl Default for NavigatorConfig {
    fn default() -> Self {
        Self {
            no_cache: true,
            code_marker: CODE_MARKER.to_string(),
            highlight_stylesheet: "/prism.css".to_string(),
            highlight_script: "/prism.js".to_string(),
        }
    }
}

/// Navigation menu link
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItem {
    pub category: Category,
    pub href: String,
    pub title: String,
}

/// Standalone page rendered from a markdown source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDef {
    pub category: Category,
    pub href: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub source: PathBuf,
}

/// Generated page listing all published articles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticlesIndex {
    pub href: String,
    pub category: Category,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intro: Option<String>,
}

/// Article rendered from a markdown source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleDef {
    pub href: String,
    pub title: String,
    pub source: PathBuf,
    pub date: NaiveDate,
}

impl ArticleDef {
    /// Articles dated in the future are not published yet
    pub fn is_published(&self, today: NaiveDate) -> bool {
        self.date <= today
    }
}

/// Light and dark color schemes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Themes {
    pub light: ColorScheme,
    pub dark: ColorScheme,
}

impl Default for Themes {
    fn default() -> Self {
        Self {
            light: ColorScheme {
                foreground: "#111".to_string(),
                background: "#fff".to_string(),
                accents: BTreeMap::new(),
            },
            dark: ColorScheme {
                foreground: "#fff".to_string(),
                background: "#191919".to_string(),
                accents: BTreeMap::new(),
            },
        }
    }
}

/// Colors of one scheme, accents keyed by category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorScheme {
    pub foreground: String,
    pub background: String,
    #[serde(default)]
    pub accents: BTreeMap<Category, String>,
}
