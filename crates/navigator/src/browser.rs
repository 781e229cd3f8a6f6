use phebe_core::Category;
use std::rc::Rc;

/// Stable handle for one navigation link of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(pub usize);

/// A navigation (menu) link as seen at setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub id: LinkId,
    pub href: String,
    pub category: Option<Category>,
}

/// The parts of a rendered page the navigator reads and mutates
///
/// Methods take `&self`: implementations live on a single thread and use
/// interior mutability, the same way a DOM handle does.
pub trait Document {
    fn title(&self) -> String;

    fn nav_links(&self) -> Vec<NavLink>;

    fn set_link_active(&self, link: LinkId, active: bool);

    /// Top-level category, rendered as the body class
    fn body_category(&self) -> Option<Category>;

    fn set_body_category(&self, category: &Category);

    /// Swap the content region for the given markup
    fn replace_content(&self, html: &str);

    fn append_stylesheet(&self, href: &str);

    fn append_script(&self, src: &str);

    /// Highlighting engine, once its script has loaded
    fn syntax_highlighter(&self) -> Option<Rc<dyn SyntaxHighlighter>>;
}

/// Session history and location
pub trait History {
    /// Path of the current location
    fn current_path(&self) -> String;

    /// Add a history entry without loading anything
    fn push_state(&self, title: &str, path: &str);

    /// Full navigation to `path`
    fn assign(&self, path: &str);
}

/// Code highlighting engine
pub trait SyntaxHighlighter {
    /// Highlight every code block under the content region
    fn highlight_content(&self);
}
