use phebe_core::Category;

/// Link a pointer event happened on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkTarget {
    pub href: String,
    /// Category from the link's class list, `None` for plain content links
    pub category: Option<Category>,
}

impl LinkTarget {
    /// Build a target from raw `href` and `class` attributes
    pub fn from_attributes(href: &str, class_list: &str) -> Self {
        Self {
            href: href.to_string(),
            category: Category::from_class_list(class_list),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// Pointer entered a navigation link
    LinkHover(LinkTarget),
    /// An anchor was clicked
    LinkClick(LinkTarget),
    /// Back/forward moved the current location
    PopState,
}

/// What the event source should do with its default action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Default,
    PreventDefault,
}

pub type EventHandler = Box<dyn Fn(&UiEvent) -> Disposition>;

/// Anything that can deliver UI events to registered handlers
pub trait EventSource {
    fn add_handler(&self, handler: EventHandler);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_from_attributes() {
        let target = LinkTarget::from_attributes("/articles", "articles active");
        assert_eq!(target.category, Some(Category::new("articles").unwrap()));

        let plain = LinkTarget::from_attributes("/2016/09/post.html", "");
        assert_eq!(plain.category, None);
        assert_eq!(plain.href, "/2016/09/post.html");
    }
}
