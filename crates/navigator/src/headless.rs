use crate::browser::{Document, History, LinkId, NavLink, SyntaxHighlighter};
use crate::events::{Disposition, EventHandler, EventSource, LinkTarget, UiEvent};
use phebe_core::Category;
use std::cell::RefCell;
use std::rc::Rc;

struct Link {
    href: String,
    category: Option<Category>,
    active: bool,
}

struct HistoryEntry {
    title: String,
    path: String,
}

struct State {
    links: Vec<Link>,
    body_category: Option<Category>,
    content: String,
    entries: Vec<HistoryEntry>,
    index: usize,
    location: String,
    full_loads: Vec<String>,
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

/// In-memory page with a menu, a content region and session history
///
/// Stands in for a real browser: `hover`, `click`, `back` and `forward`
/// dispatch the same events a DOM would, and every mutation the navigator
/// makes can be inspected afterwards. Full navigations are recorded rather
/// than performed.
pub struct HeadlessBrowser {
    state: RefCell<State>,
    handlers: RefCell<Vec<EventHandler>>,
    highlighter: RefCell<Option<Rc<dyn SyntaxHighlighter>>>,
}

impl HeadlessBrowser {
    /// Page at `location` with the given menu links (`href`, category)
    pub fn new(
        location: &str,
        title: &str,
        body_category: Option<Category>,
        links: Vec<(String, Option<Category>)>,
        content: &str,
    ) -> Self {
        let links = links
            .into_iter()
            .map(|(href, category)| Link {
                active: category.is_some() && category == body_category,
                href,
                category,
            })
            .collect();

        Self {
            state: RefCell::new(State {
                links,
                body_category,
                content: content.to_string(),
                entries: vec![HistoryEntry {
                    title: title.to_string(),
                    path: location.to_string(),
                }],
                index: 0,
                location: location.to_string(),
                full_loads: Vec::new(),
                stylesheets: Vec::new(),
                scripts: Vec::new(),
            }),
            handlers: RefCell::new(Vec::new()),
            highlighter: RefCell::new(None),
        }
    }

    /// Pointer enters the menu link for `href`
    pub fn hover(&self, href: &str) -> Disposition {
        let target = self.target_for(href);
        self.dispatch(&UiEvent::LinkHover(target))
    }

    /// Click on a link to `href`; menu links carry their category, any other
    /// href is treated as a plain content link
    pub fn click(&self, href: &str) -> Disposition {
        let target = self.target_for(href);
        let disposition = self.dispatch(&UiEvent::LinkClick(target));
        if disposition == Disposition::Default {
            self.assign(href);
        }
        disposition
    }

    /// Go back one history entry; false when already at the start
    pub fn back(&self) -> bool {
        self.traverse(-1)
    }

    pub fn forward(&self) -> bool {
        self.traverse(1)
    }

    /// Simulate the highlighting script having loaded
    pub fn install_highlighter(&self, highlighter: Rc<dyn SyntaxHighlighter>) {
        *self.highlighter.borrow_mut() = Some(highlighter);
    }

    pub fn location(&self) -> String {
        self.state.borrow().location.clone()
    }

    pub fn content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// Hrefs of menu links currently marked active
    pub fn active_links(&self) -> Vec<String> {
        self.state
            .borrow()
            .links
            .iter()
            .filter(|link| link.active)
            .map(|link| link.href.clone())
            .collect()
    }

    /// Paths the browser was sent to with a full page load
    pub fn full_loads(&self) -> Vec<String> {
        self.state.borrow().full_loads.clone()
    }

    pub fn history_len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn stylesheets(&self) -> Vec<String> {
        self.state.borrow().stylesheets.clone()
    }

    pub fn scripts(&self) -> Vec<String> {
        self.state.borrow().scripts.clone()
    }

    fn target_for(&self, href: &str) -> LinkTarget {
        let category = self
            .state
            .borrow()
            .links
            .iter()
            .find(|link| link.href == href)
            .and_then(|link| link.category.clone());
        LinkTarget {
            href: href.to_string(),
            category,
        }
    }

    fn traverse(&self, delta: isize) -> bool {
        {
            let mut state = self.state.borrow_mut();
            let Some(index) = state.index.checked_add_signed(delta) else {
                return false;
            };
            if index >= state.entries.len() {
                return false;
            }
            state.index = index;
            state.location = state.entries[index].path.clone();
        }
        self.dispatch(&UiEvent::PopState);
        true
    }

    fn dispatch(&self, event: &UiEvent) -> Disposition {
        let mut disposition = Disposition::Default;
        for handler in self.handlers.borrow().iter() {
            if handler(event) == Disposition::PreventDefault {
                disposition = Disposition::PreventDefault;
            }
        }
        disposition
    }
}

impl Document for HeadlessBrowser {
    fn title(&self) -> String {
        let state = self.state.borrow();
        state.entries[state.index].title.clone()
    }

    fn nav_links(&self) -> Vec<NavLink> {
        self.state
            .borrow()
            .links
            .iter()
            .enumerate()
            .map(|(i, link)| NavLink {
                id: LinkId(i),
                href: link.href.clone(),
                category: link.category.clone(),
            })
            .collect()
    }

    fn set_link_active(&self, link: LinkId, active: bool) {
        if let Some(link) = self.state.borrow_mut().links.get_mut(link.0) {
            link.active = active;
        }
    }

    fn body_category(&self) -> Option<Category> {
        self.state.borrow().body_category.clone()
    }

    fn set_body_category(&self, category: &Category) {
        self.state.borrow_mut().body_category = Some(category.clone());
    }

    fn replace_content(&self, html: &str) {
        self.state.borrow_mut().content = html.to_string();
    }

    fn append_stylesheet(&self, href: &str) {
        self.state.borrow_mut().stylesheets.push(href.to_string());
    }

    fn append_script(&self, src: &str) {
        self.state.borrow_mut().scripts.push(src.to_string());
    }

    fn syntax_highlighter(&self) -> Option<Rc<dyn SyntaxHighlighter>> {
        self.highlighter.borrow().clone()
    }
}

impl History for HeadlessBrowser {
    fn current_path(&self) -> String {
        self.location()
    }

    fn push_state(&self, title: &str, path: &str) {
        let mut state = self.state.borrow_mut();
        let next = state.index + 1;
        state.entries.truncate(next);
        state.entries.push(HistoryEntry {
            title: title.to_string(),
            path: path.to_string(),
        });
        state.index = next;
        state.location = path.to_string();
    }

    fn assign(&self, path: &str) {
        let mut state = self.state.borrow_mut();
        state.location = path.to_string();
        state.full_loads.push(path.to_string());
    }
}

impl EventSource for HeadlessBrowser {
    fn add_handler(&self, handler: EventHandler) {
        self.handlers.borrow_mut().push(handler);
    }
}
