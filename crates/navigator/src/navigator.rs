use crate::browser::{Document, History, LinkId};
use crate::cache::{FetchState, PageCache, PendingPage};
use crate::events::{Disposition, EventSource, LinkTarget, UiEvent};
use crate::fetch::{FetchOptions, PageFetcher};
use futures::channel::oneshot;
use futures::task::{LocalSpawn, LocalSpawnExt};
use futures::FutureExt;
use phebe_core::{Category, JsonPage, NavigatorConfig};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};

/// How a navigation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    /// Content region replaced in place
    InPlace,
    /// Location assigned, the browser loads the page itself
    FullLoad,
    /// A later navigation started before this one finished; nothing shown
    Superseded,
}

/// Root-relative links are handled in place; everything else (other hosts,
/// protocol-relative URLs, query-only links) is left to the browser.
pub fn is_internal_href(href: &str) -> bool {
    href.starts_with('/') && !href.starts_with("//")
}

/// Owns the page cache of one browsing session and drives prefetching and
/// in-place navigation for it.
///
/// Single-threaded: every method runs on the UI thread, fetches and
/// navigations are spawned on the supplied local spawner.
pub struct Navigator {
    config: NavigatorConfig,
    options: FetchOptions,
    fetcher: Rc<dyn PageFetcher>,
    document: Rc<dyn Document>,
    history: Rc<dyn History>,
    spawner: Rc<dyn LocalSpawn>,
    cache: Rc<RefCell<PageCache>>,
    links: Vec<LinkId>,
    active_links: HashMap<Category, LinkId>,
    highlight_assets_requested: Cell<bool>,
    /// Bumped by every navigation; only the latest one may touch the page
    generation: Cell<u64>,
    running: Cell<usize>,
    idle_waiters: RefCell<Vec<oneshot::Sender<()>>>,
}

impl Navigator {
    /// Set up a navigator for the currently rendered page
    ///
    /// Resolves the category-to-link table from the document's navigation
    /// links and seeds the cache with the current page's category.
    pub fn new(
        config: NavigatorConfig,
        fetcher: Rc<dyn PageFetcher>,
        document: Rc<dyn Document>,
        history: Rc<dyn History>,
        spawner: Rc<dyn LocalSpawn>,
    ) -> Rc<Self> {
        let nav_links = document.nav_links();
        let links = nav_links.iter().map(|link| link.id).collect();

        let mut active_links = HashMap::new();
        for link in nav_links {
            if let Some(category) = link.category {
                // First link of a category wins
                active_links.entry(category).or_insert(link.id);
            }
        }

        let mut cache = PageCache::new();
        if let Some(category) = document.body_category() {
            cache.seed(&history.current_path(), category);
        }

        Rc::new(Self {
            options: FetchOptions::from(&config),
            config,
            fetcher,
            document,
            history,
            spawner,
            cache: Rc::new(RefCell::new(cache)),
            links,
            active_links,
            highlight_assets_requested: Cell::new(false),
            generation: Cell::new(0),
            running: Cell::new(0),
            idle_waiters: RefCell::new(Vec::new()),
        })
    }

    /// Register this navigator's handlers with an event source
    ///
    /// The handler only holds a weak reference; once the navigator is dropped
    /// every event falls through to its default action.
    pub fn attach(self: &Rc<Self>, source: &dyn EventSource) {
        let navigator: Weak<Self> = Rc::downgrade(self);
        source.add_handler(Box::new(move |event| match navigator.upgrade() {
            Some(navigator) => navigator.handle_event(event),
            None => Disposition::Default,
        }));
    }

    pub fn handle_event(self: &Rc<Self>, event: &UiEvent) -> Disposition {
        match event {
            UiEvent::LinkHover(target) => {
                self.on_link_hover(target);
                Disposition::Default
            }
            UiEvent::LinkClick(target) => self.on_link_click(target),
            UiEvent::PopState => {
                self.on_popstate();
                Disposition::PreventDefault
            }
        }
    }

    /// Existing fetch handle for `path`, or a freshly started fetch
    ///
    /// The handle is stored before the request settles, so a hover and a
    /// click on the same link share one request. The request is driven on
    /// the spawner and completes even if every handle is dropped; a failed
    /// request is dropped from the cache there, whether or not anybody
    /// navigates to it.
    pub fn get_or_fetch(&self, path: &str, category: Category) -> PendingPage {
        let mut cache = self.cache.borrow_mut();
        if let Some(pending) = cache.pending(path) {
            log::debug!("Reusing {:?} fetch for {}", cache.state(path), path);
            return pending;
        }

        log::debug!("Fetching {} ({})", path, category);
        let fetcher = Rc::clone(&self.fetcher);
        let options = self.options;
        let owned_path = path.to_string();
        let pending = async move { fetcher.fetch_page(&owned_path, options).await }
            .boxed_local()
            .shared();
        cache.insert_pending(path, category, pending.clone());
        drop(cache);

        let cache = Rc::clone(&self.cache);
        let handle = pending.clone();
        let owned_path = path.to_string();
        let driver = pending.clone().map(move |result| {
            if let Err(err) = result {
                log::debug!("Fetch of {} failed: {}", owned_path, err);
                cache.borrow_mut().discard_fetch(&owned_path, &handle);
            }
        });
        if let Err(err) = self.spawner.spawn_local(driver) {
            log::warn!("Could not spawn fetch for {}: {}", path, err);
        }

        pending
    }

    /// Warm the cache for a page the user is likely to open
    pub fn prefetch(&self, path: &str, category: Category) {
        let _ = self.get_or_fetch(path, category);
    }

    /// Show `path` in place, or fall back to a full page load
    ///
    /// When another navigation starts while this one waits for its page,
    /// this one leaves the document and location alone.
    pub async fn navigate(&self, path: &str, category: Category) -> NavigationOutcome {
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        self.clear_active_links();

        let pending = self.get_or_fetch(path, category.clone());
        let result = pending.clone().await;

        if generation != self.generation.get() {
            log::debug!("Navigation to {} superseded", path);
            if result.is_err() {
                self.cache.borrow_mut().discard_fetch(path, &pending);
            }
            return NavigationOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                self.show_page(&category, &page);
                NavigationOutcome::InPlace
            }
            Err(err) => {
                log::error!(
                    "Failed to load page {}; falling back to full-page load: {}",
                    path,
                    err
                );
                self.cache.borrow_mut().discard_fetch(path, &pending);
                self.history.assign(path);
                NavigationOutcome::FullLoad
            }
        }
    }

    /// Click on an anchor; returns whether the default navigation is
    /// suppressed
    pub fn on_link_click(self: &Rc<Self>, target: &LinkTarget) -> Disposition {
        if !is_internal_href(&target.href) {
            return Disposition::Default;
        }

        // Links inside the content region carry no category of their own
        let category = match target
            .category
            .clone()
            .or_else(|| self.document.body_category())
        {
            Some(category) => category,
            None => {
                log::warn!("No category for {}; leaving it to the browser", target.href);
                return Disposition::Default;
            }
        };

        self.history.push_state(&self.document.title(), &target.href);
        self.spawn_navigation(target.href.clone(), category);
        Disposition::PreventDefault
    }

    /// Back/forward: show the new current path with its recorded category
    pub fn on_popstate(self: &Rc<Self>) {
        let path = self.history.current_path();
        let category = self.cache.borrow().category(&path).cloned();
        match category {
            Some(category) => self.spawn_navigation(path, category),
            None => {
                log::warn!("No cached category for {}; reloading", path);
                self.history.assign(&path);
            }
        }
    }

    pub fn on_link_hover(&self, target: &LinkTarget) {
        if !is_internal_href(&target.href) || target.href == self.history.current_path() {
            return;
        }

        let category = target
            .category
            .clone()
            .or_else(|| self.document.body_category());
        if let Some(category) = category {
            self.prefetch(&target.href, category);
        }
    }

    /// Resolves once no spawned navigation is running
    pub fn settled(&self) -> impl Future<Output = ()> + use<> {
        let receiver = if self.running.get() == 0 {
            None
        } else {
            let (sender, receiver) = oneshot::channel();
            self.idle_waiters.borrow_mut().push(sender);
            Some(receiver)
        };

        async move {
            if let Some(receiver) = receiver {
                let _ = receiver.await;
            }
        }
    }

    pub fn cached_category(&self, path: &str) -> Option<Category> {
        self.cache.borrow().category(path).cloned()
    }

    pub fn fetch_state(&self, path: &str) -> FetchState {
        self.cache.borrow().state(path)
    }

    pub fn cached_pages(&self) -> usize {
        self.cache.borrow().len()
    }

    fn spawn_navigation(self: &Rc<Self>, path: String, category: Category) {
        let navigator = Rc::clone(self);
        self.running.set(self.running.get() + 1);

        let task = async move {
            navigator.navigate(&path, category).await;
            navigator.finish_navigation();
        };
        if let Err(err) = self.spawner.spawn_local(task) {
            log::error!("Could not spawn navigation: {}", err);
            self.finish_navigation();
        }
    }

    fn finish_navigation(&self) {
        let running = self.running.get().saturating_sub(1);
        self.running.set(running);
        if running == 0 {
            for waiter in self.idle_waiters.borrow_mut().drain(..) {
                let _ = waiter.send(());
            }
        }
    }

    fn clear_active_links(&self) {
        for link in &self.links {
            self.document.set_link_active(*link, false);
        }
    }

    fn show_page(&self, category: &Category, page: &JsonPage) {
        self.document.set_body_category(category);
        self.clear_active_links();
        match self.active_links.get(category) {
            Some(link) => self.document.set_link_active(*link, true),
            None => log::warn!("No navigation link for category {}", category),
        }
        self.document.replace_content(&page.content);

        if page.content.contains(&self.config.code_marker) {
            self.highlight_code();
        }
    }

    fn highlight_code(&self) {
        if let Some(highlighter) = self.document.syntax_highlighter() {
            highlighter.highlight_content();
        } else if !self.highlight_assets_requested.replace(true) {
            // The engine highlights on its own once the script has loaded
            self.document
                .append_stylesheet(&self.config.highlight_stylesheet);
            self.document.append_script(&self.config.highlight_script);
        }
    }
}
