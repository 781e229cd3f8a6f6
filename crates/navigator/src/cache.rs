use crate::fetch::FetchError;
use futures::future::{LocalBoxFuture, Shared};
use phebe_core::{Category, JsonPage};
use std::collections::HashMap;

pub type PageResult = Result<JsonPage, FetchError>;

/// Handle on a page fetch; clones all observe the same request
pub type PendingPage = Shared<LocalBoxFuture<'static, PageResult>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    NotFetched,
    InFlight,
    Resolved,
    Failed,
}

pub struct PageEntry {
    pub category: Category,
    fetch: Option<PendingPage>,
}

impl PageEntry {
    pub fn state(&self) -> FetchState {
        match &self.fetch {
            None => FetchState::NotFetched,
            Some(pending) => match pending.peek() {
                None => FetchState::InFlight,
                Some(Ok(_)) => FetchState::Resolved,
                Some(Err(_)) => FetchState::Failed,
            },
        }
    }
}

/// Pages of the current session keyed by path
///
/// Entries are never removed. A failed fetch is discarded from its entry so
/// the next visit starts over, but the category stays known.
#[derive(Default)]
pub struct PageCache {
    entries: HashMap<String, PageEntry>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the category of an already rendered page
    pub fn seed(&mut self, path: &str, category: Category) {
        self.entries
            .entry(path.to_string())
            .or_insert(PageEntry {
                category,
                fetch: None,
            });
    }

    pub fn category(&self, path: &str) -> Option<&Category> {
        self.entries.get(path).map(|entry| &entry.category)
    }

    /// Fetch handle for `path`, if one was started
    pub fn pending(&self, path: &str) -> Option<PendingPage> {
        self.entries.get(path).and_then(|entry| entry.fetch.clone())
    }

    pub fn insert_pending(&mut self, path: &str, category: Category, pending: PendingPage) {
        self.entries.insert(
            path.to_string(),
            PageEntry {
                category,
                fetch: Some(pending),
            },
        );
    }

    /// Drop a failed fetch so the path can be fetched again
    ///
    /// Only the given handle is discarded; returns false when the entry holds
    /// a different (newer) fetch or none at all.
    pub fn discard_fetch(&mut self, path: &str, pending: &PendingPage) -> bool {
        match self.entries.get_mut(path) {
            Some(entry) if entry.fetch.as_ref().is_some_and(|f| f.ptr_eq(pending)) => {
                entry.fetch = None;
                true
            }
            _ => false,
        }
    }

    pub fn state(&self, path: &str) -> FetchState {
        self.entries
            .get(path)
            .map(PageEntry::state)
            .unwrap_or(FetchState::NotFetched)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::executor::block_on;

    fn category(name: &str) -> Category {
        Category::new(name).unwrap()
    }

    fn ready(result: PageResult) -> PendingPage {
        async move { result }.boxed_local().shared()
    }

    #[test]
    fn test_seeded_entry_has_no_fetch() {
        let mut cache = PageCache::new();
        cache.seed("/", category("me"));
        assert_eq!(cache.category("/"), Some(&category("me")));
        assert!(cache.pending("/").is_none());
        assert_eq!(cache.state("/"), FetchState::NotFetched);
        assert_eq!(cache.state("/other"), FetchState::NotFetched);
    }

    #[test]
    fn test_seed_does_not_overwrite() {
        let mut cache = PageCache::new();
        cache.insert_pending("/", category("me"), ready(Err(FetchError::Status(500))));
        cache.seed("/", category("people"));
        assert_eq!(cache.category("/"), Some(&category("me")));
        assert!(cache.pending("/").is_some());
    }

    #[test]
    fn test_state_follows_fetch() {
        let mut cache = PageCache::new();
        let ok = ready(Ok(JsonPage {
            content: "<div class=\"content\"></div>".to_string(),
        }));
        cache.insert_pending("/people", category("people"), ok.clone());
        assert_eq!(cache.state("/people"), FetchState::InFlight);

        assert!(block_on(ok).is_ok());
        assert_eq!(cache.state("/people"), FetchState::Resolved);

        let failing = ready(Err(FetchError::Transport("reset".to_string())));
        cache.insert_pending("/missing", category("people"), failing.clone());
        assert!(block_on(failing).is_err());
        assert_eq!(cache.state("/missing"), FetchState::Failed);
    }

    #[test]
    fn test_discard_fetch_only_matches_same_handle() {
        let mut cache = PageCache::new();
        let first = ready(Err(FetchError::Status(502)));
        let second = ready(Err(FetchError::Status(502)));
        cache.insert_pending("/missing", category("me"), second.clone());

        assert!(!cache.discard_fetch("/missing", &first));
        assert!(cache.pending("/missing").is_some());

        assert!(cache.discard_fetch("/missing", &second));
        assert!(cache.pending("/missing").is_none());
        assert_eq!(cache.category("/missing"), Some(&category("me")));
        assert!(!cache.discard_fetch("/unknown", &second));
        assert_eq!(cache.len(), 1);
    }
}
