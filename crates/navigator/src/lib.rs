// In-place navigation for phebe sites: a page cache that prefetches on hover,
// swaps the content region on click and falls back to a full page load when
// anything goes wrong.

pub mod browser;
pub mod cache;
pub mod events;
pub mod fetch;
pub mod headless;
pub mod navigator;
pub mod spawn;

pub use browser::{Document, History, LinkId, NavLink, SyntaxHighlighter};
pub use cache::{FetchState, PageCache, PageEntry, PageResult, PendingPage};
pub use events::{Disposition, EventHandler, EventSource, LinkTarget, UiEvent};
pub use fetch::{FetchError, FetchOptions, HttpFetcher, PageFetcher};
pub use headless::HeadlessBrowser;
pub use navigator::{NavigationOutcome, Navigator, is_internal_href};
pub use spawn::TokioLocalSpawner;
