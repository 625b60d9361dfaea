//! Application state management for profilecache.
//!
//! The `App` struct owns the raw search term, the debounce controller, the
//! fetch orchestrator, and the small amount of UI state (mode, selection).
//! The event loop drives it through `tick()`.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::cache::SnapshotCache;
use crate::debounce::Debouncer;
use crate::models::User;
use crate::query::UserQuery;

// ============================================================================
// Constants
// ============================================================================

/// Number of items to scroll on page up/down.
/// 10 rows provides a good balance of speed without losing context.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Maximum length for the search input, in characters.
const MAX_SEARCH_LENGTH: usize = 64;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    Searching,
    ShowingHelp,
    Quitting,
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    pub state: AppState,

    /// Raw search term, shown in the search box on every keystroke. The
    /// committed (debounced) copy lives inside the query.
    pub search_query: String,
    pub debouncer: Debouncer,
    pub query: UserQuery,

    /// Users from the last stored snapshot, displayed until the first
    /// fetch for this session settles.
    pub cached_users: Vec<User>,

    /// Selection index into the visible user list
    pub selection: usize,

    /// Age of the stored snapshot, for the status bar
    pub snapshot_age: Option<String>,

    pub status_message: Option<String>,
}

impl App {
    /// Create the application, wiring the API client and snapshot cache
    /// into the fetch orchestrator and kicking off the initial fetch for
    /// the empty term.
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        let api = ApiClient::new()?;
        let cache = SnapshotCache::new(cache_dir)?;

        // Show the last snapshot immediately; the first fetch replaces it.
        let (cached_users, snapshot_age) = match cache.load() {
            Ok(Some(cached)) => {
                debug!(count = cached.data.len(), "Loaded snapshot for startup display");
                let age = cached.age_display();
                (cached.data, Some(age))
            }
            Ok(None) => (Vec::new(), None),
            Err(e) => {
                warn!(error = %e, "Ignoring corrupt snapshot");
                (Vec::new(), None)
            }
        };

        let mut query = UserQuery::new(cache, move |term| {
            let api = api.clone();
            async move { api.fetch_users(&term).await.map_err(|e| e.to_string()) }
        });
        query.refetch();

        Ok(Self {
            state: AppState::Normal,
            search_query: String::new(),
            debouncer: Debouncer::new(),
            query,
            cached_users,
            selection: 0,
            snapshot_age,
            status_message: None,
        })
    }

    // =========================================================================
    // Search Input
    // =========================================================================

    /// Raw keystroke into the search box. The display updates immediately;
    /// the commit that triggers a fetch waits for the quiet period.
    pub fn on_search_char(&mut self, c: char, now: Instant) {
        if c.is_control() || self.search_query.chars().count() >= MAX_SEARCH_LENGTH {
            return;
        }
        self.search_query.push(c);
        self.debouncer.record(self.search_query.clone(), now);
    }

    pub fn on_search_backspace(&mut self, now: Instant) {
        if self.search_query.pop().is_some() {
            self.debouncer.record(self.search_query.clone(), now);
        }
    }

    /// Leave search mode keeping the current filter.
    pub fn submit_search(&mut self) {
        self.state = AppState::Normal;
    }

    /// Leave search mode and clear the filter.
    ///
    /// The committed term may be non-empty even when the box already reads
    /// empty (backspaced to nothing, commit still pending), so the decision
    /// keys on both: only when the box and the committed term are both empty
    /// is there nothing to clear.
    pub fn clear_search(&mut self, now: Instant) {
        if self.search_query.is_empty() && self.query.term().is_empty() {
            self.debouncer.cancel();
        } else {
            self.search_query.clear();
            self.debouncer.record(String::new(), now);
        }
        self.state = AppState::Normal;
    }

    /// Manual refresh of the current committed term.
    pub fn refresh(&mut self) {
        self.query.refetch();
        self.status_message = Some("Refreshing...".to_string());
    }

    // =========================================================================
    // Event Loop Tick
    // =========================================================================

    /// One event-loop tick: settle the debouncer, then drain fetch results.
    pub fn tick(&mut self, now: Instant) {
        if let Some(term) = self.debouncer.poll(now) {
            debug!(term = %term, "Search term committed");
            self.query.set_term(term);
        }

        if self.query.poll() {
            self.selection = 0;
            self.snapshot_age = self.query.cache().age();
            self.status_message = self
                .query
                .last_cache_error()
                .map(|e| format!("Warning: snapshot not saved ({})", e));
        }
    }

    // =========================================================================
    // Data Access
    // =========================================================================

    /// Users to display: the live fetch result when one has settled,
    /// otherwise the startup snapshot.
    pub fn visible_users(&self) -> &[User] {
        self.query.state().data().unwrap_or(&self.cached_users)
    }

    /// True while a fetch is in flight and there is nothing to show yet.
    pub fn is_initial_loading(&self) -> bool {
        self.query.state().is_loading() && self.visible_users().is_empty()
    }

    /// Error message for the committed term, if its fetch failed.
    pub fn fetch_error(&self) -> Option<&str> {
        self.query.state().error()
    }

    // =========================================================================
    // Selection
    // =========================================================================

    pub fn select_next(&mut self) {
        let len = self.visible_users().len();
        if len > 0 && self.selection + 1 < len {
            self.selection += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selection = self.selection.saturating_sub(1);
    }

    pub fn select_page_down(&mut self) {
        let len = self.visible_users().len();
        if len > 0 {
            self.selection = (self.selection + PAGE_SCROLL_SIZE).min(len - 1);
        }
    }

    pub fn select_page_up(&mut self) {
        self.selection = self.selection.saturating_sub(PAGE_SCROLL_SIZE);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.visible_users().len().saturating_sub(1);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FetchState;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    static TEST_DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_cache() -> SnapshotCache {
        let dir = std::env::temp_dir().join(format!(
            "profilecache-app-test-{}-{}",
            std::process::id(),
            TEST_DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        SnapshotCache::new(dir).expect("Failed to create test cache dir")
    }

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    fn test_app(users: Vec<User>) -> App {
        let query = UserQuery::new(test_cache(), move |_term| {
            let users = users.clone();
            async move { Ok(users) }
        });
        App {
            state: AppState::Normal,
            search_query: String::new(),
            debouncer: Debouncer::new(),
            query,
            cached_users: Vec::new(),
            selection: 0,
            snapshot_age: None,
            status_message: None,
        }
    }

    #[tokio::test]
    async fn test_debounced_commit_triggers_fetch() {
        let mut app = test_app(vec![user(1, "Alice")]);
        let start = Instant::now();

        app.state = AppState::Searching;
        app.on_search_char('a', start);
        app.on_search_char('l', start + Duration::from_millis(50));

        // Before the quiet period elapses nothing is committed
        app.tick(start + Duration::from_millis(200));
        assert!(matches!(app.query.state(), FetchState::Idle));

        // After 300ms of silence the last value commits and a fetch starts
        app.tick(start + Duration::from_millis(350));
        assert_eq!(app.query.term(), "al");
        assert!(app.query.state().is_loading());

        // Drain the spawned fetch
        for _ in 0..100 {
            app.tick(Instant::now());
            if app.query.state().data().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(app.visible_users().len(), 1);
    }

    #[tokio::test]
    async fn test_selection_bounds() {
        let mut app = test_app(vec![user(1, "A"), user(2, "B"), user(3, "C")]);
        app.query.set_term("");
        for _ in 0..100 {
            app.tick(Instant::now());
            if app.query.state().data().is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        app.select_next();
        app.select_next();
        app.select_next(); // clamped at last row
        assert_eq!(app.selection, 2);

        app.select_page_down();
        assert_eq!(app.selection, 2);

        app.select_first();
        assert_eq!(app.selection, 0);
        app.select_prev();
        assert_eq!(app.selection, 0);

        app.select_last();
        assert_eq!(app.selection, 2);
    }

    #[tokio::test]
    async fn test_clear_search_commits_empty_term() {
        let mut app = test_app(vec![user(1, "Alice")]);
        let start = Instant::now();

        app.state = AppState::Searching;
        app.on_search_char('x', start);
        app.clear_search(start + Duration::from_millis(100));
        assert_eq!(app.state, AppState::Normal);
        assert!(app.search_query.is_empty());

        app.tick(start + Duration::from_millis(500));
        assert_eq!(app.query.term(), "");
        assert!(app.query.state().is_loading());
    }

    #[tokio::test]
    async fn test_esc_after_backspace_to_empty_commits_empty_term() {
        let mut app = test_app(vec![user(1, "Alice")]);
        let start = Instant::now();

        // Commit "a" so the list is filtered
        app.state = AppState::Searching;
        app.on_search_char('a', start);
        app.tick(start + Duration::from_millis(400));
        assert_eq!(app.query.term(), "a");

        // Backspace to an empty box, then Esc inside the quiet window
        app.on_search_backspace(start + Duration::from_millis(410));
        app.clear_search(start + Duration::from_millis(450));
        assert_eq!(app.state, AppState::Normal);

        // The empty term must still commit; the filter may not stay "a"
        app.tick(start + Duration::from_millis(2000));
        assert_eq!(app.query.term(), "");
        assert!(app.query.state().is_loading());
    }

    #[tokio::test]
    async fn test_control_chars_and_length_limit_rejected() {
        let mut app = test_app(Vec::new());
        let start = Instant::now();

        app.on_search_char('\n', start);
        assert!(app.search_query.is_empty());

        for _ in 0..(MAX_SEARCH_LENGTH + 10) {
            app.on_search_char('a', start);
        }
        assert_eq!(app.search_query.chars().count(), MAX_SEARCH_LENGTH);
    }

    #[tokio::test]
    async fn test_length_limit_counts_chars_not_bytes() {
        let mut app = test_app(Vec::new());
        let start = Instant::now();

        // Two bytes per char; the cap must still admit the full count
        for _ in 0..(MAX_SEARCH_LENGTH + 10) {
            app.on_search_char('é', start);
        }
        assert_eq!(app.search_query.chars().count(), MAX_SEARCH_LENGTH);
    }
}
