//! Keyboard input handling for the TUI.
//!
//! Translates key events into application state changes. `now` is passed
//! in from the event loop so the debounce controller never reads the
//! clock itself.

use std::time::Instant;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use crate::app::{App, AppState};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent, now: Instant) -> Result<bool> {
    // Help overlay swallows everything except its close keys
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    if matches!(app.state, AppState::Searching) {
        return handle_search_input(app, key, now);
    }

    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
        }
        KeyCode::Char('/') => {
            app.state = AppState::Searching;
        }
        KeyCode::Esc => {
            app.clear_search(now);
        }
        KeyCode::Char('r') => {
            app.refresh();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_prev();
        }
        KeyCode::PageDown => {
            app.select_page_down();
        }
        KeyCode::PageUp => {
            app.select_page_up();
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.select_first();
        }
        KeyCode::End | KeyCode::Char('G') => {
            app.select_last();
        }
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent, now: Instant) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            app.clear_search(now);
        }
        KeyCode::Enter => {
            app.submit_search();
        }
        KeyCode::Backspace => {
            app.on_search_backspace(now);
        }
        KeyCode::Char(c) => {
            app.on_search_char(c, now);
        }
        _ => {}
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::SnapshotCache;
    use crate::debounce::{Debouncer, DEBOUNCE_INTERVAL};
    use crate::query::UserQuery;
    use crossterm::event::{KeyEvent, KeyModifiers};
    use std::sync::atomic::{AtomicU32, Ordering};

    static TEST_DIR_SEQ: AtomicU32 = AtomicU32::new(0);

    fn test_app() -> App {
        let dir = std::env::temp_dir().join(format!(
            "profilecache-input-test-{}-{}",
            std::process::id(),
            TEST_DIR_SEQ.fetch_add(1, Ordering::SeqCst)
        ));
        let cache = SnapshotCache::new(dir).expect("Failed to create test cache dir");
        App {
            state: AppState::Normal,
            search_query: String::new(),
            debouncer: Debouncer::new(),
            query: UserQuery::new(cache, |_term| async { Ok(Vec::new()) }),
            cached_users: Vec::new(),
            selection: 0,
            snapshot_age: None,
            status_message: None,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_slash_enters_search_mode() {
        let mut app = test_app();
        let quit = handle_input(&mut app, press(KeyCode::Char('/')), Instant::now()).unwrap();
        assert!(!quit);
        assert_eq!(app.state, AppState::Searching);
    }

    #[tokio::test]
    async fn test_typed_chars_update_raw_term_immediately() {
        let mut app = test_app();
        app.state = AppState::Searching;
        let now = Instant::now();

        handle_input(&mut app, press(KeyCode::Char('a')), now).unwrap();
        handle_input(&mut app, press(KeyCode::Char('l')), now).unwrap();
        assert_eq!(app.search_query, "al");

        // The raw term is staged for a debounced commit
        let committed = app.debouncer.poll(now + DEBOUNCE_INTERVAL);
        assert_eq!(committed, Some("al".to_string()));
    }

    #[tokio::test]
    async fn test_enter_keeps_filter_and_leaves_search() {
        let mut app = test_app();
        app.state = AppState::Searching;
        let now = Instant::now();

        handle_input(&mut app, press(KeyCode::Char('b')), now).unwrap();
        handle_input(&mut app, press(KeyCode::Enter), now).unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.search_query, "b");
    }

    #[tokio::test]
    async fn test_esc_clears_filter() {
        let mut app = test_app();
        app.state = AppState::Searching;
        let now = Instant::now();

        handle_input(&mut app, press(KeyCode::Char('b')), now).unwrap();
        handle_input(&mut app, press(KeyCode::Esc), now).unwrap();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.search_query.is_empty());
    }

    #[tokio::test]
    async fn test_q_quits_from_normal_mode() {
        let mut app = test_app();
        let quit = handle_input(&mut app, press(KeyCode::Char('q')), Instant::now()).unwrap();
        assert!(quit);
        assert_eq!(app.state, AppState::Quitting);
    }

    #[tokio::test]
    async fn test_q_is_text_while_searching() {
        let mut app = test_app();
        app.state = AppState::Searching;
        let quit = handle_input(&mut app, press(KeyCode::Char('q')), Instant::now()).unwrap();
        assert!(!quit);
        assert_eq!(app.search_query, "q");
    }
}
