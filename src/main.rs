//! profilecache - a terminal viewer for a remote user directory.
//!
//! Fetches the user list from a fixed HTTP endpoint, filters it by a
//! debounced search term, snapshots the last successful result to disk,
//! and renders it all in a small ratatui screen.

mod api;
mod app;
mod cache;
mod debounce;
mod models;
mod query;
mod ui;
mod utils;

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use cache::SnapshotCache;
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds). Also bounds the
/// granularity of debounce-deadline checks while the keyboard is idle.
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name, written next to the cached snapshot
const LOG_FILE: &str = "profilecache.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file in the cache directory rather than stderr so they do
/// not corrupt the alternate screen. Use RUST_LOG to control the level.
fn init_tracing(log_dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cache_dir = SnapshotCache::default_dir()?;
    std::fs::create_dir_all(&cache_dir).context("Failed to create cache directory")?;
    let _log_guard = init_tracing(&cache_dir);
    info!("profilecache starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app; this also kicks off the initial fetch
    let mut app = App::new(cache_dir)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("profilecache shutting down");
    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| render(f, app))?;

        // Poll with timeout so debounce deadlines and fetch results are
        // still serviced while the keyboard is idle
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                if handle_input(app, key, Instant::now())? {
                    return Ok(());
                }
            }
        }

        app.tick(Instant::now());

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
