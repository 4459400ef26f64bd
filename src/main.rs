//! Coinwatch - A terminal dashboard for cryptocurrency prices.

mod api;
mod app;
mod cli;
mod config;
mod models;
mod session;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use cli::Args;
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use session::SessionStore;
use std::io;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse_args();

    // Load configuration
    let config = if let Some(ref path) = args.config {
        Config::load(path)?
    } else {
        Config::load_or_default()
    };

    // Create application state
    let mut app = App::new(&args, &config, SessionStore::at_default_location())?;

    // The API refuses everything without a key, so fail up front
    if !app.has_api_key() {
        eprintln!("Error: No API key configured.");
        eprintln!("Provide one via -k, the COINWATCH_API_KEY env var, or the config file.");
        eprintln!();
        eprintln!("Config file location: {:?}", Config::default_config_path());
        eprintln!();
        eprintln!("Sample config:");
        eprintln!("{}", config::sample_config());
        std::process::exit(1);
    }

    // Run in batch mode or interactive mode
    if app.batch_mode {
        run_batch(&mut app).await
    } else {
        run_interactive(&mut app).await
    }
}

/// Run in batch mode (non-interactive, print-and-sleep).
async fn run_batch(app: &mut App) -> Result<()> {
    loop {
        app.refresh_now().await;
        ui::render_batch(app);

        if app.should_quit() {
            break;
        }

        tokio::time::sleep(app.refresh_interval).await;
    }

    app.save_session();
    Ok(())
}

/// Run in interactive mode with TUI.
async fn run_interactive(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // A restored session may start mid-search; kick that search off again.
    // The first tick dispatches the initial full fetch either way.
    if app.state.is_searching() {
        let term = app.state.search_term.trim().to_string();
        app.dispatch_search(&term);
    }

    // Main loop
    let result = run_app(&mut terminal, app).await;

    // Persist theme, history and the current lists for the next run
    app.save_session();

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Main application loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let tick_rate = Duration::from_millis(100);

    loop {
        // Draw UI
        terminal.draw(|f| ui::render(f, app))?;

        // Handle events with timeout
        if crossterm::event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key.code, key.modifiers);
            }
        }

        // Drive timers and apply settled results
        app.tick();

        // Check if we should quit
        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input. Plain characters go to the search box; commands
/// ride on Ctrl so they cannot collide with a coin name.
fn handle_key_event(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if modifiers.contains(KeyModifiers::CONTROL) {
        match code {
            KeyCode::Char('c') | KeyCode::Char('q') => app.quit(),
            KeyCode::Char('r') => app.manual_refresh(),
            KeyCode::Char('t') => app.toggle_dark_mode(),
            _ => {}
        }
        return;
    }

    // Any key dismisses the error popup first
    if app.state.error.is_some() {
        app.state.error = None;
        return;
    }

    match code {
        KeyCode::Esc => app.clear_search(),
        KeyCode::Enter => app.commit_input(),
        KeyCode::Backspace => app.input_backspace(),
        KeyCode::Up => app.history_up(),
        KeyCode::Down => app.history_down(),
        KeyCode::Char(c) => app.input_char(c),
        _ => {}
    }
}
