//! Main event loop for the TUI.
//!
//! Multiplexes terminal input, background task completions, a periodic tick
//! and shutdown signals. All state changes happen here, one event at a time.

use crate::app::App;
use crate::session::SessionEvent;
use anyhow::{Context, Result};
use crossterm::{
    event::Event,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

use super::events::handle_session_event;
use super::input::handle_input;
use super::render::render;

/// Period of the housekeeping tick (spinner, status expiry).
const TICK: Duration = Duration::from_millis(250);

/// Number of frames in the loading spinner animation.
const SPINNER_FRAMES: usize = 10;

/// Result of handling a key press event.
///
/// Returned by input handlers to signal whether the application should
/// continue running or terminate gracefully.
pub enum Action {
    /// Continue the event loop and process more events.
    Continue,
    /// Exit the application and restore the terminal.
    Quit,
}

/// Runs the TUI event loop until the user quits or a signal arrives.
///
/// Uses `tokio::select!` over:
/// - **Signals**: SIGTERM and SIGINT end the loop
/// - **Terminal input**: key presses from crossterm's async event stream
/// - **Session events**: completions of backend calls spawned by the session
/// - **Periodic tick**: spinner animation and status expiry
///
/// A panic hook restores the terminal before unwinding so a crash never
/// leaves the shell in raw mode.
pub async fn run(app: &mut App, mut event_rx: mpsc::Receiver<SessionEvent>) -> Result<()> {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));

    let mut terminal = setup_terminal().context("Failed to set up terminal")?;
    let mut event_stream = crossterm::event::EventStream::new();
    let mut tick_interval = tokio::time::interval(TICK);

    #[cfg(unix)]
    let mut sigterm = signal(SignalKind::terminate())?;
    #[cfg(unix)]
    let mut sigint = signal(SignalKind::interrupt())?;

    tracing::info!(
        surface = ?app.surface(),
        response_order = ?app.session.response_order(),
        "TUI started"
    );

    let result = loop {
        if app.needs_redraw {
            if let Err(e) = terminal.draw(|f| render(f, app)) {
                break Err(e).context("Failed to draw frame");
            }
            app.needs_redraw = false;
        }

        if app.clear_expired_status() {
            app.needs_redraw = true;
        }

        // Apply everything already queued before waiting on input again
        while let Ok(event) = event_rx.try_recv() {
            app.needs_redraw = true;
            handle_session_event(app, event);
        }

        #[cfg(unix)]
        let sigterm_fut = sigterm.recv();
        #[cfg(not(unix))]
        let sigterm_fut = std::future::pending::<Option<()>>();

        #[cfg(unix)]
        let sigint_fut = sigint.recv();
        #[cfg(not(unix))]
        let sigint_fut = std::future::pending::<Option<()>>();

        tokio::select! {
            biased;

            _ = sigterm_fut => {
                tracing::info!("Received SIGTERM, shutting down gracefully");
                break Ok(());
            }

            _ = sigint_fut => {
                tracing::info!("Received SIGINT, shutting down gracefully");
                break Ok(());
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key))) => {
                        app.needs_redraw = true;
                        match handle_input(app, key.code, key.modifiers) {
                            Ok(Action::Quit) => break Ok(()),
                            Ok(Action::Continue) => {}
                            Err(e) => app.set_status(format!("Error: {}", e)),
                        }
                    }
                    Some(Ok(Event::Resize(..))) => app.needs_redraw = true,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!(error = %e, "Terminal event stream failed");
                        break Err(e).context("Failed to read terminal events");
                    }
                    None => break Ok(()),
                }
            }

            Some(event) = event_rx.recv() => {
                app.needs_redraw = true;
                handle_session_event(app, event);
            }

            _ = tick_interval.tick() => {
                handle_tick(app);
            }
        }
    };

    restore_terminal(terminal)?;
    tracing::info!("TUI stopped");
    result
}

/// Advance the spinner while anything is in flight.
fn handle_tick(app: &mut App) {
    let session = &app.session;
    if session.is_analyzing() || session.scan_loading() || session.trends_loading() {
        app.spinner_frame = (app.spinner_frame + 1) % SPINNER_FRAMES;
        app.needs_redraw = true;
    }
}

/// Set up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore terminal to normal state.
fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
