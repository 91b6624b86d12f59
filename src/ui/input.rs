//! Input handling for the TUI.
//!
//! Keys are resolved through the keybinding registry for the focused pane and
//! turned into App/session intents. In the text box, keys with no binding are
//! typed.

use crate::app::{App, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::session::Surface;
use crate::util::validate_url_for_open;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};

use super::Action;

/// Maximum length of the text box, in characters.
const MAX_INPUT_CHARS: usize = 20_000;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Result<Action> {
    if app.show_help {
        return Ok(handle_help_input(app, code, modifiers));
    }

    let context = app.context();
    let action = app.keybindings.action_for_key(code, modifiers, context);

    if context == KbContext::Input && action.is_none() {
        handle_text_entry(app, code, modifiers);
        return Ok(Action::Continue);
    }

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::Back) => match app.focus {
            Focus::Input => app.focus = Focus::Analysis,
            _ if app.show_raw_json => app.show_raw_json = false,
            _ => {}
        },
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::Select) => handle_select(app),
        Some(KbAction::EditInput) => app.focus = Focus::Input,
        Some(KbAction::RefreshTrends) => {
            if app.surface() == Surface::Dashboard {
                app.session.refresh_trends();
                app.set_status("Refreshing trends...");
            }
        }
        Some(KbAction::TriggerScan) => {
            if app.surface() == Surface::Dashboard {
                if app.session.scan_loading() {
                    app.set_status("Scan already running");
                } else {
                    app.session.trigger_scan();
                }
            }
        }
        Some(KbAction::ToggleRawJson) => {
            app.show_raw_json = !app.show_raw_json;
            app.scroll_down(0);
        }
        Some(KbAction::OpenInBrowser) => open_selected_article(app),
        Some(KbAction::ScrollDown) => app.scroll_down(1),
        Some(KbAction::ScrollUp) => app.scroll_up(1),
        Some(KbAction::PageDown) => {
            let page = app.page_size();
            app.scroll_down(page);
        }
        Some(KbAction::PageUp) => {
            let page = app.page_size();
            app.scroll_up(page);
        }
        Some(KbAction::ShowHelp) => app.show_help = true,
        None => {}
    }

    Ok(Action::Continue)
}

/// Help overlay captures every key; j/k scroll, Esc, q or ? close it.
fn handle_help_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> Action {
    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => app.help_scroll = app.help_scroll.saturating_add(1),
        KeyCode::Char('k') | KeyCode::Up => app.help_scroll = app.help_scroll.saturating_sub(1),
        _ => {}
    }
    Action::Continue
}

fn handle_select(app: &mut App) {
    let started = match app.focus {
        Focus::Input => app.submit_input(),
        Focus::Trends => app.analyze_selected_trend(),
        Focus::Articles => app.analyze_selected_article(),
        Focus::Analysis => return,
    };

    if !started && app.session.is_analyzing() {
        app.set_status("Analysis already in progress");
    }
}

/// Edit the text box with an unbound key.
fn handle_text_entry(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match code {
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            if app.input.chars().count() < MAX_INPUT_CHARS {
                app.input.push(c);
            } else {
                app.set_status(format!("Input limited to {} characters", MAX_INPUT_CHARS));
            }
        }
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => app.input.clear(),
        KeyCode::Char('w') if modifiers.contains(KeyModifiers::CONTROL) => {
            let trimmed = app.input.trim_end().len();
            app.input.truncate(trimmed);
            let cut = app.input.rfind(char::is_whitespace).map_or(0, |i| i + 1);
            app.input.truncate(cut);
        }
        KeyCode::Backspace => {
            app.input.pop();
        }
        _ => {}
    }
}

fn open_selected_article(app: &mut App) {
    let Some(article) = app.selected_article() else {
        return;
    };
    let Some(url) = article.url.clone().filter(|u| !u.trim().is_empty()) else {
        app.set_status("Article has no URL");
        return;
    };

    // Only http(s) links reach the system opener.
    match validate_url_for_open(&url) {
        Err(e) => app.set_status(e.to_string()),
        Ok(valid) => match open::that(valid.as_str()) {
            Ok(()) => app.set_status("Opening in browser..."),
            Err(e) => {
                tracing::warn!(url = %valid, error = %e, "Failed to open browser");
                app.set_status(format!("Failed to open browser: {}", e));
            }
        },
    }
}
