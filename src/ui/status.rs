use crate::app::{App, Focus};
use crate::keybindings::{Action, Context};
use crate::session::Surface;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Actions advertised in the status bar for each focused pane.
fn hint_actions(focus: Focus, surface: Surface) -> &'static [Action] {
    match (focus, surface) {
        (Focus::Input, _) => &[Action::Select, Action::Back, Action::CycleFocus, Action::Quit],
        (Focus::Analysis, Surface::Panel) => &[
            Action::EditInput,
            Action::ScrollDown,
            Action::PageDown,
            Action::ToggleRawJson,
            Action::ShowHelp,
            Action::Quit,
        ],
        (Focus::Analysis, Surface::Dashboard) => &[
            Action::EditInput,
            Action::ScrollDown,
            Action::ToggleRawJson,
            Action::TriggerScan,
            Action::CycleFocus,
            Action::ShowHelp,
            Action::Quit,
        ],
        (Focus::Trends, _) => &[
            Action::Select,
            Action::RefreshTrends,
            Action::TriggerScan,
            Action::CycleFocus,
            Action::ShowHelp,
            Action::Quit,
        ],
        (Focus::Articles, _) => &[
            Action::Select,
            Action::OpenInBrowser,
            Action::TriggerScan,
            Action::CycleFocus,
            Action::ShowHelp,
            Action::Quit,
        ],
    }
}

fn hint_label(action: Action) -> &'static str {
    match action {
        Action::Select => "analyze",
        Action::Back => "done",
        Action::CycleFocus => "switch",
        Action::Quit => "quit",
        Action::EditInput => "edit",
        Action::ScrollDown => "scroll",
        Action::PageDown => "page",
        Action::ToggleRawJson => "raw",
        Action::TriggerScan => "scan",
        Action::RefreshTrends => "refresh",
        Action::OpenInBrowser => "open",
        Action::ShowHelp => "help",
        _ => "",
    }
}

/// Key hints for the focused pane, built from the live bindings.
pub(super) fn key_hints(app: &App) -> String {
    let context: Context = app.context();
    hint_actions(app.focus, app.surface())
        .iter()
        .filter_map(|action| {
            app.keybindings
                .key_hint(*action, context)
                .map(|key| format!("[{}]{}", key, hint_label(*action)))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else {
        Cow::Owned(key_hints(app))
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
