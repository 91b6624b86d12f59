//! Render functions for the TUI.
//!
//! Lays out the dashboard or the standalone panel and dispatches to the pane
//! renderers.

use crate::app::{App, Focus};
use crate::session::{Phase, Surface};
use crate::util::{sanitize, single_line, truncate_to_width, wrap_to_width};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{analysis, articles, help, status, trends};

/// Minimum terminal dimensions required for normal operation.
const MIN_WIDTH: u16 = 60;
const MIN_HEIGHT: u16 = 10;

/// Height of the text box including borders.
const INPUT_HEIGHT: u16 = 5;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    match app.surface() {
        Surface::Dashboard => render_dashboard(f, app, area),
        Surface::Panel => render_panel(f, app, area),
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Header, analysis column on the left, trends and articles on the right.
fn render_dashboard(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(rows[1]);

    render_analysis_column(f, app, columns[0]);

    let lists = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(columns[1]);

    trends::render(f, app, lists[0]);
    articles::render(f, app, lists[1]);
    status::render(f, app, rows[2]);
}

/// Standalone panel: text box, result and status bar only.
fn render_panel(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(area);

    render_analysis_column(f, app, rows[0]);
    status::render(f, app, rows[1]);
}

fn render_analysis_column(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(INPUT_HEIGHT), Constraint::Min(0)])
        .split(area);

    render_input(f, app, chunks[0]);
    analysis::render(f, app, chunks[1]);
}

/// Product name, backend address and scan status on one line.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let session = &app.session;
    let mut spans = vec![
        Span::styled(
            " TrueLens ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {}", session.base_url()),
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let used = spans.iter().map(|s| s.width()).sum::<usize>() + 2;
    let room = (area.width as usize).saturating_sub(used);

    if session.scan_loading() {
        spans.push(Span::styled(
            "  Scanning...",
            Style::default().fg(Color::Yellow),
        ));
    } else if let Some(msg) = session.scan_message() {
        let msg = single_line(&sanitize(msg));
        spans.push(Span::styled(
            format!("  {}", truncate_to_width(&msg, room)),
            Style::default().fg(Color::Green),
        ));
    }

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Text box. Shows the tail of long input so the cursor stays visible.
fn render_input(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Input;
    let inner_width = area.width.saturating_sub(2) as usize;
    let inner_height = area.height.saturating_sub(2) as usize;

    let text = if is_focused {
        format!("{}_", app.input)
    } else {
        app.input.clone()
    };

    let lines: Vec<Line> = if app.input.is_empty() && !is_focused {
        vec![Line::from(Span::styled(
            "Paste a claim or article text to analyze",
            Style::default().fg(Color::DarkGray),
        ))]
    } else {
        let wrapped = wrap_to_width(&sanitize(&text), inner_width.max(1));
        let skip = wrapped.len().saturating_sub(inner_height);
        wrapped.into_iter().skip(skip).map(Line::from).collect()
    };

    let title = if app.session.phase() == Phase::Loading {
        "Text to analyze (analyzing...)"
    } else {
        "Text to analyze"
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ResponseOrder;
    use crate::keybindings::KeybindingRegistry;
    use crate::session::{AnalysisSession, SessionEvent};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn test_app(surface: Surface) -> (App, mpsc::Receiver<SessionEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let session = AnalysisSession::new(client, tx, surface, ResponseOrder::LastResolved);
        (App::new(session, KeybindingRegistry::new()), rx)
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[tokio::test]
    async fn test_too_small_message() {
        let (mut app, _rx) = test_app(Surface::Dashboard);
        let screen = draw(&mut app, 40, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_dashboard_shows_all_panes() {
        let (mut app, _rx) = test_app(Surface::Dashboard);
        let screen = draw(&mut app, 120, 30);
        assert!(screen.contains("TrueLens"));
        assert!(screen.contains("Text to analyze"));
        assert!(screen.contains("Trending narratives"));
        assert!(screen.contains("Latest articles (0)"));
    }

    #[tokio::test]
    async fn test_panel_has_no_lists() {
        let (mut app, _rx) = test_app(Surface::Panel);
        let screen = draw(&mut app, 100, 20);
        assert!(screen.contains("Analysis"));
        assert!(!screen.contains("Trending narratives"));
        assert!(!screen.contains("Latest articles"));
    }

    #[tokio::test]
    async fn test_render_records_analysis_height() {
        let (mut app, _rx) = test_app(Surface::Panel);
        draw(&mut app, 100, 20);
        // 20 rows - status bar - input box - analysis borders
        assert_eq!(app.analysis_visible_lines, 20 - 1 - INPUT_HEIGHT as usize - 2);
    }
}
