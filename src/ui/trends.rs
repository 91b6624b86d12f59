use crate::app::{App, Focus};
use crate::util::{sanitize, single_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Count badge for a trend; a single mention shows none.
fn count_label(count: u64) -> Option<String> {
    (count > 1).then(|| format!("x{}", count))
}

/// Render the trending-narratives panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Trends;
    let session = &app.session;
    let inner = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if session.trends().is_empty() {
        let msg = if session.trends_loading() {
            "Loading trends..."
        } else {
            "No trending narratives"
        };
        vec![ListItem::new(msg)]
    } else {
        session
            .trends()
            .iter()
            .enumerate()
            .map(|(i, trend)| {
                let style = if i == app.selected_trend && is_focused {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default()
                };
                let badge = count_label(trend.count);
                let badge_width = badge.as_ref().map_or(0, |b| b.len() + 2);
                let topic = single_line(&sanitize(&trend.topic));

                let mut spans = vec![Span::styled(
                    truncate_to_width(&topic, inner.saturating_sub(badge_width)).into_owned(),
                    style,
                )];
                if let Some(badge) = badge {
                    spans.push(Span::styled(
                        format!("  {}", badge),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                ListItem::new(Line::from(spans))
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if session.trends_loading() && !session.trends().is_empty() {
        "Trending narratives (refreshing)"
    } else {
        "Trending narratives"
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    let mut state = ListState::default().with_selected(Some(app.selected_trend));
    f.render_stateful_widget(list, area, &mut state);
}
