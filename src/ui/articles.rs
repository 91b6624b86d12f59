use crate::app::{App, Focus};
use crate::keybindings::{Action, Context};
use crate::util::{sanitize, single_line, truncate_to_width};
use chrono::{DateTime, NaiveDateTime, Utc};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Parse a backend timestamp. Naive timestamps are taken as UTC.
fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a publication timestamp relative to `now`.
pub fn format_relative_time(published: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(ts) = published.and_then(parse_published) else {
        return String::new();
    };

    let diff = (now - ts).num_seconds();

    // Clock skew between backend and client
    if diff < 0 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    ts.format("%b %d").to_string()
}

/// Render the latest-articles panel.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let is_focused = app.focus == Focus::Articles;
    let session = &app.session;
    let now = Utc::now();
    let inner = area.width.saturating_sub(4) as usize;

    let items: Vec<ListItem> = if session.articles().is_empty() {
        let msg = if session.articles_loading() {
            "Loading articles...".to_string()
        } else {
            match app.keybindings.key_hint(Action::TriggerScan, Context::Articles) {
                Some(key) => format!("No articles yet. Press {} to scan.", key),
                None => "No articles yet.".to_string(),
            }
        };
        vec![ListItem::new(msg)]
    } else {
        session
            .articles()
            .iter()
            .enumerate()
            .map(|(i, article)| {
                let analyzing = session.analyzing_article_id() == Some(article.id);
                let time_str = format_relative_time(article.published_at.as_deref(), now);

                let title_style = if i == app.selected_article && is_focused {
                    Style::default().bg(Color::DarkGray).fg(Color::White)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };

                let suffix_width = time_str.len() + if analyzing { 15 } else { 0 } + 2;
                let title = single_line(&sanitize(&article.display_title()));
                let mut spans = vec![Span::styled(
                    truncate_to_width(&title, inner.saturating_sub(suffix_width)).into_owned(),
                    title_style,
                )];
                if !time_str.is_empty() {
                    spans.push(Span::styled(
                        format!("  {}", time_str),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                if analyzing {
                    spans.push(Span::styled(
                        "  Analyzing...",
                        Style::default().fg(Color::Yellow),
                    ));
                }

                let mut lines = vec![Line::from(spans)];
                if let Some(preview) = article.preview() {
                    let preview = single_line(&sanitize(preview));
                    lines.push(Line::from(Span::styled(
                        format!("  {}", truncate_to_width(&preview, inner.saturating_sub(2))),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect()
    };

    let border_style = if is_focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!("Latest articles ({})", session.articles().len())),
    );

    let mut state = ListState::default().with_selected(Some(app.selected_article));
    f.render_stateful_widget(list, area, &mut state);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_time_buckets() {
        assert_eq!(format_relative_time(Some("2024-05-10T11:30:00Z"), now()), "30m");
        assert_eq!(format_relative_time(Some("2024-05-10T07:00:00+00:00"), now()), "5h");
        assert_eq!(format_relative_time(Some("2024-05-08T12:00:00Z"), now()), "2d");
        assert_eq!(format_relative_time(Some("2024-04-01T12:00:00Z"), now()), "Apr 01");
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        assert_eq!(
            format_relative_time(Some("2024-05-10T10:00:00.000000"), now()),
            "2h"
        );
        assert_eq!(format_relative_time(Some("2024-05-10 11:00:00"), now()), "1h");
    }

    #[test]
    fn test_future_and_missing() {
        assert_eq!(format_relative_time(Some("2024-05-11T00:00:00Z"), now()), "now");
        assert_eq!(format_relative_time(None, now()), "");
        assert_eq!(format_relative_time(Some("yesterday"), now()), "");
    }
}
