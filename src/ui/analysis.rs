//! Analysis pane: loading state, error, parsed report and claim list.
//!
//! Everything here except `render` is a pure function from session state to
//! pre-wrapped lines, so the pane's line count is known before drawing and
//! scrolling can be clamped exactly.

use crate::api::{AnalysisResult, AnalysisSource, Claim, Evidence};
use crate::app::{App, Focus};
use crate::report::{parse_report, ParsedReport};
use crate::session::{AnalysisSession, Phase};
use crate::util::{sanitize, wrap_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Indent applied to every field inside a claim entry.
const CLAIM_INDENT: &str = "   ";
const EVIDENCE_INDENT: &str = "     ";
const EVIDENCE_BODY_INDENT: &str = "       ";

const FLUSH: (&str, &str) = ("", "");
const INDENTED: (&str, &str) = (CLAIM_INDENT, CLAIM_INDENT);

/// Render the analysis pane, updating the app's scroll bookkeeping.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let lines = analysis_lines(
        &app.session,
        app.show_raw_json,
        app.spinner_frame,
        inner_width,
    );

    app.analysis_visible_lines = area.height.saturating_sub(2) as usize;
    app.analysis_content_lines = lines.len();
    app.scroll_down(0);

    let border_style = if app.focus == Focus::Analysis {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = match app.session.active_source() {
        Some(source) => format!("Analysis - {}", source_title(source)),
        None => "Analysis".to_string(),
    };

    let paragraph = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style)
                .title(title),
        )
        .scroll((app.analysis_scroll.min(u16::MAX as usize) as u16, 0));

    f.render_widget(paragraph, area);
}

fn source_title(source: &AnalysisSource) -> String {
    match source {
        AnalysisSource::Text { label } => sanitize(label).into_owned(),
        AnalysisSource::Article { label } => format!("article: {}", sanitize(label)),
    }
}

/// All lines of the analysis pane, wrapped to `width`.
pub(super) fn analysis_lines(
    session: &AnalysisSession,
    show_raw_json: bool,
    spinner_frame: usize,
    width: usize,
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let spinner = SPINNER[spinner_frame % SPINNER.len()];

    if session.phase() == Phase::Loading {
        lines.push(Line::from(Span::styled(
            format!("{} Analyzing...", spinner),
            Style::default().fg(Color::Yellow),
        )));
    }
    if session.analyzing_article_id().is_some() {
        lines.push(Line::from(Span::styled(
            format!("{} Analyzing article...", spinner),
            Style::default().fg(Color::Yellow),
        )));
    }

    if let Some(error) = session.last_error() {
        push_wrapped(
            &mut lines,
            &format!("Error: {}", error),
            FLUSH,
            Style::default().fg(Color::Red),
            width,
        );
    }

    let Some(result) = session.active_result() else {
        if lines.is_empty() {
            lines.push(Line::from(Span::styled(
                "Enter text to analyze, or pick a trend or article.",
                Style::default().fg(Color::DarkGray),
            )));
        }
        return lines;
    };

    if !lines.is_empty() {
        lines.push(Line::from(""));
    }
    lines.extend(result_lines(result, width));

    if show_raw_json {
        lines.push(Line::from(""));
        lines.extend(raw_json_lines(result, width));
    }

    lines
}

/// Report (or its placeholder) followed by the claim list.
pub(super) fn result_lines(result: &AnalysisResult, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let report = parse_report(&sanitize(&result.report));

    if report.is_empty() {
        push_wrapped(
            &mut lines,
            &format!(
                "Analysis completed (status: {}). No long-form report was returned by the backend.",
                sanitize(&result.status)
            ),
            FLUSH,
            Style::default().fg(Color::Gray),
            width,
        );
    } else {
        lines.extend(report_lines(&report, width));
    }

    if !result.verification_results.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("Detected claims ({})", result.verification_results.len()),
            Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        )));
        for (i, claim) in result.verification_results.iter().enumerate() {
            lines.push(Line::from(""));
            lines.extend(claim_lines(i + 1, claim, width));
        }
    }

    lines
}

/// `result_lines` without styling, for printing outside the TUI.
pub fn plain_result_lines(result: &AnalysisResult, width: usize) -> Vec<String> {
    result_lines(result, width)
        .into_iter()
        .map(|line| line.spans.iter().map(|span| span.content.as_ref()).collect())
        .collect()
}

/// Heading in bold, then paragraphs separated by one blank line.
pub(super) fn report_lines(report: &ParsedReport, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    if let Some(heading) = &report.heading {
        push_wrapped(
            &mut lines,
            heading,
            FLUSH,
            Style::default().add_modifier(Modifier::BOLD),
            width,
        );
    }

    for (i, paragraph) in report.paragraphs.iter().enumerate() {
        if i > 0 || report.heading.is_some() {
            lines.push(Line::from(""));
        }
        push_wrapped(&mut lines, paragraph, FLUSH, Style::default(), width);
    }

    lines
}

/// One claim entry. Each field emits nothing when absent or blank.
pub(super) fn claim_lines(number: usize, claim: &Claim, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    match present(&claim.claim) {
        Some(text) => push_wrapped(
            &mut lines,
            &format!("{}. Claim: {}", number, text),
            ("", CLAIM_INDENT),
            Style::default().add_modifier(Modifier::BOLD),
            width,
        ),
        None => lines.push(Line::from(Span::styled(
            format!("{}.", number),
            Style::default().add_modifier(Modifier::BOLD),
        ))),
    }

    if let Some(status) = present(&claim.status) {
        lines.push(Line::from(vec![
            Span::raw(CLAIM_INDENT),
            Span::styled("Status: ", Style::default().fg(Color::Gray)),
            Span::styled(status.clone(), status_style(&status)),
        ]));
    }

    if let Some(explanation) = present(&claim.explanation) {
        push_wrapped(&mut lines, &explanation, INDENTED, Style::default(), width);
    }

    if let Some(correction) = present(&claim.correction) {
        push_wrapped(
            &mut lines,
            &format!("Correction: {}", correction),
            INDENTED,
            Style::default().fg(Color::Green),
            width,
        );
    }

    if !claim.evidence.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("{}Evidence:", CLAIM_INDENT),
            Style::default().fg(Color::Gray),
        )));
        for evidence in &claim.evidence {
            lines.extend(evidence_lines(evidence, width));
        }
    }

    lines
}

/// A single evidence entry: source/title line, snippet, url.
pub(super) fn evidence_lines(evidence: &Evidence, width: usize) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let heading = match (present(&evidence.source), present(&evidence.title)) {
        (Some(source), Some(title)) => Some(format!("{}: {}", source, title)),
        (Some(one), None) | (None, Some(one)) => Some(one),
        (None, None) => None,
    };
    let marker = match evidence.trusted {
        Some(true) => " [trusted]",
        Some(false) => " [untrusted]",
        None => "",
    };
    if heading.is_some() || !marker.is_empty() {
        let text = format!("- {}{}", heading.unwrap_or_default(), marker);
        push_wrapped(
            &mut lines,
            &text,
            (EVIDENCE_INDENT, EVIDENCE_BODY_INDENT),
            Style::default(),
            width,
        );
    }

    if let Some(snippet) = present(&evidence.snippet) {
        push_wrapped(
            &mut lines,
            &format!("\"{}\"", snippet),
            (EVIDENCE_BODY_INDENT, EVIDENCE_BODY_INDENT),
            Style::default().fg(Color::Gray),
            width,
        );
    }

    if let Some(url) = present(&evidence.url) {
        push_wrapped(
            &mut lines,
            &url,
            (EVIDENCE_BODY_INDENT, EVIDENCE_BODY_INDENT),
            Style::default().fg(Color::Blue),
            width,
        );
    }

    lines
}

/// Pretty-printed JSON of the active result.
fn raw_json_lines(result: &AnalysisResult, width: usize) -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::from(Span::styled(
        "Raw response",
        style.add_modifier(Modifier::BOLD),
    ))];
    match serde_json::to_string_pretty(result) {
        Ok(json) => {
            for line in json.lines() {
                push_wrapped(&mut lines, &sanitize(line), FLUSH, style, width);
            }
        }
        Err(e) => lines.push(Line::from(format!("(could not serialize: {})", e))),
    }
    lines
}

/// Colour a verdict: green for supported, red for refuted, yellow otherwise.
fn status_style(status: &str) -> Style {
    let lower = status.to_lowercase();
    let color = if ["true", "verified", "supported", "accurate"]
        .iter()
        .any(|s| lower.contains(s))
    {
        Color::Green
    } else if ["false", "refuted", "misleading", "fake"]
        .iter()
        .any(|s| lower.contains(s))
    {
        Color::Red
    } else {
        Color::Yellow
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn present(field: &Option<String>) -> Option<String> {
    field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| sanitize(s).into_owned())
}

/// Wrap `text` to `width` and push each piece. The first piece is prefixed
/// with `first`, continuation pieces with `rest`.
fn push_wrapped(
    lines: &mut Vec<Line<'static>>,
    text: &str,
    (first, rest): (&str, &str),
    style: Style,
    width: usize,
) {
    let avail = width.saturating_sub(first.len().max(rest.len())).max(1);
    for (i, piece) in wrap_to_width(text, avail).into_iter().enumerate() {
        let prefix = if i == 0 { first } else { rest };
        lines.push(Line::from(vec![
            Span::raw(prefix.to_string()),
            Span::styled(piece, style),
        ]));
    }
}
