//! Report parsing for backend analysis summaries.
//!
//! The backend returns a long-form report that may open with a single bold
//! line (`**Heading**`) followed by paragraphs separated by blank lines.
//! [`parse_report`] splits that text into a heading and paragraphs without
//! interpreting any other markup.

/// A report split into an optional heading and its body paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReport {
    pub heading: Option<String>,
    /// Paragraphs in order. Single newlines inside a paragraph are kept.
    pub paragraphs: Vec<String>,
}

impl ParsedReport {
    /// True when there is neither a heading nor any paragraph to show.
    pub fn is_empty(&self) -> bool {
        self.heading.is_none() && self.paragraphs.is_empty()
    }
}

/// Parse raw report text into a heading and paragraphs.
///
/// Total and pure: any input (including whitespace-only text) produces a
/// result, and the same input always produces the same result.
pub fn parse_report(raw: &str) -> ParsedReport {
    if raw.is_empty() {
        return ParsedReport::default();
    }

    let mut lines: Vec<&str> = raw.split('\n').collect();
    let mut heading = None;

    if let Some(idx) = lines.iter().position(|l| !l.trim().is_empty()) {
        if let Some(inner) = bold_line_inner(lines[idx].trim()) {
            // `**   **` is still consumed, it just has nothing to show.
            let inner = inner.trim();
            heading = (!inner.is_empty()).then(|| inner.to_string());
            lines[idx] = "";
        }
    }

    let body = lines.join("\n");
    let body = body.trim();
    let paragraphs = if body.is_empty() {
        Vec::new()
    } else {
        split_paragraphs(body)
    };

    ParsedReport {
        heading,
        paragraphs,
    }
}

/// Inner text of a line wrapped entirely in `**...**`.
///
/// Requires at least one character between the markers, so `****` alone is
/// not a heading.
fn bold_line_inner(line: &str) -> Option<&str> {
    let inner = line.strip_prefix("**")?.strip_suffix("**")?;
    if inner.is_empty() {
        return None;
    }
    Some(inner)
}

/// Split on runs of two or more consecutive newlines.
fn split_paragraphs(body: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut rest = body;

    while let Some(start) = rest.find("\n\n") {
        let run_len = rest[start..].bytes().take_while(|&b| b == b'\n').count();
        push_trimmed(&mut paragraphs, &rest[..start]);
        rest = &rest[start + run_len..];
    }
    push_trimmed(&mut paragraphs, rest);

    paragraphs
}

fn push_trimmed(out: &mut Vec<String>, chunk: &str) {
    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_empty_report() {
        assert_eq!(parse_report(""), ParsedReport::default());
    }

    #[test]
    fn test_heading_and_paragraphs() {
        let parsed = parse_report("**Summary**\n\nBody line one.\n\nBody line two.");
        assert_eq!(parsed.heading.as_deref(), Some("Summary"));
        assert_eq!(parsed.paragraphs, vec!["Body line one.", "Body line two."]);
    }

    #[test]
    fn test_no_heading_keeps_internal_newline() {
        let parsed = parse_report("No heading here.\nJust text.");
        assert_eq!(parsed.heading, None);
        assert_eq!(parsed.paragraphs, vec!["No heading here.\nJust text."]);
    }

    #[test]
    fn test_heading_only() {
        let parsed = parse_report("**Verdict: Misleading**");
        assert_eq!(parsed.heading.as_deref(), Some("Verdict: Misleading"));
        assert!(parsed.paragraphs.is_empty());
    }

    #[test]
    fn test_heading_after_leading_blank_lines() {
        let parsed = parse_report("\n\n   **  Padded  **  \nFirst paragraph.");
        assert_eq!(parsed.heading.as_deref(), Some("Padded"));
        assert_eq!(parsed.paragraphs, vec!["First paragraph."]);
    }

    #[test]
    fn test_bold_line_not_first_is_body() {
        let parsed = parse_report("Intro.\n\n**Not a heading**");
        assert_eq!(parsed.heading, None);
        assert_eq!(parsed.paragraphs, vec!["Intro.", "**Not a heading**"]);
    }

    #[test]
    fn test_partial_bold_is_not_heading() {
        let parsed = parse_report("**Bold** and more");
        assert_eq!(parsed.heading, None);
        assert_eq!(parsed.paragraphs, vec!["**Bold** and more"]);
    }

    #[test]
    fn test_bare_markers_are_not_heading() {
        let parsed = parse_report("****\nText");
        assert_eq!(parsed.heading, None);
        assert_eq!(parsed.paragraphs, vec!["****\nText"]);
    }

    #[test]
    fn test_blank_heading_line_is_dropped() {
        let parsed = parse_report("**   **\nBody");
        assert_eq!(parsed.heading, None);
        assert_eq!(parsed.paragraphs, vec!["Body"]);
    }

    #[test]
    fn test_long_blank_runs_collapse() {
        let parsed = parse_report("One\n\n\n\n\nTwo\n\nThree");
        assert_eq!(parsed.paragraphs, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_whitespace_only_lines_between_paragraphs() {
        // Lines holding only spaces are not newlines; the chunk is trimmed instead.
        let parsed = parse_report("One\n  \nTwo");
        assert_eq!(parsed.paragraphs, vec!["One\n  \nTwo"]);
    }

    #[test]
    fn test_whitespace_only_input() {
        let parsed = parse_report("   \n\t\n  ");
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_crlf_heading() {
        let parsed = parse_report("**Title**\r\n\r\nBody");
        assert_eq!(parsed.heading.as_deref(), Some("Title"));
        assert_eq!(parsed.paragraphs, vec!["Body"]);
    }

    proptest! {
        #[test]
        fn prop_parse_is_total_and_idempotent(raw in "\\PC*") {
            let first = parse_report(&raw);
            let second = parse_report(&raw);
            prop_assert_eq!(&first, &second);
            for p in &first.paragraphs {
                prop_assert!(!p.is_empty());
                prop_assert_eq!(p.trim(), p.as_str());
            }
        }

        #[test]
        fn prop_heading_line_never_in_paragraphs(
            heading in "[A-Za-z][A-Za-z ]{0,20}",
            body in "[a-z .\n]{0,80}",
        ) {
            let raw = format!("**{}**\n{}", heading, body);
            let parsed = parse_report(&raw);
            prop_assert_eq!(parsed.heading.as_deref(), Some(heading.trim()));
            let marker = format!("**{}**", heading);
            for p in &parsed.paragraphs {
                prop_assert!(!p.contains(&marker));
            }
        }
    }
}
