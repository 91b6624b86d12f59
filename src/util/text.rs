use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const ELLIPSIS: &str = "...";

/// Display width of a string in terminal columns.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate `s` to at most `max_width` terminal columns, appending `...` when cut.
///
/// Widths of 3 or less cannot hold a character plus the ellipsis, so the
/// string is simply clipped. Borrows when nothing needs to change.
///
/// ```
/// use truelens::util::truncate_to_width;
///
/// assert_eq!(truncate_to_width("Measles outbreak", 10), "Measles...");
/// assert_eq!(truncate_to_width("Short", 10), "Short");
/// ```
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }

    let ellipsis = if max_width > ELLIPSIS.len() {
        ELLIPSIS
    } else {
        ""
    };
    let budget = max_width - ellipsis.len();

    let mut used = 0;
    let mut end = 0;
    for (idx, c) in s.char_indices() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        end = idx + c.len_utf8();
    }

    Cow::Owned(format!("{}{}", &s[..end], ellipsis))
}

/// Remove terminal control sequences from backend-supplied text.
///
/// Drops C0 controls (except tab, newline and carriage return), DEL, and ANSI
/// CSI/OSC escape sequences so that report text cannot repaint the terminal.
pub fn sanitize(s: &str) -> Cow<'_, str> {
    let is_unsafe = |c: char| {
        c == '\x1b' || c == '\x7f' || (c < ' ' && !matches!(c, '\t' | '\n' | '\r'))
    };
    if !s.chars().any(is_unsafe) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\x1b' {
            match chars.peek() {
                Some('[') => {
                    chars.next();
                    // CSI runs until a final byte in '@'..='~'.
                    for n in chars.by_ref() {
                        if ('@'..='~').contains(&n) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    chars.next();
                    // OSC runs until BEL or ESC '\'.
                    while let Some(n) = chars.next() {
                        if n == '\x07' {
                            break;
                        }
                        if n == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            }
        } else if !is_unsafe(c) {
            out.push(c);
        }
    }
    Cow::Owned(out)
}

/// Greedy word wrap to `width` columns, preserving explicit line breaks.
///
/// Words wider than the line are split by character. A width of 0 disables
/// wrapping. Blank input lines come back as empty strings.
pub fn wrap_to_width(s: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return s.lines().map(str::to_string).collect();
    }

    let mut out = Vec::new();
    for raw_line in s.split('\n') {
        let raw_line = raw_line.trim_end_matches('\r');
        let mut line = String::new();
        let mut line_width = 0;

        for word in raw_line.split_whitespace() {
            let word_width = display_width(word);
            let sep = usize::from(!line.is_empty());

            if line_width + sep + word_width <= width {
                if sep == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += sep + word_width;
                continue;
            }

            if !line.is_empty() {
                out.push(std::mem::take(&mut line));
                line_width = 0;
            }

            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }

            // Hard-split an overlong word.
            for c in word.chars() {
                let w = UnicodeWidthChar::width(c).unwrap_or(0);
                if line_width + w > width && !line.is_empty() {
                    out.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push(c);
                line_width += w;
            }
        }
        out.push(line);
    }
    out
}

/// Collapse all whitespace runs (including newlines) into single spaces.
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
