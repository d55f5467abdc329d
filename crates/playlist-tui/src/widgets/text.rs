//! Terminal-safe text: control characters stripped, long cells ellipsized.

use unicode_width::UnicodeWidthChar;

/// Drop control characters so upstream text cannot inject escape sequences.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if c == '\t' || c == '\n' { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect()
}

/// Sanitize and cut `text` to at most `max` display columns, ending in `…`
/// when shortened.
pub fn fit(text: &str, max: usize) -> String {
    let clean = sanitize(text);
    let total: usize = clean.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= max {
        return clean;
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in clean.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
