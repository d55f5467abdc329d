//! View renderer: projects (snapshot × filters) into display rows and HTML.
//!
//! Rendering is a pure function of its inputs. Relative timestamps are
//! computed against the `now` passed in, so every render recomputes them.

use chrono::{DateTime, Local, Utc};

use crate::filter::FilterState;
use crate::protocol::{parse_timestamp, PlaylistEntry};

pub const LOADING_MESSAGE: &str = "Loading playlist history...";
pub const NO_RESULTS_MESSAGE: &str = "No playlist entries match your current filters.";
pub const ERROR_MESSAGE: &str = "Error loading playlist history. Please try again later.";

const MS_PER_MIN: i64 = 60_000;

/// One rendered list row. Text is raw; each surface encodes it itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayRow {
    pub played: String,
    pub artist: String,
    pub title: String,
    pub album: String,
    pub year: String,
}

impl DisplayRow {
    pub fn from_entry(entry: &PlaylistEntry, now: DateTime<Utc>) -> Self {
        Self {
            played: format_relative(&entry.timestamp, now),
            artist: entry.artist.clone().unwrap_or_default(),
            title: entry.title.clone().unwrap_or_default(),
            album: entry.album.clone().unwrap_or_default(),
            year: entry.year.map(|y| y.to_string()).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderedView {
    Loading,
    NoResults,
    Rows(Vec<DisplayRow>),
    Error(String),
}

impl RenderedView {
    pub fn error() -> Self {
        Self::Error(ERROR_MESSAGE.to_string())
    }

    pub fn rows(&self) -> &[DisplayRow] {
        match self {
            Self::Rows(rows) => rows,
            _ => &[],
        }
    }

    /// Status text for the non-list states.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Loading => Some(LOADING_MESSAGE),
            Self::NoResults => Some(NO_RESULTS_MESSAGE),
            Self::Error(msg) => Some(msg),
            Self::Rows(_) => None,
        }
    }

    /// Markup for the list container. Every interpolated string is escaped.
    pub fn to_html(&self) -> String {
        match self {
            Self::Loading => format!(r#"<div class="loading">{}</div>"#, LOADING_MESSAGE),
            Self::NoResults => format!(r#"<div class="no-results">{}</div>"#, NO_RESULTS_MESSAGE),
            Self::Error(msg) => format!(r#"<div class="error">{}</div>"#, escape_html(msg)),
            Self::Rows(rows) => {
                let mut html = String::with_capacity(rows.len() * 256);
                for row in rows {
                    html.push_str(r#"<div class="playlist-item">"#);
                    push_cell(&mut html, "timestamp", &row.played);
                    push_cell(&mut html, "artist", &row.artist);
                    push_cell(&mut html, "title", &row.title);
                    push_cell(&mut html, "album", &row.album);
                    push_cell(&mut html, "year", &row.year);
                    html.push_str("</div>\n");
                }
                html
            }
        }
    }
}

fn push_cell(html: &mut String, class: &str, text: &str) {
    html.push_str(r#"<div class="playlist-cell "#);
    html.push_str(class);
    html.push_str(r#"">"#);
    html.push_str(&escape_html(text));
    html.push_str("</div>");
}

/// Filter `snapshot` and build the view for the current moment.
pub fn render_view(
    snapshot: &[PlaylistEntry],
    filters: &FilterState,
    now: DateTime<Utc>,
) -> RenderedView {
    let rows: Vec<DisplayRow> = filters
        .apply(snapshot)
        .into_iter()
        .map(|e| DisplayRow::from_entry(e, now))
        .collect();
    if rows.is_empty() {
        RenderedView::NoResults
    } else {
        RenderedView::Rows(rows)
    }
}

/// "n min(s) ago" / "n hour(s) ago" / "n day(s) ago", or an absolute local
/// date and time once a week has passed. Unparseable input is returned as-is.
pub fn format_relative(timestamp: &str, now: DateTime<Utc>) -> String {
    let Some(ts) = parse_timestamp(timestamp) else {
        return timestamp.to_string();
    };
    // Plays stamped in the future (clock skew) count as just now.
    let elapsed_ms = (now - ts).num_milliseconds().max(0);
    let mins = elapsed_ms / MS_PER_MIN;
    let hours = mins / 60;
    let days = hours / 24;

    if mins < 60 {
        format!("{} {} ago", mins, plural(mins, "min"))
    } else if hours < 24 {
        format!("{} {} ago", hours, plural(hours, "hour"))
    } else if days < 7 {
        format!("{} {} ago", days, plural(days, "day"))
    } else {
        ts.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        unit.to_string()
    } else {
        format!("{}s", unit)
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
