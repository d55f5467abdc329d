use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};

/// One historical playback event as served by `GET /api/playlist`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// ISO-8601 play time. Kept as received; parsed on demand.
    pub timestamp: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub album: Option<String>,
    /// Integers, integral floats and numeric strings are read as a year;
    /// anything else leaves the field blank instead of rejecting the entry.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum YearRepr {
    Int(i64),
    Float(f64),
    Text(String),
    Other(IgnoredAny),
}

fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let year = match Option::<YearRepr>::deserialize(deserializer)? {
        Some(YearRepr::Int(y)) => Some(y),
        Some(YearRepr::Float(y)) if y.fract() == 0.0 => Some(y as i64),
        Some(YearRepr::Text(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(year)
}

impl PlaylistEntry {
    pub fn new(
        played_at: DateTime<Utc>,
        artist: &str,
        title: &str,
        album: &str,
        year: i64,
    ) -> Self {
        Self {
            timestamp: format_timestamp(played_at),
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            album: Some(album.to_string()),
            year: Some(year),
        }
    }

    /// Parsed play time, or `None` when the timestamp is not ISO-8601.
    pub fn played_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.timestamp)
    }
}

/// Newest-first list of entries, replaced wholesale on every load.
pub type Snapshot = Vec<PlaylistEntry>;

/// Envelope returned by the playlist API, both on success and on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<PlaylistEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PlaylistResponse {
    pub fn ok(data: Vec<PlaylistEntry>) -> Self {
        Self {
            success: true,
            count: Some(data.len()),
            data: Some(data),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            count: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub timestamp: String,
    pub entries: usize,
}

/// RFC 3339 with millisecond precision and a `Z` suffix.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Accepts RFC 3339 and offset-less ISO-8601 (read as local time).
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}
