use serde::{Deserialize, Serialize};

use crate::protocol::PlaylistEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterField {
    Artist,
    Title,
    Album,
    Year,
}

impl FilterField {
    pub const ALL: [FilterField; 4] = [
        FilterField::Artist,
        FilterField::Title,
        FilterField::Album,
        FilterField::Year,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Artist => "artist",
            Self::Title => "title",
            Self::Album => "album",
            Self::Year => "year",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Self::Artist => Self::Title,
            Self::Title => Self::Album,
            Self::Album => Self::Year,
            Self::Year => Self::Artist,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Self::Artist => Self::Year,
            Self::Title => Self::Artist,
            Self::Album => Self::Title,
            Self::Year => Self::Album,
        }
    }
}

/// Per-field substring constraints. Values are stored lower-cased; an empty
/// value places no constraint on its field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    artist: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    album: String,
    #[serde(default)]
    year: String,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_artist(&mut self, value: &str) {
        self.artist = value.to_lowercase();
    }

    pub fn set_title(&mut self, value: &str) {
        self.title = value.to_lowercase();
    }

    pub fn set_album(&mut self, value: &str) {
        self.album = value.to_lowercase();
    }

    pub fn set_year(&mut self, value: &str) {
        self.year = value.to_lowercase();
    }

    pub fn set(&mut self, field: FilterField, value: &str) {
        match field {
            FilterField::Artist => self.set_artist(value),
            FilterField::Title => self.set_title(value),
            FilterField::Album => self.set_album(value),
            FilterField::Year => self.set_year(value),
        }
    }

    pub fn get(&self, field: FilterField) -> &str {
        match field {
            FilterField::Artist => &self.artist,
            FilterField::Title => &self.title,
            FilterField::Album => &self.album,
            FilterField::Year => &self.year,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        FilterField::ALL.iter().all(|f| self.get(*f).is_empty())
    }

    /// True when `entry` satisfies all four predicates.
    pub fn matches(&self, entry: &PlaylistEntry) -> bool {
        contains(entry.artist.as_deref(), &self.artist)
            && contains(entry.title.as_deref(), &self.title)
            && contains(entry.album.as_deref(), &self.album)
            && contains(entry.year.map(|y| y.to_string()).as_deref(), &self.year)
    }

    /// Order-preserving subsequence of `entries` that matches.
    pub fn apply<'a>(&self, entries: &'a [PlaylistEntry]) -> Vec<&'a PlaylistEntry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

fn contains(value: Option<&str>, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    match value {
        Some(v) => v.to_lowercase().contains(needle),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(artist: &str, title: &str, album: &str, year: Option<i64>) -> PlaylistEntry {
        PlaylistEntry {
            timestamp: "2024-03-01T10:00:00.000Z".to_string(),
            artist: Some(artist.to_string()),
            title: Some(title.to_string()),
            album: Some(album.to_string()),
            year,
        }
    }

    fn sample() -> Vec<PlaylistEntry> {
        vec![
            entry("Queen", "Bohemian Rhapsody", "A Night at the Opera", Some(1975)),
            entry("Nirvana", "Smells Like Teen Spirit", "Nevermind", Some(1991)),
            entry("Queens of the Stone Age", "No One Knows", "Songs for the Deaf", Some(2002)),
        ]
    }

    #[test]
    fn artist_filter_selects_matching_entries() {
        let entries = sample();
        let mut f = FilterState::new();
        f.set_artist("queen");
        let hits = f.apply(&entries);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title.as_deref(), Some("Bohemian Rhapsody"));

        f.set_year("197");
        let hits = f.apply(&entries);
        assert_eq!(hits, vec![&entries[0]]);
    }

    #[test]
    fn empty_filter_keeps_everything_in_order() {
        let entries = sample();
        let f = FilterState::new();
        assert!(f.is_empty());
        let hits: Vec<PlaylistEntry> = f.apply(&entries).into_iter().cloned().collect();
        assert_eq!(hits, entries);
    }

    #[test]
    fn filters_ignore_case() {
        let entries = sample();
        let mut upper = FilterState::new();
        upper.set_artist("QUEEN");
        let mut lower = FilterState::new();
        lower.set_artist("queen");
        assert_eq!(upper, lower);
        assert_eq!(upper.apply(&entries), lower.apply(&entries));
        assert_eq!(upper.get(FilterField::Artist), "queen");
    }

    #[test]
    fn missing_field_fails_non_empty_predicate() {
        let mut e = entry("Queen", "Bohemian Rhapsody", "A Night at the Opera", None);
        e.album = None;
        let mut f = FilterState::new();
        assert!(f.matches(&e));
        f.set(FilterField::Year, "19");
        assert!(!f.matches(&e));
        f.clear();
        f.set(FilterField::Album, "night");
        assert!(!f.matches(&e));
    }

    #[test]
    fn clear_resets_every_field() {
        let entries = sample();
        let mut f = FilterState::new();
        for field in FilterField::ALL {
            f.set(field, "zzz");
        }
        assert!(f.apply(&entries).is_empty());
        f.clear();
        assert_eq!(f, FilterState::default());
        assert_eq!(f.apply(&entries).len(), entries.len());
    }

    #[test]
    fn field_cycle_wraps() {
        let mut f = FilterField::Artist;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, FilterField::Artist);
        assert_eq!(FilterField::Artist.prev(), FilterField::Year);
    }
}
