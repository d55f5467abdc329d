//! Built-in track catalog and the placeholder snapshot generator used when the
//! playlist endpoint is unreachable.

use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::protocol::{PlaylistEntry, Snapshot};

/// Number of entries in a placeholder snapshot.
pub const PLACEHOLDER_SIZE: usize = 50;

/// Gap between consecutive placeholder plays.
pub const PLACEHOLDER_SPACING_MINS: i64 = 2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CatalogTrack {
    pub artist: &'static str,
    pub title: &'static str,
    pub album: &'static str,
    pub year: i64,
}

const fn track(
    artist: &'static str,
    title: &'static str,
    album: &'static str,
    year: i64,
) -> CatalogTrack {
    CatalogTrack {
        artist,
        title,
        album,
        year,
    }
}

pub const CATALOG: [CatalogTrack; 12] = [
    track("The Beatles", "Come Together", "Abbey Road", 1969),
    track("Pink Floyd", "Money", "The Dark Side of the Moon", 1973),
    track("Led Zeppelin", "Stairway to Heaven", "Led Zeppelin IV", 1971),
    track("Queen", "Bohemian Rhapsody", "A Night at the Opera", 1975),
    track("The Rolling Stones", "Paint It Black", "Sticky Fingers", 1971),
    track("AC/DC", "Thunderstruck", "Back in Black", 1980),
    track("Metallica", "Enter Sandman", "Master of Puppets", 1986),
    track("Nirvana", "Smells Like Teen Spirit", "Nevermind", 1991),
    track("David Bowie", "Heroes", "The Rise and Fall of Ziggy Stardust", 1977),
    track("The Who", "Baba O'Riley", "Who's Next", 1971),
    track("Black Sabbath", "Iron Man", "Paranoid", 1970),
    track("Deep Purple", "Smoke on the Water", "Machine Head", 1972),
];

impl CatalogTrack {
    pub fn played_at(&self, ts: DateTime<Utc>) -> PlaylistEntry {
        PlaylistEntry::new(ts, self.artist, self.title, self.album, self.year)
    }
}

/// `size` random catalog plays, two minutes apart, newest (`now`) first.
pub fn placeholder_snapshot(now: DateTime<Utc>, size: usize) -> Snapshot {
    placeholder_snapshot_with(&mut rand::thread_rng(), now, size)
}

pub fn placeholder_snapshot_with<R: Rng + ?Sized>(
    rng: &mut R,
    now: DateTime<Utc>,
    size: usize,
) -> Snapshot {
    let mut plays: Vec<(DateTime<Utc>, PlaylistEntry)> = (0..size)
        .filter_map(|i| {
            let ts = now - Duration::minutes(PLACEHOLDER_SPACING_MINS * i as i64);
            CATALOG.choose(rng).map(|t| (ts, t.played_at(ts)))
        })
        .collect();
    plays.sort_by(|a, b| b.0.cmp(&a.0));
    plays.into_iter().map(|(_, entry)| entry).collect()
}
