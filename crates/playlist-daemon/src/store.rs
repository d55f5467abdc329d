use chrono::{DateTime, Duration, Utc};
use playlist_proto::fallback::CATALOG;
use playlist_proto::filter::FilterState;
use playlist_proto::protocol::{PlaylistEntry, Snapshot};

/// In-memory play history, newest first. Fixed once seeded.
pub struct HistoryStore {
    entries: Vec<(DateTime<Utc>, PlaylistEntry)>,
}

impl HistoryStore {
    /// Store seeded with `count` catalog plays ending at `now`.
    pub fn seeded(now: DateTime<Utc>, count: usize) -> Self {
        let mut plays = seed_history(now, count);
        plays.sort_by(|a, b| b.0.cmp(&a.0));
        Self {
            entries: plays,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Newest `limit` entries.
    pub fn recent(&self, limit: usize) -> Snapshot {
        self.entries
            .iter()
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }

    /// Newest `limit` entries matching `filters`.
    pub fn search(&self, filters: &FilterState, limit: usize) -> Snapshot {
        self.entries
            .iter()
            .filter(|(_, e)| filters.matches(e))
            .take(limit)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

/// Deterministic demo history: cycles through the catalog with gaps that vary
/// between two and four minutes per step.
pub fn seed_history(now: DateTime<Utc>, count: usize) -> Vec<(DateTime<Utc>, PlaylistEntry)> {
    let mut minutes_ago = 0i64;
    (0..count)
        .map(|i| {
            if i > 0 {
                minutes_ago += 2 + (i % 3) as i64;
            }
            let track = &CATALOG[i % CATALOG.len()];
            let ts = now - Duration::minutes(minutes_ago);
            (ts, track.played_at(ts))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_store_is_newest_first() {
        let store = HistoryStore::seeded(Utc::now(), 50);
        assert_eq!(store.len(), 50);

        let all = store.recent(1000);
        let times: Vec<_> = all.iter().map(|e| e.played_at().unwrap()).collect();
        assert!(times.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(store.recent(10).len(), 10);
    }

    #[test]
    fn seed_gaps_stay_between_two_and_four_minutes() {
        let now = Utc::now();
        let plays = seed_history(now, 10);
        assert_eq!(plays[0].0, now);

        let gaps: Vec<i64> = plays
            .windows(2)
            .map(|w| (w[0].0 - w[1].0).num_minutes())
            .collect();
        assert!(gaps.iter().all(|g| (2..=4).contains(g)), "gaps: {:?}", gaps);
        assert!(gaps.contains(&2) && gaps.contains(&3) && gaps.contains(&4));
    }

    #[test]
    fn search_applies_filters_before_limit() {
        let store = HistoryStore::seeded(Utc::now(), 48);
        let mut f = FilterState::new();
        f.set_artist("queen");
        let hits = store.search(&f, 100);
        assert_eq!(hits.len(), 4);
        assert!(hits.iter().all(|e| e.artist.as_deref() == Some("Queen")));
        assert_eq!(store.search(&f, 2).len(), 2);
    }
}
