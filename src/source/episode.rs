//! The episode type shared by every parser strategy.
//!
//! Each parser converts its native format (RSS items, scraped JSON entries)
//! into [`Episode`] values so the registry and the web layer never need to
//! know which strategy produced them.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

/// A single media episode extracted from a source.
///
/// Episodes are created fresh on every refresh and never mutated afterwards.
/// A parser only hands out episodes with a non-empty [`url`](Episode::url);
/// entries that fail extraction are dropped before they get here.
///
/// ## Sorting
///
/// `Episode` implements [`Ord`] as a total, **most-recent-first** order:
///
/// 1. newer `published` first, undated episodes after all dated ones;
/// 2. ties (or two undated episodes) by descending title;
/// 3. remaining ties by descending URL.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Episode {
    /// Human-readable episode title.
    pub title: String,

    /// Optional one-line subtitle (e.g. `<itunes:subtitle>`).
    pub subtitle: Option<String>,

    /// Direct link to the media file.
    pub url: String,

    /// Publication timestamp, if the source provided a parsable one.
    pub published: Option<DateTime<Utc>>,
}

impl Episode {
    /// Shorthand constructor for an episode without subtitle.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: title.into(),
            subtitle: None,
            url: url.into(),
            published,
        }
    }
}

// ---------------------------------------------------------------------------
// Ordering — most recent first
// ---------------------------------------------------------------------------

impl Ord for Episode {
    fn cmp(&self, other: &Self) -> Ordering {
        // `other` first so that `Some(newer) > Some(older)` gives us newest-first.
        // `None` is less than `Some(_)`, so undated episodes sink to the bottom.
        other
            .published
            .cmp(&self.published)
            .then_with(|| other.title.cmp(&self.title))
            .then_with(|| other.url.cmp(&self.url))
    }
}

impl PartialOrd for Episode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn day(d: u32) -> Option<DateTime<Utc>> {
        Some(Utc.with_ymd_and_hms(2024, 1, d, 6, 0, 0).unwrap())
    }

    #[test]
    fn sort_most_recent_first() {
        let old = Episode::new("Old", "https://example.com/1.mp3", day(1));
        let mid = Episode::new("Mid", "https://example.com/2.mp3", day(15));
        let new = Episode::new("New", "https://example.com/3.mp3", day(30));

        let mut eps = vec![old, new, mid];
        eps.sort();

        let titles: Vec<_> = eps.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["New", "Mid", "Old"]);
    }

    #[test]
    fn undated_episodes_sort_after_dated() {
        let dated = Episode::new("A", "https://example.com/a.mp3", day(3));
        let undated = Episode::new("Z", "https://example.com/z.mp3", None);

        let mut eps = vec![undated, dated];
        eps.sort();

        assert_eq!(eps[0].title, "A", "dated episode should come first");
        assert_eq!(eps[1].title, "Z", "undated episode should come last");
    }

    #[test]
    fn undated_episodes_fall_back_to_descending_title() {
        let mut eps = vec![
            Episode::new("Episode 1", "https://example.com/1.mp3", None),
            Episode::new("Episode 3", "https://example.com/3.mp3", None),
            Episode::new("Episode 2", "https://example.com/2.mp3", None),
        ];
        eps.sort();

        let titles: Vec<_> = eps.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["Episode 3", "Episode 2", "Episode 1"]);
    }

    #[test]
    fn same_date_breaks_ties_by_title() {
        let a = Episode::new("A", "https://example.com/a.mp3", day(5));
        let b = Episode::new("B", "https://example.com/b.mp3", day(5));
        assert_eq!(a.cmp(&b), Ordering::Greater);
    }

    #[test]
    fn order_is_total() {
        let a = Episode::new("Same", "https://example.com/a.mp3", day(5));
        let b = Episode::new("Same", "https://example.com/b.mp3", day(5));
        assert_ne!(a.cmp(&b), Ordering::Equal);
        assert_eq!(a.cmp(&a.clone()), Ordering::Equal);
    }
}
