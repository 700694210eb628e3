//! Syndication feed strategy.
//!
//! Fetches an RSS 2.0 document over HTTP, keeps the first
//! [`MAX_EPISODES`] items and projects each into an [`Episode`] using its
//! `<enclosure>` as the media link.

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;

use super::{get_text, Episode, FeedParser, FetchError, MAX_EPISODES};

/// An RSS feed parser.
pub struct RssParser {
    /// The feed URL to poll.
    pub url: String,
    client: Client,
}

impl RssParser {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Project an already-fetched [`rss::Channel`] into [`Episode`]s.
    ///
    /// This is a pure function (no I/O) so that tests can exercise the
    /// extraction logic without hitting the network.  Only the first
    /// [`MAX_EPISODES`] items are considered; items without an enclosure URL
    /// are dropped.
    pub fn parse_channel(channel: &rss::Channel) -> Vec<Episode> {
        channel
            .items()
            .iter()
            .take(MAX_EPISODES)
            .filter_map(|item| {
                let url = item
                    .enclosure()
                    .map(|enc| enc.url().trim())
                    .filter(|url| !url.is_empty());
                let Some(url) = url else {
                    tracing::debug!(
                        title = item.title().unwrap_or_default(),
                        "item has no enclosure, skipping"
                    );
                    return None;
                };

                Some(Episode {
                    title: item.title().unwrap_or("(untitled)").to_string(),
                    subtitle: item
                        .itunes_ext()
                        .and_then(|ext| ext.subtitle())
                        .map(String::from),
                    url: url.to_string(),
                    published: item.pub_date().and_then(parse_date),
                })
            })
            .collect()
    }
}

/// Parse an RFC 2822 date; gracefully degrade to `None` on failure.
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl FeedParser for RssParser {
    fn locator(&self) -> &str {
        &self.url
    }

    fn fetch(&self) -> Result<Vec<Episode>, FetchError> {
        let body = get_text(&self.client, &self.url)?;
        let channel = rss::Channel::read_from(body.as_bytes())
            .map_err(|e| FetchError::Decode(e.to_string()))?;
        Ok(Self::parse_channel(&channel))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
