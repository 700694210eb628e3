//! Page-scraping strategy.
//!
//! Some sites do not publish a usable feed: the landing page embeds the
//! episode list as JSON inside an inline `<script>` (after a marker such as
//! `window.__DATA__ =`), and the media link only appears on each episode's
//! own page.  [`ScrapeParser`] fetches the landing page, decodes the embedded
//! data, then resolves every episode page concurrently.
//!
//! Resolution runs one scoped thread per episode.  Each thread writes into
//! its own slot of a fixed-size vector, so results keep submission order and
//! no collector is needed; leaving the scope is the join barrier.

use std::thread;

use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use scraper::{Html, Selector};
use serde_json::Value;

use super::{get_text, Episode, FeedParser, FetchError, MAX_EPISODES};

/// Configuration of a scraped source.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Landing page listing the episodes.
    pub url: String,
    /// Text that precedes the embedded JSON inside the script element.
    pub marker: String,
    /// JSON pointer (RFC 6901) of the episode array, e.g. `/podcast/episodes`.
    pub collection: String,
    /// Pattern matching the media link on an episode page.  When it has a
    /// capture group, group 1 is used as the link.
    pub media_pattern: Regex,
}

/// An episode listed on the landing page, not yet resolved to a media link.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeLink {
    pub title: String,
    pub subtitle: Option<String>,
    /// Absolute URL of the episode's own page.
    pub page: String,
    pub published: Option<DateTime<Utc>>,
}

pub struct ScrapeParser {
    config: ScrapeConfig,
    client: Client,
}

impl ScrapeParser {
    pub fn new(config: ScrapeConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Decode the JSON value that follows `marker` in the first inline
    /// script containing it.  Anything after the value (`;`, more code) is
    /// ignored.
    pub fn extract_data(html: &str, marker: &str) -> Result<Value, FetchError> {
        let document = Html::parse_document(html);
        let selector =
            Selector::parse("script").map_err(|e| FetchError::Decode(e.to_string()))?;

        let script = document
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .find(|text| text.contains(marker))
            .ok_or_else(|| FetchError::Extract(format!("no script contains {marker:?}")))?;

        let start = script
            .find(marker)
            .map(|i| i + marker.len())
            .unwrap_or_default();

        let mut values = serde_json::Deserializer::from_str(script[start..].trim_start())
            .into_iter::<Value>();
        match values.next() {
            Some(Ok(value)) => Ok(value),
            Some(Err(e)) => Err(FetchError::Decode(e.to_string())),
            None => Err(FetchError::Decode(format!("nothing after {marker:?}"))),
        }
    }

    /// Locate the episode array at `collection` and read its first
    /// [`MAX_EPISODES`] entries.
    ///
    /// Entries without a page link are skipped.  Relative links are resolved
    /// against `base`.
    pub fn episode_links(
        data: &Value,
        collection: &str,
        base: &Url,
    ) -> Result<Vec<EpisodeLink>, FetchError> {
        let entries = data
            .pointer(collection)
            .and_then(Value::as_array)
            .ok_or_else(|| FetchError::Extract(format!("no episode list at {collection:?}")))?;

        let links = entries
            .iter()
            .take(MAX_EPISODES)
            .filter_map(|entry| {
                let title = str_field(entry, &["title", "name"]).unwrap_or("(untitled)");
                let Some(href) = str_field(entry, &["url", "href", "link"]) else {
                    tracing::debug!(title, "episode entry has no link, skipping");
                    return None;
                };
                let page = match base.join(href) {
                    Ok(page) => page,
                    Err(e) => {
                        tracing::debug!(title, href, error = %e, "bad episode link, skipping");
                        return None;
                    }
                };

                Some(EpisodeLink {
                    title: title.to_string(),
                    subtitle: str_field(entry, &["subtitle", "description"]).map(String::from),
                    page: page.into(),
                    published: ["published", "date", "publishedAt"]
                        .iter()
                        .find_map(|key| entry.get(*key).and_then(parse_date)),
                })
            })
            .collect();

        Ok(links)
    }

    /// First match of `pattern` in an episode page.
    pub fn find_media_url(page: &str, pattern: &Regex) -> Option<String> {
        let caps = pattern.captures(page)?;
        caps.get(1)
            .or_else(|| caps.get(0))
            .map(|m| m.as_str().trim().to_string())
            .filter(|url| !url.is_empty())
    }

    fn resolve(&self, link: &EpisodeLink) -> Result<Episode, FetchError> {
        let page = get_text(&self.client, &link.page)?;
        let url = Self::find_media_url(&page, &self.config.media_pattern).ok_or_else(|| {
            FetchError::Extract(format!("no media link on {}", link.page))
        })?;

        Ok(Episode {
            title: link.title.clone(),
            subtitle: link.subtitle.clone(),
            url,
            published: link.published,
        })
    }
}

fn str_field<'a>(entry: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Best-effort date: RFC 3339, RFC 2822 or unix seconds, else `None`.
fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim())
            .or_else(|_| DateTime::parse_from_rfc2822(raw.trim()))
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n.as_i64().and_then(|secs| DateTime::from_timestamp(secs, 0)),
        _ => None,
    }
}

impl FeedParser for ScrapeParser {
    fn locator(&self) -> &str {
        &self.config.url
    }

    fn fetch(&self) -> Result<Vec<Episode>, FetchError> {
        let html = get_text(&self.client, &self.config.url)?;
        let data = Self::extract_data(&html, &self.config.marker)?;
        let base = Url::parse(&self.config.url).map_err(|e| FetchError::Extract(e.to_string()))?;
        let links = Self::episode_links(&data, &self.config.collection, &base)?;

        let mut slots: Vec<Option<Episode>> = vec![None; links.len()];
        thread::scope(|scope| {
            for (link, slot) in links.iter().zip(slots.iter_mut()) {
                scope.spawn(move || match self.resolve(link) {
                    Ok(episode) => *slot = Some(episode),
                    Err(e) => {
                        tracing::warn!(page = %link.page, error = %e, "episode not resolved");
                    }
                });
            }
        });

        let episodes: Vec<Episode> = slots.into_iter().flatten().collect();
        tracing::debug!(
            "resolved {} of {} episodes from {}",
            episodes.len(),
            links.len(),
            self.config.url
        );
        Ok(episodes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
