//! Parser strategies.
//!
//! This module defines the [`FeedParser`] trait and the common [`Episode`]
//! type.  Concrete strategies live in sub-modules: [`syndication`] for RSS
//! feeds and [`scrape`] for sites whose media links only appear on the
//! per-episode pages.
//!
//! ## For contributors — adding a new strategy
//!
//! 1. Create a new file in this directory (e.g. `atom.rs`).
//! 2. Define a struct holding its configuration and implement [`FeedParser`].
//! 3. Add a variant to [`ParserKind`] and build your struct in
//!    [`ParserKind::build`].
//! 4. Teach `config.rs` how to read the new `kind` from the sources file.
//!
//! The registry, scheduler and web layer are all strategy-agnostic.

mod episode;
mod error;
mod syndication;
mod scrape;

pub use episode::Episode;
pub use error::FetchError;
pub use syndication::RssParser;
pub use scrape::{EpisodeLink, ScrapeConfig, ScrapeParser};

use reqwest::blocking::Client;

/// Upper bound on the episodes a parser returns per refresh.
pub const MAX_EPISODES: usize = 10;

/// Trait that every parser strategy must implement.
///
/// The refresh engine calls [`episodes()`](FeedParser::episodes) from
/// whichever thread runs the refresh (scheduler or manual trigger), so
/// implementations must be [`Send`] and [`Sync`].
pub trait FeedParser: Send + Sync {
    /// Where this parser fetches from, used in log lines.
    fn locator(&self) -> &str;

    /// Fetch and extract at most [`MAX_EPISODES`] episodes.
    ///
    /// Order is not significant; the refresh engine sorts.
    fn fetch(&self) -> Result<Vec<Episode>, FetchError>;

    /// [`fetch`](FeedParser::fetch), with any failure logged and turned into
    /// an empty list.
    fn episodes(&self) -> Vec<Episode> {
        match self.fetch() {
            Ok(eps) => eps,
            Err(e) => {
                tracing::warn!(locator = self.locator(), error = %e, "fetch failed");
                Vec::new()
            }
        }
    }
}

/// The closed set of parser strategies a source can be configured with.
#[derive(Debug, Clone)]
pub enum ParserKind {
    /// An RSS 2.0 feed with `<enclosure>` media links.
    Rss { url: String },
    /// A landing page with embedded episode data and per-episode pages.
    Scrape(ScrapeConfig),
}

impl ParserKind {
    /// Instantiate the strategy, sharing `client` for all of its requests.
    pub fn build(self, client: &Client) -> Box<dyn FeedParser> {
        match self {
            ParserKind::Rss { url } => Box::new(RssParser::new(url, client.clone())),
            ParserKind::Scrape(config) => Box::new(ScrapeParser::new(config, client.clone())),
        }
    }
}

/// Build the blocking HTTP client shared by every parser.
///
/// Only the user agent is set; timeouts are left at the transport defaults.
pub fn http_client() -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// GET `url` and return the body, treating non-2xx statuses as errors.
pub(crate) fn get_text(client: &Client, url: &str) -> Result<String, FetchError> {
    tracing::debug!("fetching {}", url);
    let response = client.get(url).send()?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status,
            url: url.to_string(),
        });
    }
    Ok(response.text()?)
}
