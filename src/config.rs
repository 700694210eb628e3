//! Source list configuration.
//!
//! Sources are fixed at startup.  They come from a YAML file when one is
//! given on the command line, otherwise from [`default_sources`]:
//!
//! ```yaml
//! sources:
//!   - name: Kodsnack
//!     url: https://kodsnack.libsyn.com/rss
//!   - name: Example Show
//!     kind: scrape
//!     url: https://shows.example.com/example
//!     marker: "window.__DATA__ ="
//!     collection: /show/episodes
//!     media_pattern: 'data-audio="(https://[^"]+\.mp3)"'
//! ```

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;

use crate::registry::Source;
use crate::source::{ParserKind, ScrapeConfig};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    #[default]
    Rss,
    Scrape,
}

/// One entry of the sources file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub name: String,
    #[serde(default)]
    pub kind: SourceKind,
    pub url: String,
    /// Scrape only: text preceding the embedded JSON.
    pub marker: Option<String>,
    /// Scrape only: JSON pointer of the episode array.
    pub collection: Option<String>,
    /// Scrape only: regex matching the media link on an episode page.
    pub media_pattern: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SourcesFile {
    sources: Vec<SourceConfig>,
}

impl SourceConfig {
    pub fn rss(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: SourceKind::Rss,
            url: url.to_string(),
            marker: None,
            collection: None,
            media_pattern: None,
        }
    }

    /// Validate this entry and turn it into a parser strategy.
    pub fn parser_kind(&self) -> Result<ParserKind> {
        if self.name.trim().is_empty() {
            bail!("source with url {:?} has an empty name", self.url);
        }
        Url::parse(&self.url).with_context(|| format!("{}: invalid url", self.name))?;

        match self.kind {
            SourceKind::Rss => Ok(ParserKind::Rss {
                url: self.url.clone(),
            }),
            SourceKind::Scrape => {
                let field = |value: &Option<String>, key: &str| {
                    value
                        .clone()
                        .filter(|v| !v.trim().is_empty())
                        .ok_or_else(|| anyhow!("{}: scrape sources need `{key}`", self.name))
                };
                let pattern = field(&self.media_pattern, "media_pattern")?;
                let media_pattern = Regex::new(&pattern)
                    .with_context(|| format!("{}: invalid media_pattern", self.name))?;

                Ok(ParserKind::Scrape(ScrapeConfig {
                    url: self.url.clone(),
                    marker: field(&self.marker, "marker")?,
                    collection: field(&self.collection, "collection")?,
                    media_pattern,
                }))
            }
        }
    }
}

/// The built-in source list.
pub fn default_sources() -> Vec<SourceConfig> {
    vec![
        SourceConfig::rss("Filip & Fredrik", "https://feed.pod.space/filipandfredrik"),
        SourceConfig::rss("Alex & Sigge", "http://alexosigge.libsyn.com/rss"),
        SourceConfig::rss("Kodsnack", "https://kodsnack.libsyn.com/rss"),
        SourceConfig::rss("Go Time", "https://changelog.com/gotime/feed"),
    ]
}

/// Parse a sources file body.
pub fn parse(yaml: &str) -> Result<Vec<SourceConfig>> {
    let file: SourcesFile = serde_yaml::from_str(yaml).context("invalid sources file")?;
    if file.sources.is_empty() {
        bail!("sources file lists no sources");
    }
    Ok(file.sources)
}

/// Read and parse a sources file.
pub fn load(path: &Path) -> Result<Vec<SourceConfig>> {
    let yaml = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse(&yaml).with_context(|| format!("in {}", path.display()))
}

/// Build every configured source, all sharing `client`.
pub fn build_sources(configs: Vec<SourceConfig>, client: &Client) -> Result<Vec<Source>> {
    configs
        .into_iter()
        .map(|config| {
            let parser = config.parser_kind()?.build(client);
            Ok(Source::new(config.name, parser))
        })
        .collect()
}
