//! The set of tracked sources and the refresh engine.
//!
//! A [`Registry`] owns every [`Source`] behind one [`Mutex`].  Both writers
//! (the scheduler and the manual trigger) and readers (snapshots for the web
//! layer) take that lock, so a reader never sees a half-refreshed registry.
//! The price is that readers wait for a whole refresh cycle to finish.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use chrono::{DateTime, Local};

use crate::snapshot::{EpisodeView, SourceSnapshot};
use crate::source::{Episode, FeedParser};

/// One independently configured feed.
pub struct Source {
    name: String,
    parser: Box<dyn FeedParser>,
    last_update: DateTime<Local>,
    episodes: Vec<Episode>,
}

impl Source {
    pub fn new(name: impl Into<String>, parser: Box<dyn FeedParser>) -> Self {
        Self {
            name: name.into(),
            parser,
            last_update: Local::now(),
            episodes: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn last_update(&self) -> DateTime<Local> {
        self.last_update
    }

    /// Current episodes, most recent first.
    pub fn episodes(&self) -> &[Episode] {
        &self.episodes
    }

    /// Re-fetch this source and replace its episodes.
    ///
    /// The previous list is always discarded: a failed fetch leaves the
    /// source empty, with a fresh timestamp.  Returns the number of episodes
    /// stored.
    pub fn refresh(&mut self) -> usize {
        let mut episodes = self.parser.episodes();
        let now = Local::now();
        episodes.sort();

        self.last_update = now;
        self.episodes = episodes;
        self.episodes.len()
    }

    fn snapshot(&self) -> SourceSnapshot {
        SourceSnapshot {
            name: self.name.clone(),
            last_update: self.last_update.format(SourceSnapshot::TIME_FORMAT).to_string(),
            episodes: self
                .episodes
                .iter()
                .map(|ep| EpisodeView {
                    title: ep.title.clone(),
                    url: ep.url.clone(),
                })
                .collect(),
        }
    }
}

/// Summary of one refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Sources refreshed.
    pub sources: usize,
    /// Episodes stored across all sources.
    pub episodes: usize,
    /// Wall-clock duration, lock wait excluded.
    pub elapsed: Duration,
}

/// All sources, keyed by lower-cased name, behind a single lock.
///
/// Membership is fixed at construction.
pub struct Registry {
    sources: Mutex<BTreeMap<String, Source>>,
}

impl Registry {
    /// Build a registry from `sources`.  Two sources whose names differ only
    /// in case are rejected.
    pub fn new(sources: impl IntoIterator<Item = Source>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for source in sources {
            let key = source.name.to_lowercase();
            if map.contains_key(&key) {
                bail!("duplicate source name {:?}", source.name);
            }
            map.insert(key, source);
        }
        Ok(Self {
            sources: Mutex::new(map),
        })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Refresh every source, one after another, while holding the lock.
    ///
    /// Concurrent callers queue on the lock, so at most one refresh runs at
    /// a time and no reader observes a partially refreshed registry.
    pub fn update(&self) -> RefreshReport {
        let mut sources = self.lock();
        let started = Instant::now();
        tracing::info!("updating {} sources", sources.len());

        let mut episodes = 0;
        for source in sources.values_mut() {
            let count = source.refresh();
            tracing::info!(source = %source.name, episodes = count, "refreshed");
            episodes += count;
        }

        let report = RefreshReport {
            sources: sources.len(),
            episodes,
            elapsed: started.elapsed(),
        };
        tracing::info!(
            sources = report.sources,
            episodes = report.episodes,
            "update done in {:.1?}",
            report.elapsed
        );
        report
    }

    /// An immutable, render-ready copy of every source, ordered by key.
    pub fn snapshot(&self) -> Vec<SourceSnapshot> {
        self.lock().values().map(Source::snapshot).collect()
    }

    // Refresh replaces a source's fields in one step, so the data behind a
    // poisoned lock is still consistent.
    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, Source>> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
