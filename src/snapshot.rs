//! Render-ready copies of registry state.
//!
//! These types carry owned data only, so the web layer can render or
//! serialize them after the registry lock is released.

use serde::Serialize;

/// A point-in-time view of one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    pub name: String,
    /// Last refresh, formatted with [`SourceSnapshot::TIME_FORMAT`].
    pub last_update: String,
    /// Most recent first; may be empty.
    pub episodes: Vec<EpisodeView>,
}

impl SourceSnapshot {
    /// `strftime` format used for [`last_update`](SourceSnapshot::last_update).
    pub const TIME_FORMAT: &'static str = "%Y-%m-%d %H:%M";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EpisodeView {
    pub title: String,
    pub url: String,
}
