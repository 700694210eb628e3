use thiserror::Error;

/// Why a parser produced no episodes this cycle.
///
/// All variants are handled the same way by the refresh engine (logged,
/// zero episodes); the split only makes the log lines useful.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP {status} when fetching {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("failed to decode payload: {0}")]
    Decode(String),

    #[error("failed to extract episodes: {0}")]
    Extract(String),
}
