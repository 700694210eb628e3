//! podshelf — the latest episodes of a handful of podcasts on one page.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌──────────────┐ update() ┌──────────────┐ episodes() ┌──────────────┐
//! │ scheduler.rs │ ───────► │ registry.rs  │ ─────────► │   source/    │
//! │   (thread)   │          │ (Mutex<map>) │            │ rss / scrape │
//! └──────────────┘          └──────────────┘            └──────────────┘
//!                             ▲          │ snapshot()
//!                    update() │          ▼
//!                           ┌──────────────┐
//!                           │    web/      │  /, /api/pods,
//!                           │   (axum)     │  /forceupdate, /logs
//!                           └──────────────┘
//! ```
//!
//! * **`source/`** — the `FeedParser` trait, the `Episode` type and the two
//!   strategies (RSS feed, page scraping with concurrent resolution).
//! * **`registry`** — every `Source` behind one lock, and the refresh engine.
//! * **`scheduler`** — refreshes everything at startup and then hourly.
//! * **`snapshot`** — owned, render-ready copies of the registry.
//! * **`web`** — HTML/JSON views and the manual refresh trigger.
//! * **`config`**, **`cli`**, **`logging`** — startup plumbing.

pub mod cli;
pub mod config;
pub mod logging;
pub mod registry;
pub mod scheduler;
pub mod snapshot;
pub mod source;
pub mod web;
