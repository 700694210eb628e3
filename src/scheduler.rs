//! Periodic refresh.
//!
//! Runs on a dedicated thread: one refresh immediately, then one per
//! interval, forever.  The manual trigger in the web layer calls the same
//! [`Registry::update`], and the registry lock makes the two queue behind
//! each other instead of overlapping.
//!
//! ## For contributors
//!
//! The loop is intentionally simple: there is no cancellation, and a slow
//! source delays the whole cycle.  The interval is measured from the end of
//! one refresh to the start of the next.  A panic inside a parser is caught
//! and logged; the sources after it keep their old episodes until the next
//! cycle.

use std::any::Any;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::registry::Registry;

/// How often the scheduler refreshes all sources by default.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Spawn the scheduler thread.
///
/// The thread runs until the process exits.
pub fn spawn(registry: Arc<Registry>, interval: Duration) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("scheduler".into())
        .spawn(move || loop {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| registry.update())) {
                tracing::error!("update panicked: {}", panic_message(payload.as_ref()));
            }
            tracing::debug!("next update in {:?}", interval);
            thread::sleep(interval);
        })
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}
