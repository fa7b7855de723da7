//! Debouncing for refresh requests.
//!
//! Profile rebuilding plus a full aggregation is expensive relative to
//! how fast rating events can arrive, so refresh requests coalesce: only
//! the most recent request after a quiet period actually executes.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

/// Collapses bursts of refresh requests into the single latest one.
///
/// Every call to [`Debouncer::acquire`] claims a new sequence number and
/// waits out the quiet period; it resolves `true` only if no newer call
/// arrived meanwhile. Callers drop the work when they get `false`.
#[derive(Debug)]
pub struct Debouncer {
    seq: AtomicU64,
    quiet: Duration,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            seq: AtomicU64::new(0),
            quiet,
        }
    }

    /// Wait out the quiet period; `true` means this request is still the
    /// latest and should proceed
    pub async fn acquire(&self) -> bool {
        let ticket = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        sleep(self.quiet).await;
        let latest = self.seq.load(Ordering::SeqCst) == ticket;
        if !latest {
            debug!(ticket, "refresh superseded, dropping");
        }
        latest
    }
}
