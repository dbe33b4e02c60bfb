//! Progress reporting for dataset loading.
//!
//! The loader reports through [`ProgressCallback`] and does not care
//! whether updates end up as `indicatif` bars, log lines or nothing.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives progress updates from long-running loads.
pub trait ProgressCallback: Send + Sync {
    /// Set the total expected units of work.
    fn set_total(&self, total: u64);

    /// Advance progress by `delta` units.
    fn inc(&self, delta: u64);

    /// Update the message displayed alongside the progress indicator.
    fn set_message(&self, msg: String);

    /// Mark progress as complete with a final message.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Writes each step as an `info!` line prefixed with `[done/total]`, for
/// processes without a terminal such as the server.
#[derive(Default)]
pub struct LogProgress {
    total: AtomicU64,
    done: AtomicU64,
}

impl LogProgress {
    #[must_use]
    pub fn shared() -> Arc<dyn ProgressCallback> {
        Arc::new(Self::default())
    }

    /// `[done/total]` as of now.
    #[must_use]
    pub fn position(&self) -> (u64, u64) {
        (
            self.done.load(Ordering::Relaxed),
            self.total.load(Ordering::Relaxed),
        )
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
    }

    fn inc(&self, delta: u64) {
        self.done.fetch_add(delta, Ordering::Relaxed);
    }

    fn set_message(&self, msg: String) {
        let (done, total) = self.position();
        log::info!("[{}/{total}] {msg}", done + 1);
    }

    fn finish(&self, msg: String) {
        log::info!("{msg}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_tracks_position() {
        let progress = LogProgress::default();
        progress.set_total(6);
        progress.inc(1);
        progress.inc(2);
        progress.set_message("Loading Street Lights".to_string());
        assert_eq!(progress.position(), (3, 6));

        progress.set_total(2);
        assert_eq!(progress.position(), (0, 2));
    }
}
