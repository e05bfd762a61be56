//! Progress side-channel for the engine.
//!
//! The engine never logs on its own; it reports to a [`ReconObserver`].
//! [`NoopObserver`] keeps a run silent, [`LogObserver`] forwards to the
//! `log` facade. Rows may be reported out of order when the `parallel`
//! feature is on, so implementations must be `Sync`.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::classify::Thresholds;
use crate::error::ReconError;
use crate::model::{MatchResult, RiskTier};

pub trait ReconObserver: Sync {
    fn on_start(&self, _invoices: usize, _clinical: usize, _thresholds: &Thresholds) {}

    /// Review threshold configured above the high-confidence threshold.
    fn on_threshold_inversion(&self, _thresholds: &Thresholds) {}

    /// `index` is the invoice row position (0-based). Under `parallel`,
    /// calls arrive in completion order, not index order.
    fn on_row(&self, _index: usize, _total: usize, _result: &MatchResult) {}

    fn on_complete(&self, _processed: usize) {}

    fn on_validation_failed(&self, _error: &ReconError) {}

    /// A tier's statistics could not be computed and were zeroed.
    fn on_summary_degraded(&self, _tier: RiskTier, _reason: &str) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconObserver for NoopObserver {}

/// Writes engine progress through the `log` crate.
#[derive(Debug)]
pub struct LogObserver {
    /// Emit a progress line every this many rows (0 disables).
    pub progress_every: usize,
    completed: AtomicUsize,
}

impl Default for LogObserver {
    fn default() -> Self {
        Self::with_progress_every(100)
    }
}

impl LogObserver {
    pub fn with_progress_every(progress_every: usize) -> Self {
        Self { progress_every, completed: AtomicUsize::new(0) }
    }

    /// Rows finished since the last `on_start`.
    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::Relaxed)
    }

    /// Count one finished row. Returns the new count when a progress line is due.
    pub(crate) fn tick(&self, total: usize) -> Option<usize> {
        let done = self.completed.fetch_add(1, Ordering::Relaxed) + 1;
        let due = self.progress_every > 0 && (done % self.progress_every == 0 || done == total);
        due.then_some(done)
    }
}

impl ReconObserver for LogObserver {
    fn on_start(&self, invoices: usize, clinical: usize, thresholds: &Thresholds) {
        self.completed.store(0, Ordering::Relaxed);
        log::info!(
            "starting reconciliation: {invoices} invoices vs {clinical} clinical logs (review >= {}, match >= {})",
            thresholds.review,
            thresholds.high_confidence
        );
    }

    fn on_threshold_inversion(&self, thresholds: &Thresholds) {
        log::warn!(
            "review threshold {} is above high-confidence threshold {}; no item will be classified Medium",
            thresholds.review,
            thresholds.high_confidence
        );
    }

    fn on_row(&self, _index: usize, total: usize, _result: &MatchResult) {
        if let Some(done) = self.tick(total) {
            log::info!("progress: {done}/{total} invoice rows matched");
        }
    }

    fn on_complete(&self, processed: usize) {
        log::info!("reconciliation complete: {processed} items processed");
    }

    fn on_validation_failed(&self, error: &ReconError) {
        log::error!("input validation failed: {error}");
    }

    fn on_summary_degraded(&self, tier: RiskTier, reason: &str) {
        log::warn!("summary for {tier} risk zeroed: {reason}");
    }
}
