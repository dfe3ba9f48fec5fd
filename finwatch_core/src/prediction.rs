//! Restock prediction from observed cycle delays.
//!
//! The model is a single number: the mean delay between a depletion edge and
//! the following restock edge over the last `history_size` cycles. When the
//! primary source reports an authoritative restock time, that value drives
//! scheduling and the gap between it and the model's own estimate nudges the
//! average (damped by `calibration_factor`) so later cycles without an
//! authoritative value start closer to reality.

use crate::config::PredictionCfg;
use crate::util::scale_duration;
use chrono::{DateTime, Duration, Utc};
use std::collections::VecDeque;

/// One closed depletion → restock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleRecord {
    pub depletion: DateTime<Utc>,
    pub restock: DateTime<Utc>,
    pub delay: Duration,
}

impl CycleRecord {
    pub fn new(depletion: DateTime<Utc>, restock: DateTime<Utc>) -> Self {
        Self {
            depletion,
            restock,
            delay: restock - depletion,
        }
    }
}

/// What `reconcile` did to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Calibration {
    /// Error exceeded the tolerance; the average moved to `average`.
    Adjusted { error: Duration, average: Duration },
    /// Error within tolerance; model unchanged.
    WithinTolerance { error: Duration },
    /// No average yet (history empty); nothing to correct.
    NoModel { error: Duration },
}

#[derive(Debug, Clone)]
pub struct PredictionEngine {
    cfg: PredictionCfg,
    history: VecDeque<CycleRecord>,
    average_delay: Option<Duration>,
    // Model estimate for the active cycle.
    derived_restock: Option<DateTime<Utc>>,
    // Estimate anchored on a guessed depletion time (restart); never calibrated against.
    provisional: bool,
    authoritative_restock: Option<DateTime<Utc>>,
}

impl PredictionEngine {
    pub fn new(cfg: PredictionCfg) -> Self {
        let cap = cfg.history_size.max(1);
        Self {
            cfg,
            history: VecDeque::with_capacity(cap),
            average_delay: None,
            derived_restock: None,
            provisional: false,
            authoritative_restock: None,
        }
    }

    /// Append a closed cycle, evict past the bound, recompute the mean.
    ///
    /// Returns `None` (and records nothing) when the restock precedes the depletion.
    pub fn record_cycle(
        &mut self,
        depletion: DateTime<Utc>,
        restock: DateTime<Utc>,
    ) -> Option<CycleRecord> {
        if restock < depletion {
            tracing::warn!(%depletion, %restock, "ignoring cycle with negative delay");
            return None;
        }
        let rec = CycleRecord::new(depletion, restock);
        self.history.push_back(rec);
        while self.history.len() > self.cfg.history_size.max(1) {
            self.history.pop_front();
        }
        self.average_delay = Some(mean_delay(&self.history));
        tracing::debug!(
            delay_s = rec.delay.num_seconds(),
            samples = self.history.len(),
            "cycle recorded"
        );
        Some(rec)
    }

    /// Restock estimate for a cycle that depleted at `depletion`.
    pub fn predict(&self, depletion: DateTime<Utc>) -> DateTime<Utc> {
        match self.average_delay {
            Some(avg) if !self.history.is_empty() => depletion + avg,
            _ => depletion + self.cfg.fallback_delay,
        }
    }

    /// Compare a prediction against the authoritative value and, when the
    /// error is outside tolerance, move the average by `error * factor`.
    pub fn reconcile(&mut self, predicted: DateTime<Utc>, actual: DateTime<Utc>) -> Calibration {
        let error = actual - predicted;
        let Some(avg) = self.average_delay else {
            return Calibration::NoModel { error };
        };
        if error.abs() <= self.cfg.calibration_tolerance {
            return Calibration::WithinTolerance { error };
        }
        let next = (avg + scale_duration(error, self.cfg.calibration_factor)).max(Duration::zero());
        self.average_delay = Some(next);
        Calibration::Adjusted {
            error,
            average: next,
        }
    }

    /// Start a cycle at a known depletion instant; returns the effective restock instant.
    pub fn begin_cycle(&mut self, depletion: DateTime<Utc>) -> DateTime<Utc> {
        let est = self.predict(depletion);
        self.derived_restock = Some(est);
        self.provisional = false;
        self.predicted_restock().unwrap_or(est)
    }

    /// Start a cycle whose depletion instant is unknown, using `now` as the anchor.
    pub fn begin_provisional(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let est = self.predict(now);
        self.derived_restock = Some(est);
        self.provisional = true;
        self.predicted_restock().unwrap_or(est)
    }

    /// Adopt an authoritative restock instant, calibrating against the current
    /// derived estimate when there is a real one.
    pub fn adopt_authoritative(&mut self, actual: DateTime<Utc>) -> Option<Calibration> {
        let calibration = match self.derived_restock {
            Some(predicted) if !self.provisional => Some(self.reconcile(predicted, actual)),
            _ => None,
        };
        self.authoritative_restock = Some(actual);
        calibration
    }

    /// Forget the active cycle's estimates (restock observed).
    pub fn clear_cycle(&mut self) {
        self.derived_restock = None;
        self.provisional = false;
        self.authoritative_restock = None;
    }

    /// Drop an authoritative value that has already passed.
    pub fn expire_authoritative(&mut self, now: DateTime<Utc>) {
        if self.authoritative_restock.is_some_and(|t| t <= now) {
            self.authoritative_restock = None;
        }
    }

    /// Effective restock instant: authoritative when known, else the model estimate.
    pub fn predicted_restock(&self) -> Option<DateTime<Utc>> {
        self.authoritative_restock.or(self.derived_restock)
    }

    pub fn is_authoritative(&self) -> bool {
        self.authoritative_restock.is_some()
    }

    pub fn authoritative_restock(&self) -> Option<DateTime<Utc>> {
        self.authoritative_restock
    }

    pub fn derived_restock(&self) -> Option<DateTime<Utc>> {
        self.derived_restock
    }

    pub fn average_delay(&self) -> Option<Duration> {
        self.average_delay
    }

    pub fn history(&self) -> &VecDeque<CycleRecord> {
        &self.history
    }
}

fn mean_delay(history: &VecDeque<CycleRecord>) -> Duration {
    let n = history.len().max(1) as i64;
    let total_ms: i64 = history.iter().map(|r| r.delay.num_milliseconds()).sum();
    Duration::milliseconds(total_ms / n)
}
