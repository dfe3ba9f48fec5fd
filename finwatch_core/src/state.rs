//! The single aggregate of mutable monitor state.

use crate::config::PredictionCfg;
use crate::notify::NotificationFlags;
use crate::prediction::{CycleRecord, PredictionEngine};
use chrono::{DateTime, Utc};

/// Process-lifetime state, written only by the tick handler.
#[derive(Debug, Clone)]
pub struct MonitorState {
    pub last_quantity: Option<u32>,
    pub last_depletion: Option<DateTime<Utc>>,
    pub last_restock: Option<DateTime<Utc>>,
    pub prediction: PredictionEngine,
    pub flags: NotificationFlags,
}

impl MonitorState {
    pub fn new(cfg: PredictionCfg) -> Self {
        Self {
            last_quantity: None,
            last_depletion: None,
            last_restock: None,
            prediction: PredictionEngine::new(cfg),
            flags: NotificationFlags::default(),
        }
    }

    /// Depletion edge: new cycle, fresh flags, fresh prediction.
    pub fn on_depletion(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        self.flags.reset();
        self.last_depletion = Some(now);
        self.prediction.expire_authoritative(now);
        self.prediction.begin_cycle(now)
    }

    /// Restock edge: close the cycle when its start is known, then forget it.
    pub fn on_restock(&mut self, now: DateTime<Utc>) -> Option<CycleRecord> {
        self.last_restock = Some(now);
        let record = self
            .last_depletion
            .and_then(|dep| self.prediction.record_cycle(dep, now));
        self.prediction.clear_cycle();
        record
    }

    /// True while stock is known to be zero.
    pub fn is_depleted(&self) -> bool {
        self.last_quantity == Some(0)
    }
}
