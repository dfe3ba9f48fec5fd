//! `From` implementations bridging `finwatch_config` types to `finwatch_core` types.

use crate::config::{MonitorCfg, PredictionCfg, TimingCfg};
use chrono::Duration;

#[inline]
fn mins(m: u64) -> Duration {
    Duration::minutes(m as i64)
}

// ── TimingCfg ────────────────────────────────────────────────────────────────

impl From<&finwatch_config::TimingCfg> for TimingCfg {
    fn from(c: &finwatch_config::TimingCfg) -> Self {
        Self {
            flight: mins(c.flight_mins),
            buffer: mins(c.buffer_mins),
            warning_lead: mins(c.warning_lead_mins),
            arrival_offset: Duration::seconds(c.effective_arrival_offset_secs()),
            depart_grace: mins(c.depart_grace_mins),
        }
    }
}

// ── PredictionCfg ────────────────────────────────────────────────────────────

impl From<&finwatch_config::PredictionCfg> for PredictionCfg {
    fn from(c: &finwatch_config::PredictionCfg) -> Self {
        Self {
            history_size: c.history_size,
            calibration_factor: c.calibration_factor,
            calibration_tolerance: Duration::seconds(c.calibration_tolerance_secs as i64),
            fallback_delay: mins(c.fallback_delay_mins),
        }
    }
}

// ── MonitorCfg ───────────────────────────────────────────────────────────────

impl From<&finwatch_config::Config> for MonitorCfg {
    fn from(c: &finwatch_config::Config) -> Self {
        Self {
            timing: (&c.timing).into(),
            prediction: (&c.prediction).into(),
            poll_interval: Duration::seconds(c.poll.interval_secs as i64),
            item_name: c.sources.item_name.clone(),
        }
    }
}
