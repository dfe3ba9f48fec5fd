//! Core configuration types, expressed as `chrono::Duration`s.

use chrono::Duration;

/// Fixed travel parameters used by the timing engine.
#[derive(Debug, Clone)]
pub struct TimingCfg {
    /// Transit time to the event location.
    pub flight: Duration,
    /// Safety margin; informational once `arrival_offset` is resolved.
    pub buffer: Duration,
    /// Warning fires this long before departure.
    pub warning_lead: Duration,
    /// Intended arrival relative to the restock instant (negative = before).
    pub arrival_offset: Duration,
    /// Width of the depart window.
    pub depart_grace: Duration,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            flight: Duration::minutes(94),
            buffer: Duration::minutes(2),
            warning_lead: Duration::minutes(10),
            arrival_offset: Duration::minutes(-2),
            depart_grace: Duration::minutes(30),
        }
    }
}

/// Prediction model parameters.
#[derive(Debug, Clone)]
pub struct PredictionCfg {
    pub history_size: usize,
    pub calibration_factor: f64,
    pub calibration_tolerance: Duration,
    pub fallback_delay: Duration,
}

impl Default for PredictionCfg {
    fn default() -> Self {
        Self {
            history_size: 10,
            calibration_factor: 0.3,
            calibration_tolerance: Duration::minutes(5),
            fallback_delay: Duration::hours(2),
        }
    }
}

/// Everything the monitor needs besides its adapters.
#[derive(Debug, Clone)]
pub struct MonitorCfg {
    pub timing: TimingCfg,
    pub prediction: PredictionCfg,
    pub poll_interval: Duration,
    /// Display name of the tracked item.
    pub item_name: String,
}

impl Default for MonitorCfg {
    fn default() -> Self {
        Self {
            timing: TimingCfg::default(),
            prediction: PredictionCfg::default(),
            poll_interval: Duration::seconds(60),
            item_name: "Shark Fin".to_string(),
        }
    }
}
