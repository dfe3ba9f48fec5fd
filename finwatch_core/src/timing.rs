//! Departure schedule derived from a restock instant.
//!
//! `depart = restock - flight + arrival_offset`, `warn = depart - warning_lead`,
//! `landing = depart + flight`. The signed offset covers both arrival policies:
//! negative lands ahead of the restock, positive lands inside the grace period
//! after it.

use crate::config::TimingCfg;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    pub restock: DateTime<Utc>,
    pub warn: DateTime<Utc>,
    pub depart: DateTime<Utc>,
    /// Exclusive upper bound of the depart window.
    pub depart_deadline: DateTime<Utc>,
    pub landing: DateTime<Utc>,
}

/// Where `now` falls relative to a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Window {
    /// Before the warning instant.
    Early,
    /// `[warn, depart)`
    Warning,
    /// `[depart, depart + grace)`
    Depart,
    /// At or past the end of the depart window.
    Expired,
}

impl Schedule {
    pub fn compute(restock: DateTime<Utc>, cfg: &TimingCfg) -> Self {
        let depart = restock - cfg.flight + cfg.arrival_offset;
        Self {
            restock,
            warn: depart - cfg.warning_lead,
            depart,
            depart_deadline: depart + cfg.depart_grace,
            landing: depart + cfg.flight,
        }
    }

    pub fn window(&self, now: DateTime<Utc>) -> Window {
        if now < self.warn {
            Window::Early
        } else if now < self.depart {
            Window::Warning
        } else if now < self.depart_deadline {
            Window::Depart
        } else {
            Window::Expired
        }
    }
}
