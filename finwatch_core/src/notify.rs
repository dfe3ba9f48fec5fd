//! Per-cycle notification flags.
//!
//! Each timed alert moves `NOT_SENT → SENT` once per depletion cycle. Flags are
//! set by the caller only after the notifier accepted the message, so an
//! unsent alert is retried on the next tick for as long as its window lasts.

use crate::timing::{Schedule, Window};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotificationFlags {
    pub warning_sent: bool,
    pub depart_sent: bool,
    pub restock_sent: bool,
}

/// A window-driven alert that is due now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedAlert {
    Warning,
    /// `late_by` is how far past the ideal departure `now` is (zero or more).
    Depart { late_by: Duration },
}

impl NotificationFlags {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Clear the timed flags only (a new target time was adopted).
    pub fn reset_timed(&mut self) {
        self.warning_sent = false;
        self.depart_sent = false;
    }

    /// Flag state for a process that starts up mid-cycle.
    ///
    /// Moments already passed count as sent; the depart window that is still
    /// open stays unsent so it fires on this tick.
    pub fn synthesize(schedule: &Schedule, now: DateTime<Utc>) -> Self {
        Self {
            warning_sent: now >= schedule.warn,
            depart_sent: now >= schedule.depart_deadline,
            restock_sent: false,
        }
    }

    /// The alert whose window contains `now` and has not been sent yet.
    pub fn due(&self, schedule: &Schedule, now: DateTime<Utc>) -> Option<TimedAlert> {
        match schedule.window(now) {
            Window::Warning if !self.warning_sent => Some(TimedAlert::Warning),
            Window::Depart if !self.depart_sent => Some(TimedAlert::Depart {
                late_by: now - schedule.depart,
            }),
            _ => None,
        }
    }

    /// Record a successful send. A depart supersedes a warning that never went out.
    pub fn mark_sent(&mut self, alert: TimedAlert) {
        match alert {
            TimedAlert::Warning => self.warning_sent = true,
            TimedAlert::Depart { .. } => {
                self.depart_sent = true;
                self.warning_sent = true;
            }
        }
    }
}
