//! What the monitor wants to tell the recipient, before rendering.

use crate::timing::Schedule;
use chrono::Duration;
use finwatch_traits::SourceKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Startup announcement.
    Online {
        flight: Duration,
        buffer: Duration,
        arrival_offset: Duration,
        poll_interval: Duration,
    },
    Depletion {
        cost: i64,
        source: SourceKind,
        schedule: Option<Schedule>,
        /// Whether `schedule` is based on an authoritative restock time.
        authoritative: bool,
    },
    Warning {
        schedule: Schedule,
        lead: Duration,
    },
    Depart {
        schedule: Schedule,
        late_by: Duration,
    },
    Restock {
        quantity: u32,
        cost: i64,
        source: SourceKind,
        /// Observed depletion → restock delay, when the cycle was closed.
        delay: Option<Duration>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlertKind {
    Online,
    Depletion,
    Warning,
    Depart,
    Restock,
}

impl std::fmt::Display for AlertKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AlertKind::Online => "online",
            AlertKind::Depletion => "depletion",
            AlertKind::Warning => "warning",
            AlertKind::Depart => "depart",
            AlertKind::Restock => "restock",
        };
        f.write_str(s)
    }
}

impl Alert {
    pub fn kind(&self) -> AlertKind {
        match self {
            Alert::Online { .. } => AlertKind::Online,
            Alert::Depletion { .. } => AlertKind::Depletion,
            Alert::Warning { .. } => AlertKind::Warning,
            Alert::Depart { .. } => AlertKind::Depart,
            Alert::Restock { .. } => AlertKind::Restock,
        }
    }
}
