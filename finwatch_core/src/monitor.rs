//! Tick orchestrator: acquire → detect → predict → schedule → notify.
//!
//! One `tick` runs to completion before the caller schedules the next, so the
//! state needs no locking; `&mut self` is the only writer.

use crate::alert::{Alert, AlertKind};
use crate::config::MonitorCfg;
use crate::cycle::{self, Edge, StockPhase, Transition};
use crate::error::{BuildError, MonitorError};
use crate::notify::{NotificationFlags, TimedAlert};
use crate::prediction::Calibration;
use crate::render::{Renderer, TimeStyle};
use crate::state::MonitorState;
use crate::timing::Schedule;
use crate::util::fmt_duration;
use chrono::{DateTime, Duration, Utc};
use finwatch_traits::{Clock, Notifier, Snapshot, StockSource};

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// No snapshot could be acquired; nothing changed.
    Skipped(MonitorError),
    Observed(Snapshot),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub at: DateTime<Utc>,
    pub outcome: TickOutcome,
    pub transition: Option<Transition>,
    /// Flags were synthesized by restart recovery.
    pub recovered: bool,
    pub calibration: Option<Calibration>,
    pub sent: Vec<AlertKind>,
    pub failed: Vec<AlertKind>,
}

impl TickReport {
    fn skipped(at: DateTime<Utc>, err: MonitorError) -> Self {
        Self {
            at,
            outcome: TickOutcome::Skipped(err),
            transition: None,
            recovered: false,
            calibration: None,
            sent: Vec::new(),
            failed: Vec::new(),
        }
    }

    fn observed(at: DateTime<Utc>, snap: Snapshot) -> Self {
        Self {
            outcome: TickOutcome::Observed(snap),
            ..Self::skipped(at, MonitorError::Acquisition(String::new()))
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, TickOutcome::Skipped(_))
    }

    pub fn edge(&self) -> Option<Edge> {
        self.transition.and_then(Transition::edge)
    }
}

pub struct Monitor<S, N, C> {
    source: S,
    notifier: N,
    clock: C,
    cfg: MonitorCfg,
    renderer: Renderer,
    state: MonitorState,
}

impl<S, N, C> core::fmt::Debug for Monitor<S, N, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Monitor")
            .field("item", &self.cfg.item_name)
            .field("last_quantity", &self.state.last_quantity)
            .field("flags", &self.state.flags)
            .finish()
    }
}

impl<S, N, C> Monitor<S, N, C>
where
    S: StockSource,
    N: Notifier,
    C: Clock,
{
    pub fn new(source: S, notifier: N, clock: C, cfg: MonitorCfg) -> Result<Self, BuildError> {
        if cfg.prediction.history_size == 0 {
            return Err(BuildError::InvalidConfig("history_size must be >= 1"));
        }
        let k = cfg.prediction.calibration_factor;
        if !(k > 0.0 && k <= 1.0) {
            return Err(BuildError::InvalidConfig("calibration_factor out of range"));
        }
        if cfg.timing.flight <= Duration::zero() {
            return Err(BuildError::InvalidConfig("flight duration must be positive"));
        }
        if cfg.timing.warning_lead <= Duration::zero() {
            return Err(BuildError::InvalidConfig("warning lead must be positive"));
        }
        if cfg.timing.depart_grace <= Duration::zero() {
            return Err(BuildError::InvalidConfig("depart grace must be positive"));
        }
        Ok(Self {
            renderer: Renderer::new(cfg.item_name.clone(), TimeStyle::default()),
            state: MonitorState::new(cfg.prediction.clone()),
            source,
            notifier,
            clock,
            cfg,
        })
    }

    /// Choose how instants are written into messages.
    pub fn with_time_style(mut self, style: TimeStyle) -> Self {
        self.renderer = Renderer::new(self.cfg.item_name.clone(), style);
        self
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn cfg(&self) -> &MonitorCfg {
        &self.cfg
    }

    /// Schedule for the current effective restock instant, if any.
    pub fn schedule(&self) -> Option<Schedule> {
        self.state
            .prediction
            .predicted_restock()
            .map(|r| Schedule::compute(r, &self.cfg.timing))
    }

    /// Send the startup announcement. Best-effort.
    pub async fn announce(&self) -> bool {
        let t = &self.cfg.timing;
        let alert = Alert::Online {
            flight: t.flight,
            buffer: t.buffer,
            arrival_offset: t.arrival_offset,
            poll_interval: self.cfg.poll_interval,
        };
        self.deliver(&alert, self.clock.now()).await
    }

    /// Run one poll cycle.
    pub async fn tick(&mut self) -> TickReport {
        let snap = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                let err = classify_fetch_error(e.as_ref());
                tracing::warn!(error = %err, "no snapshot this tick; state unchanged");
                return TickReport::skipped(self.clock.now(), err);
            }
        };
        let now = self.clock.now();
        let mut report = TickReport::observed(now, snap.clone());

        // Edges
        let transition = cycle::classify(self.state.last_quantity, snap.quantity);
        self.state.last_quantity = Some(snap.quantity);
        report.transition = Some(transition);

        let mut closed = None;
        match transition {
            Transition::Edge(Edge::Depletion) => {
                let restock = self.state.on_depletion(now);
                tracing::info!(%restock, "depletion edge; cycle started");
            }
            Transition::Edge(Edge::Restock) => {
                closed = self.state.on_restock(now);
                tracing::info!(
                    delay = ?closed.map(|c| fmt_duration(c.delay)),
                    "restock edge; cycle closed"
                );
            }
            _ => {}
        }

        // Authoritative restock time
        if let Some(actual) = snap.authoritative_restock {
            report.calibration = self.adopt_authoritative(actual, now);
        }

        // Restart recovery
        if transition == Transition::Initial(StockPhase::Depleted) {
            report.recovered = self.recover(now);
        }

        // Edge notifications
        match transition.edge() {
            Some(Edge::Depletion) => {
                let alert = Alert::Depletion {
                    cost: snap.cost,
                    source: snap.source,
                    schedule: self.schedule(),
                    authoritative: self.state.prediction.is_authoritative(),
                };
                self.dispatch(&alert, now, &mut report).await;
            }
            Some(Edge::Restock) => {
                let alert = Alert::Restock {
                    quantity: snap.quantity,
                    cost: snap.cost,
                    source: snap.source,
                    delay: closed.map(|c| c.delay),
                };
                if self.dispatch(&alert, now, &mut report).await {
                    self.state.flags.restock_sent = true;
                }
            }
            None => {}
        }

        // Timed windows
        if snap.quantity == 0
            && let Some(schedule) = self.schedule()
            && let Some(due) = self.state.flags.due(&schedule, now)
        {
            let alert = match due {
                TimedAlert::Warning => Alert::Warning {
                    schedule,
                    lead: self.cfg.timing.warning_lead,
                },
                TimedAlert::Depart { late_by } => {
                    if late_by > Duration::zero() {
                        tracing::info!(late_by = %fmt_duration(late_by), "past ideal departure; sending late depart");
                    }
                    Alert::Depart { schedule, late_by }
                }
            };
            if self.dispatch(&alert, now, &mut report).await {
                self.state.flags.mark_sent(due);
            }
        }

        self.log_status(&snap, now);
        report
    }

    fn adopt_authoritative(
        &mut self,
        actual: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Option<Calibration> {
        if self.state.last_restock.is_some_and(|r| actual <= r) {
            tracing::debug!(%actual, "ignoring authoritative restock from a closed cycle");
            return None;
        }
        // Past instants schedule nothing and are never calibrated against.
        if actual <= now {
            tracing::debug!(%actual, %now, "ignoring authoritative restock already in the past");
            return None;
        }
        if self.state.prediction.authoritative_restock() == Some(actual) {
            return None;
        }
        let calibration = self.state.prediction.adopt_authoritative(actual);
        self.state.flags.reset_timed();
        match calibration {
            Some(Calibration::Adjusted { error, average }) => tracing::info!(
                error = %fmt_duration(error),
                average = %fmt_duration(average),
                "prediction recalibrated"
            ),
            Some(Calibration::WithinTolerance { error }) => {
                tracing::debug!(error_s = error.num_seconds(), "prediction within tolerance")
            }
            _ => {}
        }
        tracing::info!(restock = %actual, "authoritative restock time adopted");
        calibration
    }

    fn recover(&mut self, now: DateTime<Utc>) -> bool {
        let restock = match self.state.prediction.predicted_restock() {
            Some(t) => t,
            None => self.state.prediction.begin_provisional(now),
        };
        let schedule = Schedule::compute(restock, &self.cfg.timing);
        self.state.flags = NotificationFlags::synthesize(&schedule, now);
        tracing::info!(
            %restock,
            authoritative = self.state.prediction.is_authoritative(),
            warning_sent = self.state.flags.warning_sent,
            depart_sent = self.state.flags.depart_sent,
            "started while sold out; flags synthesized"
        );
        true
    }

    async fn dispatch(&self, alert: &Alert, now: DateTime<Utc>, report: &mut TickReport) -> bool {
        let ok = self.deliver(alert, now).await;
        if ok {
            report.sent.push(alert.kind());
        } else {
            report.failed.push(alert.kind());
        }
        ok
    }

    async fn deliver(&self, alert: &Alert, now: DateTime<Utc>) -> bool {
        let message = self.renderer.render(alert, now);
        match self.notifier.send(&message).await {
            Ok(()) => {
                tracing::info!(kind = %alert.kind(), "notification sent");
                true
            }
            Err(e) => {
                let err = MonitorError::Delivery(e.to_string());
                tracing::warn!(kind = %alert.kind(), error = %err, "will retry while the window is open");
                false
            }
        }
    }

    fn log_status(&self, snap: &Snapshot, now: DateTime<Utc>) {
        match self.schedule() {
            Some(s) if snap.quantity == 0 => tracing::info!(
                source = %snap.source,
                restock_in = %fmt_duration(s.restock - now),
                depart_in = %fmt_duration(s.depart - now),
                warning_sent = self.state.flags.warning_sent,
                depart_sent = self.state.flags.depart_sent,
                "sold out"
            ),
            _ => tracing::info!(
                source = %snap.source,
                quantity = snap.quantity,
                cost = snap.cost,
                "stock"
            ),
        }
    }
}

#[cfg(feature = "source-errors")]
fn classify_fetch_error(e: &(dyn std::error::Error + Send + Sync + 'static)) -> MonitorError {
    match e.downcast_ref::<finwatch_sources::SourceError>() {
        Some(se) if se.is_data_shape() => MonitorError::DataShape(se.to_string()),
        _ => MonitorError::Acquisition(e.to_string()),
    }
}

#[cfg(not(feature = "source-errors"))]
fn classify_fetch_error(e: &(dyn std::error::Error + Send + Sync + 'static)) -> MonitorError {
    MonitorError::Acquisition(e.to_string())
}
