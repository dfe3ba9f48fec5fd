use chrono::{DateTime, Duration, TimeZone, Utc};
use finwatch_core::mocks::{RecordingNotifier, ScriptedSource, snapshot, snapshot_with_restock};
use finwatch_core::{
    AlertKind, BuildError, Edge, Monitor, MonitorCfg, MonitorError, Schedule, TickOutcome,
    TimeStyle,
};
use finwatch_traits::ManualClock;

type TestMonitor = Monitor<ScriptedSource, RecordingNotifier, ManualClock>;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn setup() -> (TestMonitor, ScriptedSource, RecordingNotifier, ManualClock) {
    let source = ScriptedSource::new();
    let notifier = RecordingNotifier::new();
    let clock = ManualClock::new(t0());
    let monitor = Monitor::new(
        source.clone(),
        notifier.clone(),
        clock.clone(),
        MonitorCfg::default(),
    )
    .unwrap()
    .with_time_style(TimeStyle::Plain);
    (monitor, source, notifier, clock)
}

#[tokio::test]
async fn quantity_sequence_fires_one_edge_each_way() {
    let (mut m, src, notes, clock) = setup();
    let mut edges = Vec::new();
    for q in [5, 5, 0, 0, 0, 12] {
        src.push(snapshot(q));
        let r = m.tick().await;
        edges.push(r.edge());
        clock.advance(Duration::minutes(1));
    }
    assert_eq!(
        edges,
        vec![
            None,
            None,
            Some(Edge::Depletion),
            None,
            None,
            Some(Edge::Restock)
        ]
    );
    let titles = notes.titles();
    assert_eq!(titles.iter().filter(|t| t.ends_with("DEPLETED")).count(), 1);
    assert_eq!(titles.iter().filter(|t| t.ends_with("RESTOCKED!")).count(), 1);
    assert_eq!(m.state().prediction.history().len(), 1);
    assert_eq!(
        m.state().prediction.history()[0].delay,
        Duration::minutes(3)
    );
    assert!(m.state().flags.restock_sent);
}

#[tokio::test]
async fn acquisition_failure_skips_tick_without_mutation() {
    let (mut m, src, notes, _clock) = setup();
    src.push(snapshot(5));
    m.tick().await;

    src.push_failure("connection refused");
    let r = m.tick().await;
    assert!(r.is_skipped());
    assert!(matches!(r.outcome, TickOutcome::Skipped(MonitorError::Acquisition(_))));
    assert_eq!(m.state().last_quantity, Some(5));
    assert!(notes.messages().is_empty());

    // next good tick still sees the depletion edge against the last good value
    src.push(snapshot(0));
    let r = m.tick().await;
    assert_eq!(r.edge(), Some(Edge::Depletion));
}

#[tokio::test]
async fn unchanged_quantity_is_idempotent() {
    let (mut m, src, notes, clock) = setup();
    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot(0));
    m.tick().await;
    clock.advance(Duration::minutes(1));
    let before_msgs = notes.messages().len();
    let before_hist = m.state().prediction.history().len();

    src.push(snapshot(0));
    let r = m.tick().await;
    assert_eq!(r.edge(), None);
    assert!(r.sent.is_empty());
    assert_eq!(notes.messages().len(), before_msgs);
    assert_eq!(m.state().prediction.history().len(), before_hist);
}

#[tokio::test]
async fn depletion_uses_fallback_prediction_without_history() {
    let (mut m, src, notes, _clock) = setup();
    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot(0));
    let r = m.tick().await;
    assert_eq!(r.sent, vec![AlertKind::Depletion]);
    assert_eq!(
        m.state().prediction.predicted_restock(),
        Some(t0() + Duration::hours(2))
    );
    assert_eq!(m.state().last_depletion, Some(t0()));
    let msg = &notes.messages()[0];
    assert!(msg.fields.iter().any(|f| f.name == "Restock At (estimated)"));
}

#[tokio::test]
async fn warning_then_depart_each_fire_once() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot_with_restock(0, restock));
    m.tick().await;
    notes.clear();

    clock.set(sched.warn + Duration::seconds(30));
    src.push(snapshot_with_restock(0, restock));
    assert_eq!(m.tick().await.sent, vec![AlertKind::Warning]);

    clock.advance(Duration::minutes(1));
    src.push(snapshot_with_restock(0, restock));
    assert!(m.tick().await.sent.is_empty());

    clock.set(sched.depart + Duration::seconds(20));
    src.push(snapshot_with_restock(0, restock));
    assert_eq!(m.tick().await.sent, vec![AlertKind::Depart]);

    clock.advance(Duration::minutes(5));
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert!(r.sent.is_empty(), "flag set, still inside window: nothing fires");

    assert_eq!(notes.titles(), vec!["DEPART IN 10 MINUTES", "FLY NOW!"]);
}

#[tokio::test]
async fn late_first_observation_sends_late_depart() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot(0));
    m.tick().await;
    notes.clear();

    // authoritative time appears only once we are already 12 minutes past departure
    clock.set(sched.depart + Duration::minutes(12));
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert_eq!(r.sent, vec![AlertKind::Depart]);
    assert_eq!(notes.titles(), vec!["FLY NOW - 12m LATE BUT GO!"]);
    assert!(m.state().flags.warning_sent, "stale warning is superseded");
}

#[tokio::test]
async fn delivery_failure_retries_next_tick_within_window() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    src.push(snapshot_with_restock(5, restock));
    m.tick().await;
    src.push(snapshot_with_restock(0, restock));
    m.tick().await;
    notes.clear();

    clock.set(sched.depart);
    notes.fail_next(1);
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert_eq!(r.failed, vec![AlertKind::Depart]);
    assert!(!m.state().flags.depart_sent);

    clock.advance(Duration::minutes(1));
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert_eq!(r.sent, vec![AlertKind::Depart]);
    assert!(m.state().flags.depart_sent);
}

#[tokio::test]
async fn delivery_failure_past_window_is_missed() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    src.push(snapshot_with_restock(5, restock));
    m.tick().await;
    src.push(snapshot_with_restock(0, restock));
    m.tick().await;
    notes.clear();

    clock.set(sched.depart_deadline - Duration::seconds(10));
    notes.fail_next(1);
    src.push(snapshot_with_restock(0, restock));
    assert_eq!(m.tick().await.failed, vec![AlertKind::Depart]);

    clock.set(sched.depart_deadline);
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert!(r.sent.is_empty() && r.failed.is_empty());
    assert!(notes.messages().is_empty());
}

#[tokio::test]
async fn restart_past_both_windows_synthesizes_flags() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    clock.set(sched.depart_deadline + Duration::minutes(1));
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert!(r.recovered);
    assert_eq!(r.edge(), None);
    assert!(m.state().flags.warning_sent);
    assert!(m.state().flags.depart_sent);
    assert!(r.sent.is_empty());
    assert!(notes.messages().is_empty());

    // the next restock is detected normally; no cycle recorded (depletion unknown)
    clock.set(restock + Duration::minutes(1));
    src.push(snapshot(900));
    let r = m.tick().await;
    assert_eq!(r.edge(), Some(Edge::Restock));
    assert_eq!(r.sent, vec![AlertKind::Restock]);
    assert!(m.state().prediction.history().is_empty());
    assert_eq!(m.state().prediction.predicted_restock(), None);
}

#[tokio::test]
async fn restart_inside_depart_window_fires_depart_once() {
    let (mut m, src, notes, clock) = setup();
    let restock = t0() + Duration::hours(3);
    let sched = Schedule::compute(restock, &m.cfg().timing);

    clock.set(sched.depart + Duration::minutes(3));
    src.push(snapshot_with_restock(0, restock));
    let r = m.tick().await;
    assert!(r.recovered);
    assert_eq!(r.sent, vec![AlertKind::Depart]);
    assert_eq!(notes.titles(), vec!["FLY NOW - 3m LATE BUT GO!"]);

    clock.advance(Duration::minutes(1));
    src.push(snapshot_with_restock(0, restock));
    assert!(m.tick().await.sent.is_empty());
}

#[tokio::test]
async fn restart_without_authoritative_uses_default_estimate() {
    let (mut m, src, _notes, _clock) = setup();
    src.push(snapshot(0));
    let r = m.tick().await;
    assert!(r.recovered);
    assert_eq!(
        m.state().prediction.predicted_restock(),
        Some(t0() + Duration::hours(2))
    );
    assert!(!m.state().flags.warning_sent);
    assert!(!m.state().flags.depart_sent);
}

#[tokio::test]
async fn new_authoritative_time_resets_timed_flags() {
    let (mut m, src, _notes, clock) = setup();
    let first = t0() + Duration::hours(3);
    let sched = Schedule::compute(first, &m.cfg().timing);

    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot_with_restock(0, first));
    m.tick().await;

    clock.set(sched.warn + Duration::minutes(1));
    src.push(snapshot_with_restock(0, first));
    m.tick().await;
    assert!(m.state().flags.warning_sent);

    // upstream pushes the restock back by an hour
    let revised = first + Duration::hours(1);
    src.push(snapshot_with_restock(0, revised));
    let r = m.tick().await;
    assert!(!m.state().flags.warning_sent);
    assert!(r.sent.is_empty(), "new warning window has not opened yet");
    assert_eq!(m.state().prediction.predicted_restock(), Some(revised));
}

#[tokio::test]
async fn authoritative_calibrates_model_after_history_exists() {
    let (mut m, src, _notes, clock) = setup();
    // close one 60-minute cycle to seed the average
    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot(0));
    m.tick().await;
    clock.advance(Duration::minutes(60));
    src.push(snapshot(5));
    m.tick().await;
    assert_eq!(
        m.state().prediction.average_delay(),
        Some(Duration::minutes(60))
    );

    // next cycle: model predicts +60m; authority says +70m
    clock.advance(Duration::minutes(30));
    let depleted_at = clock_now(&clock);
    src.push(snapshot_with_restock(0, depleted_at + Duration::minutes(70)));
    let r = m.tick().await;
    assert!(matches!(
        r.calibration,
        Some(finwatch_core::Calibration::Adjusted { .. })
    ));
    assert_eq!(
        m.state().prediction.average_delay(),
        Some(Duration::minutes(63))
    );
    assert_eq!(
        m.state().prediction.predicted_restock(),
        Some(depleted_at + Duration::minutes(70))
    );
}

#[tokio::test]
async fn past_authoritative_on_depletion_keeps_derived_estimate() {
    let (mut m, src, notes, clock) = setup();
    // seed a 3h cycle: 12:00 -> 15:00
    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot(0));
    m.tick().await;
    clock.advance(Duration::hours(3));
    src.push(snapshot(5));
    m.tick().await;

    // depletion at 15:30 while upstream still reports 15:10
    clock.advance(Duration::minutes(30));
    let depleted_at = clock_now(&clock);
    let stale = depleted_at - Duration::minutes(20);
    src.push(snapshot_with_restock(0, stale));
    let r = m.tick().await;
    assert_eq!(r.edge(), Some(Edge::Depletion));
    assert_eq!(r.calibration, None);
    assert!(!m.state().prediction.is_authoritative());
    assert_eq!(
        m.state().prediction.average_delay(),
        Some(Duration::hours(3))
    );
    let derived = depleted_at + Duration::hours(3);
    assert_eq!(m.state().prediction.predicted_restock(), Some(derived));

    // the derived schedule still drives the warning
    notes.clear();
    let sched = m.schedule().unwrap();
    assert_eq!(sched.restock, derived);
    clock.set(sched.warn + Duration::seconds(30));
    src.push(snapshot_with_restock(0, stale));
    let r = m.tick().await;
    assert_eq!(r.sent, vec![AlertKind::Warning]);
    assert_eq!(notes.titles(), vec!["DEPART IN 10 MINUTES".to_string()]);
}

#[tokio::test]
async fn stale_authoritative_from_closed_cycle_is_ignored() {
    let (mut m, src, _notes, clock) = setup();
    let restock = t0() + Duration::minutes(30);
    src.push(snapshot(5));
    m.tick().await;
    src.push(snapshot_with_restock(0, restock));
    m.tick().await;
    clock.set(restock + Duration::minutes(1));
    src.push(snapshot_with_restock(10, restock));
    m.tick().await;
    assert_eq!(m.state().prediction.authoritative_restock(), None);

    // a fresh future time is adopted
    let next = restock + Duration::hours(4);
    src.push(snapshot_with_restock(10, next));
    m.tick().await;
    assert_eq!(m.state().prediction.authoritative_restock(), Some(next));
}

#[tokio::test]
async fn announce_sends_online_message() {
    let (m, _src, notes, _clock) = setup();
    assert!(m.announce().await);
    let msgs = notes.messages();
    assert_eq!(msgs.len(), 1);
    assert_eq!(msgs[0].title, "Shark Fin monitor online");
    assert!(msgs[0].fields.iter().any(|f| f.value == "1h 34m"));
}

#[test]
fn rejects_invalid_cfg() {
    let mut cfg = MonitorCfg::default();
    cfg.prediction.calibration_factor = 0.0;
    let err = Monitor::new(
        ScriptedSource::new(),
        RecordingNotifier::new(),
        ManualClock::new(t0()),
        cfg,
    )
    .unwrap_err();
    assert!(matches!(err, BuildError::InvalidConfig(_)));
    assert!(err.to_string().contains("calibration_factor"));
}

fn clock_now(clock: &ManualClock) -> DateTime<Utc> {
    use finwatch_traits::Clock;
    clock.now()
}
