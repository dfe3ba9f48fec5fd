//! Command implementations: adapter assembly, the poll loop and the offline tools.

use crate::error_fmt::CliError;
use chrono::{DateTime, Duration, Utc};
use finwatch_config::Config;
use finwatch_core::{
    Edge, Monitor, MonitorCfg, Schedule, TickOutcome, TickReport, TimeStyle, TimingCfg,
};
use finwatch_sources::payload::parse_restock;
use finwatch_sources::{
    CandidateResolver, DiscordNotifier, DiscoveringSource, FailoverSource, HttpSource, ItemQuery,
    LogNotifier, SimCycle, SimulatedSource, build_client,
};
use finwatch_traits::{Clock, ManualClock, Notifier, StockSource, SystemClock};
use serde_json::json;
use tokio::time::MissedTickBehavior;

fn source_timeout(cfg: &Config) -> std::time::Duration {
    std::time::Duration::from_secs(cfg.sources.timeout_secs)
}

fn query(cfg: &Config) -> ItemQuery {
    ItemQuery::new(cfg.sources.market.clone(), cfg.sources.item_id)
}

/// Primary (fixed or discovered) with secondary failover.
pub fn build_source(cfg: &Config) -> eyre::Result<Box<dyn StockSource>> {
    let timeout = source_timeout(cfg);
    let client = build_client(timeout)?;
    let q = query(cfg);
    let secondary = HttpSource::secondary(client.clone(), cfg.sources.secondary_url.clone(), q.clone());
    if cfg.sources.candidate_urls.is_empty() {
        let primary = HttpSource::primary(client, cfg.sources.primary_url.clone(), q);
        Ok(Box::new(FailoverSource::new(primary, secondary, timeout)))
    } else {
        let resolver =
            CandidateResolver::new(client.clone(), cfg.sources.candidate_urls.clone(), q.clone());
        let primary = DiscoveringSource::new(resolver, client, q);
        Ok(Box::new(FailoverSource::new(primary, secondary, timeout)))
    }
}

pub fn build_notifier(cfg: &Config, dry_run: bool) -> eyre::Result<Box<dyn Notifier>> {
    if dry_run {
        return Ok(Box::new(LogNotifier));
    }
    let creds = cfg
        .credentials()
        .map_err(|e| CliError::Credentials(e.to_string()))?;
    let client = build_client(source_timeout(cfg))?;
    tracing::debug!(recipient = creds.recipient_id, "delivering via direct message");
    Ok(Box::new(DiscordNotifier::new(
        client,
        &cfg.notify.api_base,
        creds.token,
        creds.recipient_id,
    )))
}

pub async fn run(
    cfg: &Config,
    dry_run: bool,
    simulate: bool,
    once: bool,
    plain_times: bool,
) -> eyre::Result<()> {
    let notifier = build_notifier(cfg, dry_run)?;
    let source: Box<dyn StockSource> = if simulate {
        Box::new(SimulatedSource::new(SystemClock::new(), SimCycle::default()))
    } else {
        build_source(cfg)?
    };
    let style = if plain_times {
        TimeStyle::Plain
    } else {
        TimeStyle::ChatMarkup
    };
    let monitor = Monitor::new(source, notifier, SystemClock::new(), MonitorCfg::from(cfg))?
        .with_time_style(style);
    poll_loop(monitor, once).await
}

async fn poll_loop<S, N, C>(mut monitor: Monitor<S, N, C>, once: bool) -> eyre::Result<()>
where
    S: StockSource,
    N: Notifier,
    C: Clock,
{
    let period = monitor
        .cfg()
        .poll_interval
        .to_std()
        .map_err(|e| eyre::eyre!("poll interval: {e}"))?;
    tracing::info!(
        item = %monitor.cfg().item_name,
        poll_s = period.as_secs(),
        "monitor starting"
    );
    if !monitor.announce().await {
        tracing::warn!("startup announcement not delivered; continuing");
    }

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let report = monitor.tick().await;
                if once {
                    println!("{}", report_json(&report));
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }
    Ok(())
}

fn report_json(r: &TickReport) -> serde_json::Value {
    let kinds = |v: &[finwatch_core::AlertKind]| v.iter().map(|k| k.to_string()).collect::<Vec<_>>();
    match &r.outcome {
        TickOutcome::Skipped(e) => json!({
            "at": r.at.to_rfc3339(),
            "skipped": e.to_string(),
        }),
        TickOutcome::Observed(s) => json!({
            "at": r.at.to_rfc3339(),
            "quantity": s.quantity,
            "cost": s.cost,
            "source": s.source,
            "authoritative_restock": s.authoritative_restock.map(|t| t.to_rfc3339()),
            "edge": r.edge().map(|e| e.to_string()),
            "recovered": r.recovered,
            "sent": kinds(&r.sent),
            "failed": kinds(&r.failed),
        }),
    }
}

/// Credentials first (no network), then one fetch per configured source.
pub async fn check(cfg: &Config, json_out: bool) -> eyre::Result<()> {
    let creds = cfg
        .credentials()
        .map_err(|e| CliError::Credentials(e.to_string()))?;
    let timeout = source_timeout(cfg);
    let client = build_client(timeout)?;
    let q = query(cfg);

    let primary: Box<dyn StockSource> = if cfg.sources.candidate_urls.is_empty() {
        Box::new(HttpSource::primary(client.clone(), cfg.sources.primary_url.clone(), q.clone()))
    } else {
        Box::new(DiscoveringSource::new(
            CandidateResolver::new(client.clone(), cfg.sources.candidate_urls.clone(), q.clone()),
            client.clone(),
            q.clone(),
        ))
    };
    let secondary = HttpSource::secondary(client, cfg.sources.secondary_url.clone(), q);

    let mut results = Vec::new();
    let mut ok = 0;
    for (name, src) in [("primary", &*primary), ("secondary", &secondary as &dyn StockSource)] {
        let res = match tokio::time::timeout(timeout, src.fetch()).await {
            Ok(Ok(s)) => {
                ok += 1;
                json!({
                    "source": name,
                    "ok": true,
                    "quantity": s.quantity,
                    "cost": s.cost,
                    "next_restock": s.authoritative_restock.map(|t| t.to_rfc3339()),
                })
            }
            Ok(Err(e)) => json!({ "source": name, "ok": false, "error": e.to_string() }),
            Err(_) => json!({ "source": name, "ok": false, "error": format!("timed out after {timeout:?}") }),
        };
        results.push(res);
    }

    if json_out {
        println!(
            "{}",
            json!({ "recipient_id": creds.recipient_id, "sources": results })
        );
    } else {
        println!("recipient: {}", creds.recipient_id);
        for r in &results {
            println!("{r}");
        }
    }
    if ok == 0 {
        eyre::bail!("no source returned the tracked item");
    }
    Ok(())
}

pub fn plan(cfg: &Config, restock: &str, json_out: bool) -> eyre::Result<()> {
    let restock = parse_restock(restock).ok_or_else(|| CliError::Instant(restock.to_string()))?;
    let timing = TimingCfg::from(&cfg.timing);
    let s = Schedule::compute(restock, &timing);
    if json_out {
        println!("{}", schedule_json(&s));
    } else {
        for (label, t) in [
            ("warn", s.warn),
            ("depart", s.depart),
            ("deadline", s.depart_deadline),
            ("landing", s.landing),
            ("restock", s.restock),
        ] {
            println!("{label:<9}{}", t.format("%Y-%m-%d %H:%M:%S UTC"));
        }
    }
    Ok(())
}

fn schedule_json(s: &Schedule) -> serde_json::Value {
    let f = |t: DateTime<Utc>| t.to_rfc3339();
    json!({
        "restock": f(s.restock),
        "warn": f(s.warn),
        "depart": f(s.depart),
        "depart_deadline": f(s.depart_deadline),
        "landing": f(s.landing),
    })
}

/// Drive one simulated depletion/restock cycle through the real monitor on a manual clock.
pub async fn self_check(cfg: &Config, json_out: bool) -> eyre::Result<()> {
    let start = Utc::now();
    let clock = ManualClock::new(start);
    let cycle = SimCycle::default();
    let source = SimulatedSource::new(clock.clone(), cycle);
    let mut monitor = Monitor::new(source, LogNotifier, clock.clone(), MonitorCfg::from(cfg))?
        .with_time_style(TimeStyle::Plain);

    let step = Duration::minutes(5);
    let span = cycle.in_stock + cycle.sold_out + step;
    let mut edges = Vec::new();
    let mut alerts = 0usize;
    let mut elapsed = Duration::zero();
    while elapsed <= span {
        let report = monitor.tick().await;
        if let Some(e) = report.edge() {
            edges.push(e);
        }
        alerts += report.sent.len();
        clock.advance(step);
        elapsed += step;
    }

    if edges != [Edge::Depletion, Edge::Restock] {
        eyre::bail!("simulated cycle produced unexpected edges: {edges:?}");
    }
    if json_out {
        println!(
            "{}",
            json!({ "ok": true, "edges": edges.iter().map(|e| e.to_string()).collect::<Vec<_>>(), "alerts": alerts })
        );
    } else {
        println!("self-check ok: depletion and restock detected, {alerts} alerts rendered");
    }
    Ok(())
}
