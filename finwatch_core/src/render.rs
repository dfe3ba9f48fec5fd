//! Alert → `Message` rendering.

use crate::alert::Alert;
use crate::util::fmt_duration;
use chrono::{DateTime, Duration, Utc};
use finwatch_traits::Message;

const BLURPLE: u32 = 0x5865F2;
const RED: u32 = 0xFF4444;
const AMBER: u32 = 0xFFAA00;
const BLUE: u32 = 0x0099FF;
const GREEN: u32 = 0x00CC44;

/// Lateness (seconds) beyond which a depart message says so.
const LATE_THRESHOLD_SECS: i64 = 60;

/// How absolute instants are written into message fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeStyle {
    /// Chat markup that each client renders in its own timezone, e.g. `<t:1700000000:T>`.
    #[default]
    ChatMarkup,
    /// `18:00:00 UTC (in 1h 34m)`
    Plain,
}

#[derive(Debug, Clone)]
pub struct Renderer {
    item_name: String,
    style: TimeStyle,
}

impl Renderer {
    pub fn new(item_name: impl Into<String>, style: TimeStyle) -> Self {
        Self {
            item_name: item_name.into(),
            style,
        }
    }

    pub fn render(&self, alert: &Alert, now: DateTime<Utc>) -> Message {
        let item = &self.item_name;
        let upper = item.to_uppercase();
        match alert {
            Alert::Online {
                flight,
                buffer,
                arrival_offset,
                poll_interval,
            } => Message::new(
                format!("{item} monitor online"),
                format!(
                    "Watching {item} stock every {}. You'll get a DM when it's time to travel.",
                    fmt_interval(*poll_interval)
                ),
                BLURPLE,
                now,
            )
            .field("Flight Time", fmt_duration(*flight), true)
            .field("Buffer", fmt_duration(*buffer), true)
            .field("Arrival Offset", fmt_offset(*arrival_offset), true),

            Alert::Depletion {
                cost,
                source,
                schedule,
                authoritative,
            } => {
                let mut m = Message::new(format!("{upper} DEPLETED"), "Stock sold out!", RED, now)
                    .field("Source", source.to_string(), true)
                    .field("Last Price", fmt_cost(*cost), true);
                if let Some(s) = schedule {
                    let label = if *authoritative {
                        "Restock At"
                    } else {
                        "Restock At (estimated)"
                    };
                    m = m
                        .field(label, self.at(s.restock, now), false)
                        .field("Depart At", self.at(s.depart, now), false);
                }
                m
            }

            Alert::Warning { schedule, lead } => Message::new(
                format!("DEPART IN {} MINUTES", lead.num_minutes()),
                "Start getting ready to fly!",
                AMBER,
                now,
            )
            .field("Depart At", self.at(schedule.depart, now), false)
            .field("Restock At", self.at(schedule.restock, now), false),

            Alert::Depart { schedule, late_by } => {
                let (title, desc) = if late_by.num_seconds() > LATE_THRESHOLD_SECS {
                    let late = fmt_duration(*late_by);
                    (
                        format!("FLY NOW - {late} LATE BUT GO!"),
                        format!("Ideal departure was {late} ago - still worth flying!"),
                    )
                } else {
                    ("FLY NOW!".to_string(), "Buy your ticket immediately!".to_string())
                };
                Message::new(title, desc, BLUE, now)
                    .field("Landing At", self.at(schedule.landing, now), false)
                    .field("Restock At", self.at(schedule.restock, now), false)
            }

            Alert::Restock {
                quantity,
                cost,
                source,
                delay,
            } => {
                let mut m = Message::new(
                    format!("{upper} RESTOCKED!"),
                    format!("{} items now available!", fmt_thousands(i64::from(*quantity))),
                    GREEN,
                    now,
                )
                .field("Price", fmt_cost(*cost), true)
                .field("Source", source.to_string(), true);
                if let Some(d) = delay {
                    m = m.field("Sold Out For", fmt_duration(*d), true);
                }
                m
            }
        }
    }

    fn at(&self, t: DateTime<Utc>, now: DateTime<Utc>) -> String {
        match self.style {
            TimeStyle::ChatMarkup => {
                let epoch = t.timestamp();
                format!("<t:{epoch}:T> (<t:{epoch}:R>)")
            }
            TimeStyle::Plain => {
                let rel = t - now;
                let rel = if rel >= Duration::zero() {
                    format!("in {}", fmt_duration(rel))
                } else {
                    format!("{} ago", fmt_duration(-rel))
                };
                format!("{} UTC ({rel})", t.format("%H:%M:%S"))
            }
        }
    }
}

fn fmt_interval(d: Duration) -> String {
    if d.num_seconds() % 60 == 0 {
        let m = d.num_minutes();
        if m == 1 {
            "minute".to_string()
        } else {
            format!("{m} minutes")
        }
    } else {
        format!("{}s", d.num_seconds())
    }
}

fn fmt_offset(d: Duration) -> String {
    let secs = d.num_seconds();
    if secs < 0 {
        format!("land {}s before restock", -secs)
    } else {
        format!("land {secs}s after restock")
    }
}

fn fmt_cost(cost: i64) -> String {
    format!("${}", fmt_thousands(cost))
}

fn fmt_thousands(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if n < 0 { format!("-{out}") } else { out }
}
