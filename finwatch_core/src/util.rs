//! Duration formatting helpers shared by logs and rendered messages.

use chrono::Duration;

/// Compact human form: `1h 34m`, `12m`, `-5m`. Seconds are truncated.
pub fn fmt_duration(d: Duration) -> String {
    let secs = d.num_seconds();
    let prefix = if secs < 0 { "-" } else { "" };
    let abs = secs.unsigned_abs();
    let h = abs / 3600;
    let m = (abs % 3600) / 60;
    if h > 0 {
        format!("{prefix}{h}h {m}m")
    } else {
        format!("{prefix}{m}m")
    }
}

/// Scale a duration by a float factor, rounding to the nearest millisecond.
#[inline]
pub fn scale_duration(d: Duration, factor: f64) -> Duration {
    Duration::milliseconds((d.num_milliseconds() as f64 * factor).round() as i64)
}
