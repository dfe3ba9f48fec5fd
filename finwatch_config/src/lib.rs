#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the restock monitor.
//!
//! - `Config` and its sections are deserialized from TOML; every section has
//!   defaults so an empty file is a valid starting point.
//! - `Config::validate` rejects out-of-range values before anything runs.
//! - Secrets never live in the file: the bot token (and optionally the
//!   recipient id) come from the environment via `Config::credentials`.
use serde::Deserialize;
use std::path::Path;

/// Environment variable that overrides `notify.recipient_id`.
pub const RECIPIENT_ENV: &str = "DISCORD_USER_ID";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotifyCfg {
    /// Recipient user id for direct messages.
    pub recipient_id: Option<u64>,
    /// Name of the environment variable holding the bot token.
    pub token_env: String,
    /// REST API base URL.
    pub api_base: String,
}

impl Default for NotifyCfg {
    fn default() -> Self {
        Self {
            recipient_id: None,
            token_env: "DISCORD_TOKEN".to_string(),
            api_base: "https://discord.com/api/v10".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SourcesCfg {
    /// Primary endpoint; reports `nextRestock` alongside the quantity.
    pub primary_url: String,
    /// Fallback endpoint; quantity only.
    pub secondary_url: String,
    /// Optional list of candidate primary endpoints. When non-empty the primary
    /// is resolved by probing these in order and re-probed after a parse failure.
    pub candidate_urls: Vec<String>,
    /// Market key inside the payload (e.g. "haw").
    pub market: String,
    /// Item id inside the market's stock list.
    pub item_id: u64,
    /// Display name used in messages.
    pub item_name: String,
    /// Per-request timeout in seconds, applied to each source independently.
    pub timeout_secs: u64,
}

impl Default for SourcesCfg {
    fn default() -> Self {
        Self {
            primary_url: "https://api.prombot.co.uk/api/travel".to_string(),
            secondary_url: "https://yata.yt/api/v1/travel/export/".to_string(),
            candidate_urls: Vec::new(),
            market: "haw".to_string(),
            item_id: 1485,
            item_name: "Shark Fin".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct TimingCfg {
    /// Transit duration to the event location, minutes.
    pub flight_mins: u64,
    /// Safety margin, minutes. Used as the default landing margin when
    /// `arrival_offset_secs` is absent.
    pub buffer_mins: u64,
    /// How long before departure the warning fires, minutes.
    pub warning_lead_mins: u64,
    /// Signed offset of the intended arrival relative to the restock instant.
    /// Negative lands before the restock, positive lands after it.
    pub arrival_offset_secs: Option<i64>,
    /// Width of the depart window, minutes.
    pub depart_grace_mins: u64,
}

impl Default for TimingCfg {
    fn default() -> Self {
        Self {
            flight_mins: 94,
            buffer_mins: 2,
            warning_lead_mins: 10,
            arrival_offset_secs: None,
            depart_grace_mins: 30,
        }
    }
}

impl TimingCfg {
    /// Effective arrival offset in seconds (`-buffer` when not configured).
    pub fn effective_arrival_offset_secs(&self) -> i64 {
        self.arrival_offset_secs
            .unwrap_or(-((self.buffer_mins * 60) as i64))
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PollCfg {
    /// Seconds between ticks.
    pub interval_secs: u64,
}

impl Default for PollCfg {
    fn default() -> Self {
        Self { interval_secs: 60 }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct PredictionCfg {
    /// Number of completed cycles kept for the average delay.
    pub history_size: usize,
    /// Fraction of the prediction error folded back into the average (0.0, 1.0].
    pub calibration_factor: f64,
    /// Errors at or below this many seconds leave the model untouched.
    pub calibration_tolerance_secs: u64,
    /// Delay assumed when no cycle has been observed yet, minutes.
    pub fallback_delay_mins: u64,
}

impl Default for PredictionCfg {
    fn default() -> Self {
        Self {
            history_size: 10,
            calibration_factor: 0.3,
            calibration_tolerance_secs: 300,
            fallback_delay_mins: 120,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub notify: NotifyCfg,
    pub sources: SourcesCfg,
    pub timing: TimingCfg,
    pub poll: PollCfg,
    pub prediction: PredictionCfg,
    pub logging: Logging,
}

/// Secrets and identity needed to deliver messages.
#[derive(Clone)]
pub struct Credentials {
    pub token: String,
    pub recipient_id: u64,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("recipient_id", &self.recipient_id)
            .finish()
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_path(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Timing
        if self.timing.flight_mins == 0 {
            eyre::bail!("timing.flight_mins must be >= 1");
        }
        if self.timing.flight_mins > 24 * 60 {
            eyre::bail!("timing.flight_mins is unreasonably large (>24h)");
        }
        if self.timing.warning_lead_mins == 0 {
            eyre::bail!("timing.warning_lead_mins must be >= 1");
        }
        if self.timing.depart_grace_mins == 0 {
            eyre::bail!("timing.depart_grace_mins must be >= 1");
        }
        if let Some(off) = self.timing.arrival_offset_secs
            && off.unsigned_abs() > 24 * 60 * 60
        {
            eyre::bail!("timing.arrival_offset_secs must be within +/-24h");
        }

        // Poll
        if self.poll.interval_secs == 0 {
            eyre::bail!("poll.interval_secs must be >= 1");
        }
        if self.poll.interval_secs > 60 * 60 {
            eyre::bail!("poll.interval_secs is unreasonably large (>1h)");
        }
        if self.timing.depart_grace_mins * 60 < self.poll.interval_secs {
            eyre::bail!("timing.depart_grace_mins must cover at least one poll interval");
        }

        // Prediction
        if self.prediction.history_size == 0 {
            eyre::bail!("prediction.history_size must be >= 1");
        }
        if self.prediction.history_size > 1000 {
            eyre::bail!("prediction.history_size is unreasonably large (>1000)");
        }
        let k = self.prediction.calibration_factor;
        if !(k > 0.0 && k <= 1.0) {
            eyre::bail!("prediction.calibration_factor must be in (0.0, 1.0]");
        }
        if self.prediction.fallback_delay_mins == 0 {
            eyre::bail!("prediction.fallback_delay_mins must be >= 1");
        }

        // Sources
        for (key, url) in [
            ("sources.primary_url", &self.sources.primary_url),
            ("sources.secondary_url", &self.sources.secondary_url),
        ] {
            if !is_http_url(url) {
                eyre::bail!("{key} must be an http(s) URL");
            }
        }
        if let Some(bad) = self.sources.candidate_urls.iter().find(|u| !is_http_url(u)) {
            eyre::bail!("sources.candidate_urls contains a non-http URL: {bad}");
        }
        if self.sources.market.trim().is_empty() {
            eyre::bail!("sources.market must not be empty");
        }
        if self.sources.timeout_secs == 0 {
            eyre::bail!("sources.timeout_secs must be >= 1");
        }
        if self.sources.timeout_secs > 120 {
            eyre::bail!("sources.timeout_secs is unreasonably large (>120s)");
        }

        // Notify
        if self.notify.token_env.trim().is_empty() {
            eyre::bail!("notify.token_env must name an environment variable");
        }
        if !is_http_url(&self.notify.api_base) {
            eyre::bail!("notify.api_base must be an http(s) URL");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }

    /// Resolve credentials through `lookup` (an environment accessor).
    ///
    /// The recipient env var takes precedence over `notify.recipient_id`.
    pub fn credentials_with(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> eyre::Result<Credentials> {
        let token = lookup(&self.notify.token_env)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                eyre::eyre!("missing credential: {} is not set", self.notify.token_env)
            })?;

        let recipient_id = match lookup(RECIPIENT_ENV) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                eyre::eyre!("invalid recipient: {RECIPIENT_ENV} must be a numeric user id")
            })?,
            None => self.notify.recipient_id.ok_or_else(|| {
                eyre::eyre!(
                    "missing recipient: set notify.recipient_id or {RECIPIENT_ENV}"
                )
            })?,
        };
        if recipient_id == 0 {
            eyre::bail!("missing recipient: recipient id must be non-zero");
        }

        Ok(Credentials {
            token,
            recipient_id,
        })
    }

    /// Resolve credentials from the process environment.
    pub fn credentials(&self) -> eyre::Result<Credentials> {
        self.credentials_with(|k| std::env::var(k).ok())
    }
}

fn is_http_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}
