//! Subscriber setup: stderr layer (compact or JSON) plus an optional JSON file layer.

use crate::cli::FILE_GUARD;
use finwatch_config::Logging;
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::{Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

const DEFAULT_LOG_FILE: &str = "finwatch.log";

/// Filter precedence: `RUST_LOG`, then `--log-level`, then `logging.level`, then `info`.
fn filter(cli_level: Option<&str>, cfg: &Logging) -> EnvFilter {
    if let Ok(f) = EnvFilter::try_from_default_env() {
        return f;
    }
    let level = cli_level.or(cfg.level.as_deref()).unwrap_or("info");
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

fn rotation(name: Option<&str>) -> Rotation {
    match name {
        Some("daily") => Rotation::DAILY,
        Some("hourly") => Rotation::HOURLY,
        _ => Rotation::NEVER,
    }
}

pub fn init(json: bool, cli_level: Option<&str>, cfg: &Logging) -> eyre::Result<()> {
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let stderr: Box<dyn Layer<Registry> + Send + Sync> = if json {
        Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_target(true),
        )
    } else {
        Box::new(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
    };
    layers.push(stderr);

    if let Some(file) = cfg.file.as_deref() {
        let path = Path::new(file);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(DEFAULT_LOG_FILE);
        std::fs::create_dir_all(dir)
            .map_err(|e| eyre::eyre!("create log dir {}: {e}", dir.display()))?;
        let appender = RollingFileAppender::new(rotation(cfg.rotation.as_deref()), dir, name);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        layers.push(Box::new(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .with_ansi(false),
        ));
    }

    layers.push(Box::new(filter(cli_level, cfg)));

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| eyre::eyre!("install tracing subscriber: {e}"))
}
