//! Human-readable error descriptions and structured JSON error formatting.

use thiserror::Error;

/// Startup failures the operator must fix before the monitor can run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),
    #[error("{0}")]
    Credentials(String),
    #[error("invalid restock instant '{0}' (expected RFC 3339, e.g. 2026-03-01T18:00:00Z)")]
    Instant(String),
}

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    use finwatch_core::error::BuildError;
    use finwatch_sources::SourceError;

    // Typed matches first
    if let Some(ce) = err.downcast_ref::<CliError>() {
        return match ce {
            CliError::Config(msg) => format!(
                "What happened: Configuration could not be used ({msg}).\nLikely causes: Wrong --config path, a TOML syntax error, or an out-of-range value.\nHow to fix: Edit the config file (see etc/finwatch.toml for a sample), then rerun."
            ),
            CliError::Credentials(msg) => format!(
                "What happened: Delivery credentials are incomplete ({msg}).\nLikely causes: The bot token or the recipient id is not exported in this shell.\nHow to fix: Export the token variable named by notify.token_env and DISCORD_USER_ID (or set notify.recipient_id), or use `run --dry-run`."
            ),
            CliError::Instant(_) => format!(
                "What happened: {ce}.\nLikely causes: Missing timezone suffix or a typo.\nHow to fix: Pass e.g. `plan --restock 2026-03-01T18:00:00Z`."
            ),
        };
    }

    if let Some(BuildError::InvalidConfig(msg)) = err.downcast_ref::<BuildError>() {
        return format!(
            "What happened: Invalid configuration ({msg}).\nLikely causes: Out-of-range values in [timing] or [prediction].\nHow to fix: Edit the config file, then rerun."
        );
    }

    if let Some(se) = err.downcast_ref::<SourceError>() {
        if se.is_data_shape() {
            return format!(
                "What happened: The upstream answered without the tracked item ({se}).\nLikely causes: Wrong sources.market or sources.item_id, or the upstream changed its format.\nHow to fix: Compare the payload with the config; set sources.candidate_urls to enable endpoint discovery."
            );
        }
        return format!(
            "What happened: Upstream unreachable ({se}).\nLikely causes: Network outage, a wrong URL, or the upstream is down.\nHow to fix: Verify sources.primary_url / sources.secondary_url and retry; raise sources.timeout_secs for slow links."
        );
    }

    // Generic fallback
    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: 2 for anything the operator fixes in config or env, 1 otherwise.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    if err.downcast_ref::<CliError>().is_some()
        || err
            .downcast_ref::<finwatch_core::error::BuildError>()
            .is_some()
    {
        return 2;
    }
    1
}

fn reason_name(err: &eyre::Report) -> &'static str {
    match err.downcast_ref::<CliError>() {
        Some(CliError::Config(_)) => "Config",
        Some(CliError::Credentials(_)) => "Credentials",
        Some(CliError::Instant(_)) => "Usage",
        None if err
            .downcast_ref::<finwatch_core::error::BuildError>()
            .is_some() =>
        {
            "Config"
        }
        None if err.downcast_ref::<finwatch_sources::SourceError>().is_some() => "Source",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({ "reason": reason_name(err), "message": humanize(err) }).to_string()
}
