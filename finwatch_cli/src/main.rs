mod app;
mod cli;
mod error_fmt;
mod logging;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use error_fmt::{CliError, exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);
    if let Err(err) = real_main(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    let cfg = finwatch_config::load_path(&cli.config)
        .map_err(|e| CliError::Config(format!("{e:#}")))?;
    logging::init(cli.json, cli.log_level.as_deref(), &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    match cli.cmd {
        Commands::Run {
            dry_run,
            simulate,
            once,
            plain_times,
        } => rt.block_on(app::run(&cfg, dry_run, simulate, once, plain_times)),
        Commands::Check => rt.block_on(app::check(&cfg, cli.json)),
        Commands::Plan { restock } => app::plan(&cfg, &restock, cli.json),
        Commands::SelfCheck => rt.block_on(app::self_check(&cfg, cli.json)),
    }
}
