// stanza/src/main.rs
use std::process;

use clap::Parser;
use colored::Colorize;
use stanza_common::config::Config;
use stanza_common::error::{Result as stResult, StanzaError};
use stanza_core::simulate::ambient;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

mod cli;
use cli::CliArgs;

fn main() -> stResult<()> {
    let cli_args = CliArgs::parse();

    let level_filter = match cli_args.verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let env_filter = EnvFilter::builder()
        .with_default_directive(level_filter.into())
        .with_env_var("STANZA_LOG")
        .from_env_lossy();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .without_time()
        .try_init();

    let config = Config::load().map_err(|e| match e {
        StanzaError::Config(msg) => {
            StanzaError::Config(format!("Could not load config: {msg}"))
        }
        other => other,
    })?;
    ambient::apply_config(&config)?;
    if config.simulates_anything() {
        debug!("Simulated platform from environment: {}", ambient::current_tag());
    }

    if let Err(e) = cli_args.command.run(&config) {
        error!("Command failed: {:#}", e);
        eprintln!("{}: {:#}", "Error".red().bold(), e);
        process::exit(1);
    }

    debug!("Command completed successfully.");
    Ok(())
}
