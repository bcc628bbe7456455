//! vitalwatch: vital-sign alerting dashboard
//!
//! Main entry point for the command-line application.

use std::io::IsTerminal;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vitalwatch::adapters::sanitize::SanitizingMakeWriter;
use vitalwatch::cli::{self, Cli, RenderOptions};
use vitalwatch::config::{Config, LogMode};

fn main() -> Result<()> {
    let args = Cli::parse();

    let mut config = Config::from_env().context("Invalid configuration")?;
    args.apply_overrides(&mut config);

    // Logs stay off stdout by default so command output can be piped.
    let (writer, _guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: don't fail startup just because the directory is missing.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(SanitizingMakeWriter::new(writer)))
        .init();

    tracing::debug!(?config, "Configuration loaded");

    let stdout = std::io::stdout();
    let opts = RenderOptions {
        color: !args.no_color && stdout.is_terminal(),
    };

    let stdin = std::io::stdin();
    cli::run(args.command, &config, &mut stdin.lock(), &mut stdout.lock(), opts)?;
    Ok(())
}
