// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

mod listing;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use hidreplay_base::{Config, ReporterContext, RunOutcome, Supervisor, DEFAULT_CONFIG_FILE};
use hidreplay_hid::HidApiBackend;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::Arc;

/// Replays configured HID reports to matching devices on a fixed interval
#[derive(Debug, Parser)]
#[command(name = "hidreplay", version, about)]
struct Cli {
    /// Configuration file, defaults to config.yml when present
    config: Option<PathBuf>,

    /// Print every connected HID device in configuration format
    #[arg(short = 'a', long, conflicts_with = "list_devices")]
    list_all: bool,

    /// Print the connected devices matching the configuration's devices
    #[arg(short = 'l', long)]
    list_devices: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.or_else(|| Config::locate(DEFAULT_CONFIG_FILE));

    if cli.list_all || cli.list_devices {
        let document = match (&config_path, cli.list_devices) {
            (Some(path), true) => listing::list_matching(&Config::from_file(path)?)?,
            (None, true) => {
                println!("Config file not passed as an argument! Enumerating all devices instead");
                listing::list_all()?
            }
            (_, false) => listing::list_all()?,
        };
        print!("{}", document);
        return Ok(());
    }

    let config_path = config_path
        .with_context(|| format!("No config file given and {} not found", DEFAULT_CONFIG_FILE))?;
    run(config_path).await
}

async fn run(config_path: PathBuf) -> Result<()> {
    let config = Config::from_file(&config_path)?;
    logging::init(&config)?;
    info!(
        "Loaded {:?}: {} devices, polling every {}ms",
        config_path,
        config.devices.len(),
        config.polling_frequency_ms
    );

    let backend = HidApiBackend::new().context("Failed to initialize HID API")?;
    let mut supervisor = Supervisor::new(Arc::new(ReporterContext::new(config)), backend);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    match supervisor.run_until(shutdown).await {
        RunOutcome::Cancelled => debug!("Interrupted, shutting down"),
        RunOutcome::Completed(summary) => debug!("Reporter stopped after {} restarts", summary.restarts),
    }
    Ok(())
}
