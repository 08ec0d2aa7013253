// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Matthias Bilger <matthias@bilger.info>

use anyhow::{Context, Result};
use chrono::Local;
use env_logger::{Builder, Target};
use hidreplay_base::Config;
use log::debug;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};

/// Copies every log line to stderr and to the configured log file
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        self.file.flush()
    }
}

/// Install the global logger using the level and file from `config`
pub fn init(config: &Config) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(config.level_filter()?)
        .format(|buf, record| {
            writeln!(
                buf,
                "{} - {} - {} - {}",
                Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.target(),
                record.level(),
                record.args()
            )
        });

    if let Some(path) = &config.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        builder.target(Target::Pipe(Box::new(TeeWriter { file })));
    }

    builder.try_init().context("Failed to initialize logger")?;

    if config.log_file.is_none() {
        debug!("log_file not specified on the config");
    }
    Ok(())
}
