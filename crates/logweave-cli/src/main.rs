// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! logweave: record test runs and correlate logs against their windows
//!
//! This binary crate wires the recorder and the correlator to the command
//! line: `record` consumes a runner lifecycle event feed and writes the
//! report artifact; `correlate` streams a structured log and emits one
//! enriched record per (line, matching test window) pair.

use clap::Parser;

mod config;
mod correlate;
mod record;

use config::{Command, Config};

fn main() {
    let config = Config::parse();

    // Logs go to stderr so stdout stays a clean record stream.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(&config) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(config: &Config) -> anyhow::Result<()> {
    match &config.command {
        Command::Record { events } => record::run(config, events),
        Command::Correlate { filter, log } => correlate::run(config, filter, log),
    }
}
