// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The `correlate` subcommand
//!
//! Loads the recorded test windows, streams the log source and prints one
//! enriched JSON record per (line, matching window) pair to stdout.

use std::io::Write;

use anyhow::Context;
use tracing::{debug, warn};

use crate::config::{Config, open_line_source};
use logweave_correlate::correlator::Correlator;
use logweave_correlate::interval;

pub fn run(config: &Config, filter: &str, log: &str) -> anyhow::Result<()> {
    let intervals = interval::load_intervals(&config.report, filter)
        .with_context(|| format!("loading report {}", config.report.display()))?;
    if intervals.is_empty() {
        warn!(filter = %filter, "no test windows matched the filter");
    }
    debug!(windows = intervals.len(), "correlating");

    let reader = open_line_source(log).with_context(|| format!("opening log source {log}"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let mut correlator = Correlator::new(intervals, reader);
    for tagged in &mut correlator {
        let tagged = tagged?;
        serde_json::to_writer(&mut out, &tagged).context("writing record")?;
        out.write_all(b"\n").context("writing record")?;
    }
    out.flush().context("flushing output")?;

    debug!(lines = correlator.lines_read(), "log stream complete");
    Ok(())
}
