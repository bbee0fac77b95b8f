// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The `record` subcommand
//!
//! Drives the recorder from the event feed and writes the report artifact.
//! An interrupt converges on the same finalize-and-write path as a normal
//! end of feed, so a killed run still leaves a usable artifact behind.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;
use signal_hook::consts::{SIGINT, SIGTERM};
use tracing::{info, warn};

use crate::config::{Config, open_line_source};
use logweave_report::junit;
use logweave_report::recorder::Recorder;

pub fn run(config: &Config, events: &str) -> anyhow::Result<()> {
    let interrupted = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&interrupted))
        .context("registering SIGINT handler")?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&interrupted))
        .context("registering SIGTERM handler")?;

    let mut feed =
        open_line_source(events).with_context(|| format!("opening event feed {events}"))?;

    let mut recorder = Recorder::new(std::io::stdout(), std::io::stderr());

    let mut line = String::new();
    loop {
        if interrupted.load(Ordering::Relaxed) {
            warn!("interrupted; writing report for events observed so far");
            break;
        }
        line.clear();
        if feed.read_line(&mut line).context("reading event feed")? == 0 {
            break;
        }
        recorder.process_line(&line)?;
    }

    if recorder.warnings() > 0 {
        warn!(count = recorder.warnings(), "data-quality warnings observed");
    }

    let report = recorder.finalize();
    junit::write_report_file(report, &config.report)
        .with_context(|| format!("writing report {}", config.report.display()))?;

    info!(
        path = %config.report.display(),
        suites = report.suites.len(),
        tests = report.tests(),
        failures = report.failures(),
        "report written"
    );
    Ok(())
}
