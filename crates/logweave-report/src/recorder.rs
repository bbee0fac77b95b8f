// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test-run recording
//!
//! This module consumes the runner's lifecycle event feed and accumulates the
//! [`Report`] model. The feed is newline-delimited JSON, one event per line:
//!
//! ```text
//! {"type":"run","event":"started"}
//! {"type":"suite","event":"started","name":"Math","file":"spec/functional/math.spec.js"}
//! {"type":"test","event":"started","suite":"Math","name":"adds"}
//! {"type":"test","event":"passed","suite":"Math","name":"adds"}
//! {"type":"suite","event":"finished","name":"Math"}
//! {"type":"run","event":"finished"}
//! ```
//!
//! Every event may carry an `at` timestamp; events without one are stamped
//! with the wall clock when observed, so recorded feeds replay
//! deterministically and live feeds need no stamping.
//!
//! # Example
//!
//! ```
//! use logweave_report::recorder::Recorder;
//!
//! let mut recorder = Recorder::new(Vec::new(), Vec::new());
//! recorder
//!     .process_line(r#"{"type":"suite","event":"started","name":"Math"}"#)
//!     .unwrap();
//! recorder
//!     .process_line(r#"{"type":"suite","event":"finished","name":"Math"}"#)
//!     .unwrap();
//! let report = recorder.finalize();
//! assert_eq!(report.suites.len(), 1);
//! ```

use crate::capture::CaptureSink;
use crate::error::ReportError;
use crate::model::{CaseStatus, Report, TestCase, TestFailure, TestSuite};
use chrono::{DateTime, SubsecRound, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::{debug, warn};

// ============================================================================
// Event Feed Types
// ============================================================================

/// A single event from the runner lifecycle feed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RunnerEvent {
    /// Run-level event ("started", "finished")
    Run(RunEvent),
    /// Suite-level event ("started", "finished")
    Suite(SuiteEvent),
    /// Test-level event ("started", "finished", "passed", "failed",
    /// "pending", "retry")
    Test(TestEvent),
}

/// Run-level event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEvent {
    /// Event kind
    pub event: String,
    /// Instant the event occurred, if the feed records one
    pub at: Option<DateTime<Utc>>,
}

/// Suite-level event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteEvent {
    /// Event kind
    pub event: String,
    /// Suite name; empty for the implicit root suite
    #[serde(default)]
    pub name: String,
    /// Originating spec file path (only meaningful on "started")
    pub file: Option<String>,
    /// Instant the event occurred, if the feed records one
    pub at: Option<DateTime<Utc>>,
}

/// Test-level event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestEvent {
    /// Event kind
    pub event: String,
    /// Name of the suite the test belongs to
    #[serde(default)]
    pub suite: String,
    /// Test name
    #[serde(default)]
    pub name: String,
    /// Failure descriptor (only meaningful on "failed")
    pub failure: Option<TestFailure>,
    /// Instant the event occurred, if the feed records one
    pub at: Option<DateTime<Utc>>,
}

// ============================================================================
// Recorder
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SuiteState {
    Open,
    Closed,
}

#[derive(Debug)]
struct SuiteEntry {
    suite: TestSuite,
    state: SuiteState,
}

/// State machine over runner lifecycle events
///
/// Owns the pass-through capture wrappers for both output sinks; while a
/// suite is open, everything the recorder prints (pass/fail/skip glyphs) is
/// captured into that suite as well as forwarded to the real destination.
pub struct Recorder<O: Write, E: Write> {
    suites: IndexMap<String, SuiteEntry>,
    stdout: CaptureSink<O>,
    stderr: CaptureSink<E>,
    report: Option<Report>,
    warnings: usize,
}

impl<O: Write, E: Write> Recorder<O, E> {
    /// Create a recorder writing terminal feedback to the given sinks
    pub fn new(stdout: O, stderr: E) -> Self {
        Self {
            suites: IndexMap::new(),
            stdout: CaptureSink::new(stdout),
            stderr: CaptureSink::new(stderr),
            report: None,
            warnings: 0,
        }
    }

    /// Number of data-quality warnings observed so far
    #[must_use]
    pub fn warnings(&self) -> usize {
        self.warnings
    }

    /// Process a single line of the event feed
    ///
    /// Empty lines are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ReportError::EventDecode` if the line is not a valid event,
    /// or any error produced by [`observe`](Self::observe).
    pub fn process_line(&mut self, line: &str) -> Result<(), ReportError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        let event: RunnerEvent = serde_json::from_str(line)?;
        self.observe(event)
    }

    /// Apply one lifecycle event to the state machine
    ///
    /// # Errors
    ///
    /// Returns `ReportError::Protocol` if a suite finishes without being
    /// open, or an IO error from writing terminal feedback.
    pub fn observe(&mut self, event: RunnerEvent) -> Result<(), ReportError> {
        match event {
            RunnerEvent::Run(run) => {
                debug!(event = %run.event, "run event");
                Ok(())
            }
            RunnerEvent::Suite(suite) => {
                let SuiteEvent {
                    event,
                    name,
                    file,
                    at,
                } = suite;
                let at = stamp(at);
                match event.as_str() {
                    "started" => {
                        self.suite_started(name, file, at);
                        Ok(())
                    }
                    "finished" => self.suite_finished(&name),
                    other => {
                        debug!(event = other, "ignoring unknown suite event");
                        Ok(())
                    }
                }
            }
            RunnerEvent::Test(test) => {
                let TestEvent {
                    event,
                    suite,
                    name,
                    failure,
                    at,
                } = test;
                let at = stamp(at);
                match event.as_str() {
                    "started" => {
                        let case = self.case_mut(&suite, &name, at);
                        case.status = CaseStatus::Running;
                        case.started_at = Some(at);
                        Ok(())
                    }
                    "finished" => {
                        let case = self.case_mut(&suite, &name, at);
                        case.finished_at = Some(at);
                        Ok(())
                    }
                    "passed" => {
                        let case = self.case_mut(&suite, &name, at);
                        case.status = CaseStatus::Passed;
                        writeln!(self.stdout, "  \u{2713} {name}")?;
                        Ok(())
                    }
                    "failed" => {
                        let failure = failure.unwrap_or_else(|| TestFailure {
                            kind: "Error".to_string(),
                            message: String::new(),
                            stack: String::new(),
                        });
                        let case = self.case_mut(&suite, &name, at);
                        case.status = CaseStatus::Failed;
                        case.failure = Some(failure);
                        writeln!(self.stderr, "  \u{2717} {name}")?;
                        Ok(())
                    }
                    "pending" => {
                        let case = self.case_mut(&suite, &name, at);
                        case.status = CaseStatus::Pending;
                        case.skipped = true;
                        writeln!(self.stdout, "  - {name}")?;
                        Ok(())
                    }
                    "retry" => {
                        debug!(suite = %suite, test = %name, "retry observed");
                        Ok(())
                    }
                    other => {
                        debug!(event = other, "ignoring unknown test event");
                        Ok(())
                    }
                }
            }
        }
    }

    fn suite_started(&mut self, name: String, file: Option<String>, at: DateTime<Utc>) {
        if name.is_empty() {
            debug!("root suite is not recorded");
            return;
        }
        if self.suites.contains_key(&name) {
            warn!(suite = %name, "duplicate suite begin ignored");
            self.warnings += 1;
            return;
        }
        let created_at = at.trunc_subsecs(0);
        let suite = TestSuite::new(name.clone(), file, created_at);
        self.suites.insert(
            name,
            SuiteEntry {
                suite,
                state: SuiteState::Open,
            },
        );
        self.stdout.begin();
        self.stderr.begin();
    }

    fn suite_finished(&mut self, name: &str) -> Result<(), ReportError> {
        if name.is_empty() {
            return Ok(());
        }
        let entry = self
            .suites
            .get_mut(name)
            .filter(|entry| entry.state == SuiteState::Open)
            .ok_or_else(|| ReportError::Protocol {
                message: format!("suite \"{name}\" finished without being open"),
            })?;
        entry.suite.system_out = self.stdout.release();
        entry.suite.system_err = self.stderr.release();
        entry.state = SuiteState::Closed;
        Ok(())
    }

    /// Look up a case, creating the suite and the case as needed
    ///
    /// A test event naming a suite that never began creates the suite with a
    /// warning; the event source is sloppy but not in violation of the
    /// lifecycle contract.
    fn case_mut(&mut self, suite: &str, name: &str, at: DateTime<Utc>) -> &mut TestCase {
        if !self.suites.contains_key(suite) {
            warn!(suite = %suite, "test event for a suite that never began");
            self.warnings += 1;
            self.suites.insert(
                suite.to_string(),
                SuiteEntry {
                    suite: TestSuite::new(suite, None, at.trunc_subsecs(0)),
                    state: SuiteState::Open,
                },
            );
            self.stdout.begin();
            self.stderr.begin();
        }
        // The entry exists on every path above.
        let entry = &mut self.suites[suite];
        let idx = match entry.suite.cases.iter().position(|case| case.name == name) {
            Some(idx) => idx,
            None => {
                entry.suite.cases.push(TestCase::new(name));
                entry.suite.cases.len() - 1
            }
        };
        &mut entry.suite.cases[idx]
    }

    /// Assemble the final report
    ///
    /// Safe to invoke from both the interrupt path and normal completion:
    /// the first call snapshots the report, later calls return the same
    /// snapshot. Captures left open by an interrupted suite are released
    /// best-effort into the most recently begun open suite.
    pub fn finalize(&mut self) -> &Report {
        if self.report.is_none() {
            if self.suites.values().any(|e| e.state == SuiteState::Open) {
                let system_out = self.stdout.release();
                let system_err = self.stderr.release();
                if let Some(entry) = self
                    .suites
                    .values_mut()
                    .rev()
                    .find(|e| e.state == SuiteState::Open)
                {
                    entry.suite.system_out = system_out;
                    entry.suite.system_err = system_err;
                }
            }
            let report = Report {
                suites: self
                    .suites
                    .values()
                    .map(|entry| entry.suite.clone())
                    .collect(),
            };
            self.report = Some(report);
        }
        self.report.get_or_insert_with(Report::new)
    }
}

/// Stamp an event with the wall clock when the feed did not
fn stamp(at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    at.unwrap_or_else(Utc::now)
}
