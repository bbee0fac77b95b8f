// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Test-case time windows
//!
//! An [`Interval`] is one test case's execution window, closed on both ends,
//! keyed by the fully-qualified case name. Intervals are built from the
//! timing windows read back out of the report artifact, after applying the
//! caller's name filter and dropping cases that never ran.

use crate::error::CorrelateError;
use chrono::{DateTime, Utc};
use logweave_report::junit::{RecordedCase, read_cases_file};
use std::path::Path;
use tracing::{debug, warn};

/// A test case's execution time window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    /// Fully-qualified case name (`"<suite> <test>"`)
    pub name: String,
    /// Window start, inclusive
    pub start: DateTime<Utc>,
    /// Window end, inclusive
    pub end: DateTime<Utc>,
}

impl Interval {
    /// Create an interval
    #[must_use]
    pub fn new(name: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            start,
            end,
        }
    }

    /// Whether the instant falls inside the window, both ends inclusive
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Build intervals from recorded cases
    ///
    /// `filter` is matched case-insensitively as a substring of the
    /// fully-qualified case name; the empty filter matches everything.
    /// Cases without a start instant never ran and are dropped with a
    /// warning, as are cases that started but never finished (a window with
    /// no right edge matches nothing).
    #[must_use]
    pub fn from_cases(cases: Vec<RecordedCase>, filter: &str) -> Vec<Interval> {
        let needle = filter.to_lowercase();
        let mut intervals = Vec::new();
        for case in cases {
            let name = case.qualified_name();
            if !name.to_lowercase().contains(&needle) {
                debug!(test = %name, "filtered out");
                continue;
            }
            match (case.started_at, case.finished_at) {
                (Some(start), Some(end)) => intervals.push(Interval::new(name, start, end)),
                (None, _) => {
                    warn!(test = %name, "test never ran; excluded from correlation");
                }
                (Some(_), None) => {
                    warn!(test = %name, "test never finished; excluded from correlation");
                }
            }
        }
        intervals
    }
}

/// Read the report artifact and build the filtered interval set
///
/// # Errors
///
/// Returns `CorrelateError::Report` if the artifact is missing or
/// malformed.
pub fn load_intervals(path: &Path, filter: &str) -> Result<Vec<Interval>, CorrelateError> {
    let cases = read_cases_file(path)?;
    Ok(Interval::from_cases(cases, filter))
}
