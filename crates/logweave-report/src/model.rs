// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Report model types
//!
//! In-memory representation of one test run: suites in discovery order, each
//! holding its test cases, timing windows and captured output. The model is
//! accumulated by the [`Recorder`](crate::recorder::Recorder) and encoded to
//! the report artifact by [`junit`](crate::junit).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Lifecycle state of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseStatus {
    /// The test has started and not yet reported an outcome
    Running,
    /// Test passed
    Passed,
    /// Test failed
    Failed,
    /// Test was skipped
    Pending,
}

/// Failure descriptor attached to a failed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestFailure {
    /// Failure type tag, e.g. the assertion or error class name
    #[serde(default)]
    pub kind: String,
    /// Human-readable failure message
    #[serde(default)]
    pub message: String,
    /// Stack text, verbatim from the runner
    #[serde(default)]
    pub stack: String,
}

/// A single test case observed during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// Test name within its suite
    pub name: String,
    /// Instant the test began, if it ever did
    pub started_at: Option<DateTime<Utc>>,
    /// Instant the test ended, if it ever did
    pub finished_at: Option<DateTime<Utc>>,
    /// Current lifecycle state
    pub status: CaseStatus,
    /// Failure details when `status` is [`CaseStatus::Failed`]
    pub failure: Option<TestFailure>,
    /// Set when the test was reported pending
    pub skipped: bool,
}

impl TestCase {
    /// Create a new running test case
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            started_at: None,
            finished_at: None,
            status: CaseStatus::Running,
            failure: None,
            skipped: false,
        }
    }

    /// Fully-qualified name: suite name and test name, space-joined
    #[must_use]
    pub fn qualified_name(&self, suite: &str) -> String {
        format!("{} {}", suite, self.name)
    }

    /// Elapsed execution time
    ///
    /// Zero when either instant is missing or the window is inverted.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => (end - start).to_std().unwrap_or(Duration::ZERO),
            _ => Duration::ZERO,
        }
    }

    /// Whether the test never actually ran
    ///
    /// A missing start instant and the Unix-epoch sentinel are equivalent.
    #[must_use]
    pub fn never_ran(&self) -> bool {
        match self.started_at {
            None => true,
            Some(start) => start == DateTime::UNIX_EPOCH,
        }
    }
}

/// Package classifier for a suite, derived from its originating file path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuitePackage {
    /// The suite file lives under a `functional` path segment
    Functional,
    /// Everything else
    Unit,
}

impl SuitePackage {
    /// Classifier name as it appears in the report artifact
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SuitePackage::Functional => "Functional",
            SuitePackage::Unit => "Unit",
        }
    }
}

/// A test suite observed during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    /// Suite name
    pub name: String,
    /// Originating spec file path, when the runner reports one
    pub file: Option<String>,
    /// Instant the suite was first observed, whole-second precision
    pub created_at: DateTime<Utc>,
    /// Test cases in discovery order
    pub cases: Vec<TestCase>,
    /// Text captured from standard output while the suite was open
    pub system_out: String,
    /// Text captured from standard error while the suite was open
    pub system_err: String,
}

impl TestSuite {
    /// Create an empty suite
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        file: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            name: name.into(),
            file,
            created_at,
            cases: Vec::new(),
            system_out: String::new(),
            system_err: String::new(),
        }
    }

    /// Package classifier for this suite
    ///
    /// `Functional` when any segment of the originating file path contains
    /// `functional` (case-insensitive), `Unit` otherwise.
    #[must_use]
    pub fn package(&self) -> SuitePackage {
        let functional = self.file.as_deref().is_some_and(|file| {
            file.split(['/', '\\'])
                .any(|segment| segment.to_ascii_lowercase().contains("functional"))
        });
        if functional {
            SuitePackage::Functional
        } else {
            SuitePackage::Unit
        }
    }

    /// Number of test cases
    #[must_use]
    pub fn tests(&self) -> usize {
        self.cases.len()
    }

    /// Number of failed test cases
    #[must_use]
    pub fn failures(&self) -> usize {
        self.cases
            .iter()
            .filter(|case| case.status == CaseStatus::Failed)
            .count()
    }

    /// Total execution time, summed over all cases
    #[must_use]
    pub fn time(&self) -> Duration {
        self.cases.iter().map(TestCase::elapsed).sum()
    }
}

/// A full run report: suites in discovery order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Recorded suites
    pub suites: Vec<TestSuite>,
}

impl Report {
    /// Create an empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of test cases across all suites
    #[must_use]
    pub fn tests(&self) -> usize {
        self.suites.iter().map(TestSuite::tests).sum()
    }

    /// Total number of failed test cases across all suites
    #[must_use]
    pub fn failures(&self) -> usize {
        self.suites.iter().map(TestSuite::failures).sum()
    }

    /// Total execution time across all suites
    #[must_use]
    pub fn time(&self) -> Duration {
        self.suites.iter().map(TestSuite::time).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).single().expect("valid millis")
    }

    #[test]
    fn test_qualified_name() {
        let case = TestCase::new("adds");
        assert_eq!(case.qualified_name("Math"), "Math adds");
    }

    #[test]
    fn test_elapsed_normal_window() {
        let mut case = TestCase::new("adds");
        case.started_at = Some(at(1000));
        case.finished_at = Some(at(1500));
        assert_eq!(case.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_elapsed_missing_instants_is_zero() {
        let mut case = TestCase::new("adds");
        assert_eq!(case.elapsed(), Duration::ZERO);

        case.started_at = Some(at(1000));
        assert_eq!(case.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_elapsed_inverted_window_is_zero() {
        let mut case = TestCase::new("adds");
        case.started_at = Some(at(2000));
        case.finished_at = Some(at(1000));
        assert_eq!(case.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_never_ran() {
        let mut case = TestCase::new("ghost");
        assert!(case.never_ran());

        case.started_at = Some(DateTime::UNIX_EPOCH);
        assert!(case.never_ran());

        case.started_at = Some(at(1000));
        assert!(!case.never_ran());
    }

    #[test]
    fn test_suite_package_functional() {
        let suite = TestSuite::new(
            "Math",
            Some("spec/functional/math.spec.js".to_string()),
            at(0),
        );
        assert_eq!(suite.package(), SuitePackage::Functional);
        assert_eq!(suite.package().as_str(), "Functional");
    }

    #[test]
    fn test_suite_package_unit() {
        let suite = TestSuite::new("Math", Some("spec/unit/math.spec.js".to_string()), at(0));
        assert_eq!(suite.package(), SuitePackage::Unit);

        let no_file = TestSuite::new("Math", None, at(0));
        assert_eq!(no_file.package(), SuitePackage::Unit);
    }

    #[test]
    fn test_suite_package_segment_match_is_case_insensitive() {
        let suite = TestSuite::new(
            "Math",
            Some("Spec\\Functional_long\\math.spec.js".to_string()),
            at(0),
        );
        assert_eq!(suite.package(), SuitePackage::Functional);
    }

    #[test]
    fn test_suite_counts() {
        let mut suite = TestSuite::new("Math", None, at(0));
        let mut passed = TestCase::new("adds");
        passed.status = CaseStatus::Passed;
        passed.started_at = Some(at(1000));
        passed.finished_at = Some(at(1500));
        let mut failed = TestCase::new("subs");
        failed.status = CaseStatus::Failed;
        failed.started_at = Some(at(1200));
        failed.finished_at = Some(at(1800));
        suite.cases.push(passed);
        suite.cases.push(failed);

        assert_eq!(suite.tests(), 2);
        assert_eq!(suite.failures(), 1);
        assert_eq!(suite.time(), Duration::from_millis(1100));
    }

    #[test]
    fn test_report_totals() {
        let mut report = Report::new();
        let mut suite = TestSuite::new("Math", None, at(0));
        let mut failed = TestCase::new("subs");
        failed.status = CaseStatus::Failed;
        suite.cases.push(failed);
        report.suites.push(suite);

        assert_eq!(report.tests(), 1);
        assert_eq!(report.failures(), 1);
        assert_eq!(report.time(), Duration::ZERO);
    }

    #[test]
    fn test_case_json_round_trip() {
        let mut case = TestCase::new("subs");
        case.started_at = Some(at(1200));
        case.finished_at = Some(at(1800));
        case.status = CaseStatus::Failed;
        case.failure = Some(TestFailure {
            kind: "AssertionError".to_string(),
            message: "1 != 2".to_string(),
            stack: "at subs (math.spec.js:4)".to_string(),
        });

        let json = serde_json::to_string(&case).expect("serialize");
        let back: TestCase = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(case, back);
    }
}
